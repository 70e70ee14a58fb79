#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use client::app::{Dashboard, DashboardError};
use client::config::{ConfigError, DashboardConfig};
use client::net::api::ApiError;
use client::net::frame_client::{CalendarPush, RealtimeMessage};
use client::net::types::Email;
use client::state::Store;
use client::state::calendar::CalendarAction;
use client::state::chat::{ChatMessage, Sender};
use client::util::calendar_groups::format_event_time;
use client::util::command_input::{CommandInput, Key};
use client::util::commands::CommandCatalog;
use client::util::email_merge::{EmailFilter, gmail_url, sender_name};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("email {0} not found")]
    EmailNotFound(String),
}

#[derive(Parser, Debug)]
#[command(name = "dashboard-cli", about = "Personal assistant dashboard in the terminal")]
struct Cli {
    #[arg(long, env = "DASHBOARD_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "DASHBOARD_WS_URL")]
    ws_url: Option<String>,

    #[arg(long, env = "DASHBOARD_COMMANDS_PATH", help = "JSON command catalog override")]
    commands_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message, or chat interactively when MESSAGE is omitted.
    Chat { message: Option<String> },
    /// Show today's and upcoming events.
    Calendar {
        #[arg(long, default_value_t = false, help = "Include hidden calendars")]
        all: bool,
    },
    Email(EmailCommand),
    /// List slash-commands, or those matching PREFIX.
    Commands { prefix: Option<String> },
    /// Print realtime traffic until Ctrl-C.
    Watch,
}

#[derive(Args, Debug)]
struct EmailCommand {
    #[command(subcommand)]
    command: EmailSubcommand,
}

#[derive(Subcommand, Debug)]
enum EmailSubcommand {
    List {
        #[arg(long, default_value_t = false)]
        hide_unread: bool,
        #[arg(long, default_value_t = false)]
        hide_starred: bool,
        #[arg(long, default_value_t = false)]
        hide_read: bool,
    },
    /// Mark an email read.
    Read { id: String },
    Star { id: String },
    Unstar { id: String },
    /// Print an email with its full body.
    Open { id: String },
    /// Ask the assistant to draft a reply.
    Draft { id: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let dashboard = Dashboard::new(config)?;

    match cli.command {
        Command::Chat { message } => run_chat(&dashboard, message).await,
        Command::Calendar { all } => run_calendar(&dashboard, all).await,
        Command::Email(email) => run_email(&dashboard, email.command).await,
        Command::Commands { prefix } => {
            run_commands(&dashboard, prefix.as_deref());
            Ok(())
        }
        Command::Watch => run_watch(&dashboard).await,
    }
}

fn build_config(cli: &Cli) -> Result<DashboardConfig, CliError> {
    let mut config = DashboardConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(ws_url) = &cli.ws_url {
        config.ws_url.clone_from(ws_url);
    }
    if let Some(path) = &cli.commands_path {
        config.commands_path = Some(path.clone());
    }
    Ok(config)
}

// =============================================================================
// chat
// =============================================================================

async fn run_chat(dashboard: &Dashboard, message: Option<String>) -> Result<(), CliError> {
    let chat = dashboard.chat_widget();
    if let Some(message) = message {
        chat.send_message(&message).await;
        for msg in chat.state().messages.iter().filter(|m| m.sender == Sender::Assistant) {
            print_chat_message(msg);
        }
        return Ok(());
    }

    dashboard.start();
    let printer = spawn_chat_printer(Arc::clone(dashboard.store()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    println!("Type a message or a /command. End a /prefix with `?` to list matches. `exit` to leave.");
    let mut input = CommandInput::new();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }
        if let Some(hints) = completion_hint(&mut input, dashboard.catalog(), line) {
            for hint in hints {
                println!("  {hint}");
            }
            continue;
        }
        chat.send_message(line).await;
    }

    printer.abort();
    dashboard.shutdown();
    Ok(())
}

/// Line-mode stand-in for Tab completion: `/prefix?` lists the matching
/// commands instead of sending. Returns `None` when the line should be sent.
fn completion_hint(input: &mut CommandInput, catalog: &CommandCatalog, line: &str) -> Option<Vec<String>> {
    let prefix = line.strip_suffix('?')?;
    input.set_text(prefix);
    input.handle_key(Key::Tab, catalog);
    if !input.is_open() {
        return None;
    }
    let hints = input
        .suggestions()
        .iter()
        .map(|c| format!("{:<20} {}", c.syntax, c.description))
        .collect();
    input.take_text();
    Some(hints)
}

/// Print assistant messages and chat errors as they land in the store,
/// including replies pushed over realtime.
fn spawn_chat_printer(store: Arc<Store>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut revisions = store.watch();
        let mut printed = store.chat().messages.len();
        let mut last_error: Option<String> = None;
        while revisions.changed().await.is_ok() {
            let state = store.chat();
            for msg in state.messages.iter().skip(printed) {
                if msg.sender == Sender::Assistant {
                    print_chat_message(msg);
                }
            }
            printed = state.messages.len();
            if state.error != last_error {
                if let Some(error) = &state.error {
                    eprintln!("! {error}");
                }
                last_error = state.error;
            }
        }
    })
}

fn print_chat_message(msg: &ChatMessage) {
    println!("\n{}\n", msg.text);
}

// =============================================================================
// calendar
// =============================================================================

async fn run_calendar(dashboard: &Dashboard, all: bool) -> Result<(), CliError> {
    let calendar = dashboard.calendar_widget();
    if all {
        dashboard
            .store()
            .dispatch(CalendarAction::SetHiddenCalendars(std::collections::BTreeSet::new()));
    }
    calendar.refresh().await?;

    let grouped = calendar.grouped(&Local::now());
    if grouped.is_empty() {
        println!("No upcoming events.");
        return Ok(());
    }
    for (heading, events) in [("Today", &grouped.today), ("Upcoming", &grouped.upcoming)] {
        if events.is_empty() {
            continue;
        }
        println!("{heading}");
        for event in events {
            let when = format_event_time(&event.start_time, event.end_time.as_deref(), &Local);
            println!("  {when:<22} {}", event.title);
            if let Some(location) = &event.location {
                println!("  {:<22} @ {location}", "");
            }
        }
    }

    let hidden = dashboard.store().calendar().hidden_calendars;
    if !hidden.is_empty() {
        let names: Vec<&str> = hidden.iter().map(String::as_str).collect();
        println!("(hidden: {})", names.join(", "));
    }
    Ok(())
}

// =============================================================================
// email
// =============================================================================

async fn run_email(dashboard: &Dashboard, command: EmailSubcommand) -> Result<(), CliError> {
    let email = dashboard.email_widget();
    match command {
        EmailSubcommand::List { hide_unread, hide_starred, hide_read } => {
            email.refresh().await?;
            let filter = EmailFilter { show_unread: !hide_unread, show_starred: !hide_starred, show_read: !hide_read };
            let emails = email.combined(filter);
            if emails.is_empty() {
                println!("No emails.");
            }
            for item in &emails {
                print_email_line(item);
            }
        }
        EmailSubcommand::Read { id } => {
            email.mark_read(&id).await?;
            println!("marked {id} read");
        }
        EmailSubcommand::Star { id } => set_star(dashboard, &id, true).await?,
        EmailSubcommand::Unstar { id } => set_star(dashboard, &id, false).await?,
        EmailSubcommand::Open { id } => {
            email.refresh().await?;
            let item = email.open(&id).await.ok_or_else(|| CliError::EmailNotFound(id.clone()))?;
            println!("From:    {}", item.from);
            println!("Subject: {}", item.subject);
            println!("Date:    {}", item.date);
            println!("Link:    {}\n", gmail_url(&item.id));
            println!("{}", item.body.as_deref().unwrap_or(&item.snippet));
        }
        EmailSubcommand::Draft { id } => {
            let result = email.draft_reply(&id).await;
            for msg in dashboard.store().chat().messages {
                print_chat_message(&msg);
            }
            result?;
        }
    }
    Ok(())
}

async fn set_star(dashboard: &Dashboard, id: &str, starred: bool) -> Result<(), CliError> {
    let email = dashboard.email_widget();
    email.refresh().await?;
    match email.state().email(id) {
        Some(item) if item.is_starred() == starred => {}
        Some(_) => email.toggle_star(id).await?,
        None => dashboard.api().set_starred(id, starred).await?,
    }
    println!("{} {id}", if starred { "starred" } else { "unstarred" });
    Ok(())
}

fn print_email_line(email: &Email) {
    let flags = format!(
        "{}{}",
        if email.is_unread() { '*' } else { ' ' },
        if email.is_starred() { '★' } else { ' ' }
    );
    println!("{flags} {:<18} {:<24} {}", email.id, truncate(&sender_name(&email.from), 24), email.subject);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

// =============================================================================
// commands / watch
// =============================================================================

fn run_commands(dashboard: &Dashboard, prefix: Option<&str>) {
    let catalog = dashboard.catalog();
    let Some(prefix) = prefix else {
        print!("{}", catalog.help_text());
        return;
    };
    let matches = catalog.suggestions(prefix);
    if matches.is_empty() {
        println!("No commands match {prefix:?}.");
    }
    for command in matches {
        println!("{:<20} {}", command.syntax, command.description);
    }
}

async fn run_watch(dashboard: &Dashboard) -> Result<(), CliError> {
    let _subscription = dashboard.realtime().subscribe(|message| match message {
        RealtimeMessage::Chat(text) => println!("[chat] {text}"),
        RealtimeMessage::Calendar(CalendarPush::Add(event)) => {
            println!("[calendar] added {} {} ({})", event.id, event.title, event.start_time);
        }
        RealtimeMessage::Calendar(CalendarPush::Update(event)) => {
            println!("[calendar] updated {} {} ({})", event.id, event.title, event.start_time);
        }
        RealtimeMessage::Calendar(CalendarPush::Delete(id)) => println!("[calendar] deleted {id}"),
    });

    let mut status = dashboard.realtime().watch_status();
    dashboard.start();
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                eprintln!("[status] {current:?}");
            }
        }
    }

    dashboard.shutdown();
    Ok(())
}

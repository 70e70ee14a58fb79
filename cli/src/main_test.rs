use super::*;
use clap::CommandFactory;

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn chat_message_is_optional() {
    let cli = Cli::try_parse_from(["dashboard-cli", "chat"]).unwrap();
    assert!(matches!(cli.command, Command::Chat { message: None }));

    let cli = Cli::try_parse_from(["dashboard-cli", "chat", "/todo list"]).unwrap();
    assert!(matches!(cli.command, Command::Chat { message: Some(ref m) } if m == "/todo list"));
}

#[test]
fn email_subcommands_take_an_id() {
    let cli = Cli::try_parse_from(["dashboard-cli", "email", "star", "m1"]).unwrap();
    let Command::Email(email) = cli.command else {
        panic!("expected email command");
    };
    assert!(matches!(email.command, EmailSubcommand::Star { ref id } if id == "m1"));
    assert!(Cli::try_parse_from(["dashboard-cli", "email", "open"]).is_err());
}

#[test]
fn base_url_flag_rederives_ws_url() {
    let cli = Cli::try_parse_from(["dashboard-cli", "--base-url", "https://assistant.example.com/", "watch"]).unwrap();
    let config = build_config(&cli).unwrap();
    assert_eq!(config.base_url, "https://assistant.example.com");
    assert_eq!(config.ws_url, "wss://assistant.example.com/ws");
}

#[test]
fn truncate_marks_cut_text() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a very long sender name", 8), "a very …");
}

#[test]
fn question_suffix_lists_matching_commands() {
    let catalog = CommandCatalog::embedded();
    let mut input = CommandInput::new();
    let hints = completion_hint(&mut input, &catalog, "/todo?").unwrap();
    assert_eq!(hints.len(), 4);
    assert!(hints.iter().all(|h| h.starts_with("/todo ")));
    assert!(input.text().is_empty());
    assert!(!input.is_open());
}

#[test]
fn ordinary_lines_are_sent() {
    let catalog = CommandCatalog::embedded();
    let mut input = CommandInput::new();
    assert_eq!(completion_hint(&mut input, &catalog, "/todo list"), None);
    assert_eq!(completion_hint(&mut input, &catalog, "what's on today?"), None);
    assert_eq!(completion_hint(&mut input, &catalog, "/nothing-like-this?"), None);
}

//! Dashboard context: owns the store, REST client, realtime client, and
//! command catalog, and builds widgets from them.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front-ends create one [`Dashboard`], call [`Dashboard::start`] inside a
//! tokio runtime, and mount the widgets they render. Nothing here is global;
//! tests build a dashboard from mock parts with [`Dashboard::from_parts`].

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::config::DashboardConfig;
use crate::lock;
use crate::net::api::{ApiClient, ApiError, DashboardApi};
use crate::net::frame_client::{ConnectionStatus, RealtimeClient};
use crate::state::Store;
use crate::state::calendar::CalendarAction;
use crate::state::chat::ChatAction;
use crate::util::commands::{CommandCatalog, CommandCatalogError};
use crate::widgets::{CalendarWidget, ChatWidget, EmailWidget};

pub const CONNECTION_LOST_MESSAGE: &str = "Lost connection to the assistant. Live updates are paused.";

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Commands(#[from] CommandCatalogError),
}

pub struct Dashboard {
    config: DashboardConfig,
    store: Arc<Store>,
    api: Arc<dyn DashboardApi>,
    realtime: RealtimeClient,
    catalog: Arc<CommandCatalog>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl Dashboard {
    /// Build the production context from `config`.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built or a configured command
    /// catalog file cannot be loaded.
    pub fn new(config: DashboardConfig) -> Result<Self, DashboardError> {
        let api = Arc::new(ApiClient::new(&config)?);
        let realtime = RealtimeClient::new(config.ws_url.clone(), config.reconnect);
        let catalog = CommandCatalog::load(config.commands_path.as_deref())?;
        Ok(Self::from_parts(config, api, realtime, catalog))
    }

    /// Assemble a context from prebuilt parts.
    #[must_use]
    pub fn from_parts(
        config: DashboardConfig,
        api: Arc<dyn DashboardApi>,
        realtime: RealtimeClient,
        catalog: CommandCatalog,
    ) -> Self {
        let store = Arc::new(Store::default());
        store.dispatch(CalendarAction::SetHiddenCalendars(config.hidden_calendars.clone()));
        Self {
            config,
            store,
            api,
            realtime,
            catalog: Arc::new(catalog),
            watcher: Mutex::new(None),
        }
    }

    /// Connect the realtime client and watch its status. An exhausted
    /// reconnect becomes a chat error. Calling again while running is a
    /// no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut watcher = lock(&self.watcher);
        if watcher.as_ref().is_none_or(JoinHandle::is_finished) {
            let mut status = self.realtime.watch_status();
            let store = Arc::clone(&self.store);
            *watcher = Some(tokio::spawn(async move {
                while status.changed().await.is_ok() {
                    let current = *status.borrow_and_update();
                    match current {
                        ConnectionStatus::Failed => {
                            tracing::error!("realtime reconnect attempts exhausted");
                            store.dispatch(ChatAction::SetError(Some(CONNECTION_LOST_MESSAGE.to_owned())));
                        }
                        ConnectionStatus::Connected => tracing::info!("realtime connected"),
                        ConnectionStatus::Connecting | ConnectionStatus::Disconnected => {}
                    }
                }
            }));
        }
        drop(watcher);
        tracing::info!(url = self.realtime.url(), "starting realtime connection");
        self.realtime.connect();
    }

    /// Stop the realtime connection and the status watcher.
    pub fn shutdown(&self) {
        if let Some(watcher) = lock(&self.watcher).take() {
            watcher.abort();
        }
        self.realtime.shutdown();
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    #[must_use]
    pub fn api(&self) -> &Arc<dyn DashboardApi> {
        &self.api
    }

    #[must_use]
    pub fn realtime(&self) -> &RealtimeClient {
        &self.realtime
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<CommandCatalog> {
        &self.catalog
    }

    #[must_use]
    pub fn chat_widget(&self) -> ChatWidget {
        ChatWidget::mount(
            Arc::clone(&self.store),
            Arc::clone(&self.api),
            self.realtime.clone(),
            Arc::clone(&self.catalog),
        )
    }

    #[must_use]
    pub fn calendar_widget(&self) -> CalendarWidget {
        CalendarWidget::mount(
            Arc::clone(&self.store),
            Arc::clone(&self.api),
            self.realtime.clone(),
            Some(self.config.calendar_max_results),
        )
    }

    #[must_use]
    pub fn email_widget(&self) -> EmailWidget {
        EmailWidget::new(Arc::clone(&self.store), Arc::clone(&self.api), self.config.starred_max_results)
    }
}

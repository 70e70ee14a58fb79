//! REST client for the assistant backend.
//!
//! [`DashboardApi`] is the seam widgets depend on; [`ApiClient`] is the
//! `reqwest` implementation. Endpoints are described as unencoded path
//! segments and joined onto the base URL with [`Url::path_segments_mut`], so
//! message ids are escaped by the URL parser rather than by hand.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures and non-2xx statuses both surface as [`ApiError`];
//! widgets translate them into slice errors or chat messages.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{
    CalendarEvent, ChatRequest, ChatResponse, CommandRequest, Email, EmailContentResponse, EmailListResponse,
};
use crate::config::DashboardConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("base URL {0} cannot carry API paths")]
    InvalidBaseUrl(String),
}

/// Backend operations used by the widgets.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// `POST /chat`; returns the assistant's reply text.
    async fn send_chat(&self, message: &str, context: &Value) -> Result<String, ApiError>;

    /// `GET /calendar/events`.
    async fn fetch_calendar_events(&self, max_results: Option<u32>) -> Result<Vec<CalendarEvent>, ApiError>;

    /// `GET /api/emails/recent`.
    async fn fetch_recent_emails(&self) -> Result<Vec<Email>, ApiError>;

    /// `GET /api/emails/starred`.
    async fn fetch_starred_emails(&self, max_results: u32) -> Result<Vec<Email>, ApiError>;

    /// `GET /api/emails/{id}/content`; HTML when available, else plain text.
    async fn fetch_email_content(&self, id: &str) -> Result<Option<String>, ApiError>;

    async fn mark_read(&self, id: &str) -> Result<(), ApiError>;

    /// `POST /api/emails/{id}/star` or `/unstar`.
    async fn set_starred(&self, id: &str, starred: bool) -> Result<(), ApiError>;

    /// `POST /command`; returns the raw JSON response.
    async fn run_command(&self, command: &str) -> Result<Value, ApiError>;
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Build a client for `config.base_url` with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the TLS backend fails to initialize
    /// and [`ApiError::InvalidBaseUrl`] if the base URL does not parse.
    pub fn new(config: &DashboardConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url).map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &Endpoint<'_>) -> Result<T, ApiError> {
        let url = endpoint.join(&self.base)?;
        let resp = self.http.get(url.clone()).send().await?;
        let resp = check_status(&url, resp)?;
        Ok(resp.json::<T>().await?)
    }

    async fn post_empty(&self, endpoint: &Endpoint<'_>) -> Result<(), ApiError> {
        let url = endpoint.join(&self.base)?;
        let resp = self.http.post(url.clone()).send().await?;
        check_status(&url, resp)?;
        Ok(())
    }
}

fn check_status(url: &Url, resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        let endpoint = endpoint_label(url);
        tracing::warn!(%endpoint, status = status.as_u16(), "backend request failed");
        Err(ApiError::Status { endpoint, status: status.as_u16() })
    }
}

/// Path plus query, as reported in errors and logs.
fn endpoint_label(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}

#[async_trait::async_trait]
impl DashboardApi for ApiClient {
    async fn send_chat(&self, message: &str, context: &Value) -> Result<String, ApiError> {
        let url = chat_endpoint().join(&self.base)?;
        let resp = self
            .http
            .post(url.clone())
            .json(&ChatRequest { message, context })
            .send()
            .await?;
        let resp = check_status(&url, resp)?;
        Ok(resp.json::<ChatResponse>().await?.response)
    }

    async fn fetch_calendar_events(&self, max_results: Option<u32>) -> Result<Vec<CalendarEvent>, ApiError> {
        self.get_json(&calendar_events_endpoint(max_results)).await
    }

    async fn fetch_recent_emails(&self) -> Result<Vec<Email>, ApiError> {
        let body: EmailListResponse = self.get_json(&recent_emails_endpoint()).await?;
        Ok(body.emails)
    }

    async fn fetch_starred_emails(&self, max_results: u32) -> Result<Vec<Email>, ApiError> {
        let body: EmailListResponse = self.get_json(&starred_emails_endpoint(max_results)).await?;
        Ok(body.emails)
    }

    async fn fetch_email_content(&self, id: &str) -> Result<Option<String>, ApiError> {
        let body: EmailContentResponse = self.get_json(&email_content_endpoint(id)).await?;
        Ok(body.into_body())
    }

    async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        self.post_empty(&mark_read_endpoint(id)).await
    }

    async fn set_starred(&self, id: &str, starred: bool) -> Result<(), ApiError> {
        self.post_empty(&star_endpoint(id, starred)).await
    }

    async fn run_command(&self, command: &str) -> Result<Value, ApiError> {
        let url = command_endpoint().join(&self.base)?;
        let resp = self
            .http
            .post(url.clone())
            .json(&CommandRequest { command })
            .send()
            .await?;
        let resp = check_status(&url, resp)?;
        Ok(resp.json::<Value>().await?)
    }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

/// A backend route: unencoded path segments plus an optional result limit.
#[derive(Debug, PartialEq, Eq)]
struct Endpoint<'a> {
    segments: Vec<&'a str>,
    max_results: Option<u32>,
}

impl<'a> Endpoint<'a> {
    fn new(segments: &[&'a str]) -> Self {
        Self { segments: segments.to_vec(), max_results: None }
    }

    fn limit(mut self, max_results: Option<u32>) -> Self {
        self.max_results = max_results;
        self
    }

    /// Append the segments to `base`, escaping each one.
    fn join(&self, base: &Url) -> Result<Url, ApiError> {
        let mut url = base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(base.to_string()))?
            .pop_if_empty()
            .extend(&self.segments);
        if let Some(n) = self.max_results {
            url.query_pairs_mut().append_pair("max_results", &n.to_string());
        }
        Ok(url)
    }
}

fn chat_endpoint() -> Endpoint<'static> {
    Endpoint::new(&["chat"])
}

fn command_endpoint() -> Endpoint<'static> {
    Endpoint::new(&["command"])
}

fn recent_emails_endpoint() -> Endpoint<'static> {
    Endpoint::new(&["api", "emails", "recent"])
}

fn calendar_events_endpoint(max_results: Option<u32>) -> Endpoint<'static> {
    Endpoint::new(&["calendar", "events"]).limit(max_results)
}

fn starred_emails_endpoint(max_results: u32) -> Endpoint<'static> {
    Endpoint::new(&["api", "emails", "starred"]).limit(Some(max_results))
}

fn email_content_endpoint(id: &str) -> Endpoint<'_> {
    Endpoint::new(&["api", "emails", id, "content"])
}

fn mark_read_endpoint(id: &str) -> Endpoint<'_> {
    Endpoint::new(&["api", "emails", id, "mark-read"])
}

fn star_endpoint(id: &str, starred: bool) -> Endpoint<'_> {
    let verb = if starred { "star" } else { "unstar" };
    Endpoint::new(&["api", "emails", id, verb])
}

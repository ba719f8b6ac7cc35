//! Outbound sync client
//!
//! Ships one extracted page to the save endpoint as a JSON record. The API
//! key travels both as an `x-api-key` header and as an `apikey` query
//! parameter, matching what the endpoint accepts.

use std::time::Duration;

use scraper::Html;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::extractor::{extract, page_title, ExtractError};

/// Fixed text callers substitute when the page denies content access
/// entirely; the extractor itself is never invoked in that case.
pub const RESTRICTED_PAGE_PLACEHOLDER: &str =
    "Content could not be extracted (Restricted Page).";

/// Tags attached to records assembled from a page.
const DEFAULT_TAGS: &[&str] = &["web-clip", "extension"];

/// Request timeout for the save endpoint.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum number of body characters quoted back in a server error.
const ERROR_EXCERPT_LEN: usize = 50;

/// Outbound record wrapping one extracted page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipRecord {
    pub title: String,
    pub content: String,
    pub url: String,
    pub tags: Vec<String>,
}

impl ClipRecord {
    /// Assemble a record from a parsed page: document title (or
    /// `"Untitled Page"`), extracted content and the default tags.
    pub fn from_document(document: &Html, url: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            title: page_title(document).unwrap_or_else(|| "Untitled Page".to_string()),
            content: extract(document)?,
            url: url.to_string(),
            tags: DEFAULT_TAGS.iter().map(|tag| tag.to_string()).collect(),
        })
    }
}

/// Errors from talking to the save endpoint.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SyncError {
    #[error("invalid API key ({0})")]
    InvalidApiKey(u16),
    #[error("endpoint not found (404)")]
    EndpointNotFound,
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
}

/// Blocking client for the save endpoint.
pub struct SyncClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl SyncClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(REQUEST_TIMEOUT))
                // Non-2xx still yields a response; the body holds the
                // server's error message.
                .http_status_as_error(false)
                .build(),
        );
        Self {
            agent,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// POST one record to the endpoint.
    pub fn save(&self, record: &ClipRecord) -> Result<(), SyncError> {
        let target = self.target_url();
        let response = self
            .agent
            .post(&target)
            .header("x-api-key", self.api_key.as_str())
            .send_json(record)
            .map_err(|err| SyncError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            log::debug!("saved record `{}`", record.title);
            return Ok(());
        }
        let body = response.into_body().read_to_string().unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body))
    }

    /// Check endpoint and API key by posting a fixed ping record.
    pub fn test_connection(&self) -> Result<(), SyncError> {
        let ping = ClipRecord {
            title: "Test Connection".to_string(),
            content: "Ping".to_string(),
            url: "http://test".to_string(),
            tags: vec!["test".to_string()],
        };
        self.save(&ping)
    }

    /// Endpoint with the API key appended as a query parameter. An endpoint
    /// that does not parse as a URL is used verbatim (header auth only).
    fn target_url(&self) -> String {
        match Url::parse(&self.endpoint) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("apikey", &self.api_key);
                url.to_string()
            }
            Err(err) => {
                log::warn!("endpoint is not a valid URL ({err}), sending key in header only");
                self.endpoint.clone()
            }
        }
    }
}

fn classify_failure(status: u16, body: &str) -> SyncError {
    match status {
        401 | 403 => SyncError::InvalidApiKey(status),
        404 => SyncError::EndpointNotFound,
        _ => SyncError::Server {
            status,
            message: server_message(body),
        },
    }
}

/// Prefer the server's JSON `error` field; otherwise quote a short excerpt.
fn server_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }
    body.chars().take(ERROR_EXCERPT_LEN).collect()
}

//! HTTP fetcher implementation
//!
//! This module handles the single network call behind a probe:
//! - Building the HTTP client with the identifying user agent
//! - Rendering the endpoint URL for a candidate ID
//! - Classifying each response into one per-attempt `ProbeOutcome`
//!
//! Retrying is not done here; see `Prober`.

use crate::config::Config;
use crate::range::CandidateId;
use crate::ConfigError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const ID_PLACEHOLDER: &str = "{id}";

/// Raw body of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Candidate ID the document belongs to
    pub id: CandidateId,

    /// URL that was fetched
    pub url: String,

    /// Response text, never empty
    pub body: String,
}

/// Why a single attempt could not be classified as found or absent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransientCause {
    /// HTTP 200 with an empty body; the endpoint glitches this way under load
    #[error("empty body on HTTP 200")]
    EmptyBody,

    /// Any status other than 200 or 404
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// Connection, timeout, or body read failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Classification of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The resource exists
    Found(Document),

    /// HTTP 404, terminal
    NotFound,

    /// Worth retrying after a backoff
    TransientFailure(TransientCause),
}

impl ProbeOutcome {
    /// Short label used in log events
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::NotFound => "not_found",
            Self::TransientFailure(_) => "transient_failure",
        }
    }
}

/// Final classification of a probed ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Found(Document),
    NotFound,
}

/// Endpoint URL template with an `{id}` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    template: String,
}

impl EndpointTemplate {
    /// Parses a template, checking that it contains `{id}` and renders to an
    /// absolute http(s) URL
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        if !template.contains(ID_PLACEHOLDER) {
            return Err(ConfigError::InvalidEndpoint(format!(
                "'{}' does not contain {}",
                template, ID_PLACEHOLDER
            )));
        }

        let sample = template.replace(ID_PLACEHOLDER, "0");
        let url = Url::parse(&sample)
            .map_err(|e| ConfigError::InvalidEndpoint(format!("'{}': {}", template, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidEndpoint(format!(
                "'{}' must use http or https",
                template
            )));
        }

        Ok(Self {
            template: template.to_string(),
        })
    }

    /// Renders the URL for one candidate ID
    pub fn url_for(&self, id: CandidateId) -> String {
        self.template.replace(ID_PLACEHOLDER, &id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

/// Performs one fetch attempt for a candidate
///
/// Implementations never retry and never fail: every transport problem is
/// folded into `ProbeOutcome::TransientFailure`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, id: CandidateId, url: &str) -> ProbeOutcome;
}

/// Builds an HTTP client with the configured user agent and timeout
///
/// # Example
///
/// ```no_run
/// use giferator_disco::config::Config;
/// use giferator_disco::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_millis(config.prober.request_timeout_ms);

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Classifies a completed HTTP exchange
///
/// | Response | Outcome |
/// |----------|---------|
/// | 200, non-empty body | `Found` |
/// | 200, empty body | `TransientFailure(EmptyBody)` |
/// | 404 | `NotFound` |
/// | anything else | `TransientFailure(UnexpectedStatus)` |
pub fn classify_response(
    id: CandidateId,
    url: &str,
    status: StatusCode,
    body: String,
) -> ProbeOutcome {
    match status {
        StatusCode::OK if body.is_empty() => ProbeOutcome::TransientFailure(TransientCause::EmptyBody),
        StatusCode::OK => ProbeOutcome::Found(Document {
            id,
            url: url.to_string(),
            body,
        }),
        StatusCode::NOT_FOUND => ProbeOutcome::NotFound,
        other => ProbeOutcome::TransientFailure(TransientCause::UnexpectedStatus(other.as_u16())),
    }
}

/// `Fetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, id: CandidateId, url: &str) -> ProbeOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::TransientFailure(transport_cause(&e)),
        };

        let status = response.status();
        tracing::debug!(id, status = status.as_u16(), "Got response");

        // Only a 200 body is ever inspected
        if status != StatusCode::OK {
            return classify_response(id, url, status, String::new());
        }

        match response.text().await {
            Ok(body) => classify_response(id, url, status, body),
            Err(e) => ProbeOutcome::TransientFailure(transport_cause(&e)),
        }
    }
}

fn transport_cause(error: &reqwest::Error) -> TransientCause {
    let description = if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        error.to_string()
    };
    TransientCause::Transport(description)
}

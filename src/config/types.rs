use serde::Deserialize;

/// Endpoint probed when no configuration file overrides it
pub const DEFAULT_ENDPOINT: &str = "http://giferator.easports.com/gif/{id}";

/// Identifying client signature sent with every probe
pub const DEFAULT_CRAWLER_NAME: &str = "ArchiveTeam";

/// Main configuration structure for Giferator-Disco
///
/// Every section is optional; a missing file or section falls back to the
/// values the discovery job has always used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub prober: ProberConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Probe and retry behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProberConfig {
    /// URL template; `{id}` is replaced by the candidate ID
    pub endpoint: String,

    /// Retries allowed after the first attempt before abandoning an ID
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Fixed delay between a transient failure and the next attempt (milliseconds)
    #[serde(rename = "backoff-ms")]
    pub backoff_ms: u64,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_retries: 10,
            backoff_ms: 10_000,
            request_timeout_ms: 60_000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name sent as the User-Agent
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Optional URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// `Name` alone, or `Name (+ContactURL)` when a contact URL is set.
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{} (+{})", self.crawler_name, contact),
            None => self.crawler_name.clone(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: DEFAULT_CRAWLER_NAME.to_string(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit a `meta:<id>` record after each `page:<id>` record
    #[serde(rename = "emit-meta")]
    pub emit_meta: bool,

    /// Which records a found ID produces
    pub mode: ScanMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            emit_meta: true,
            mode: ScanMode::Full,
        }
    }
}

/// Record set produced for each found ID
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// page, optional meta, then gif/jpg asset records
    #[default]
    Full,

    /// A single `gif:<id>` record per found ID
    Existence,
}

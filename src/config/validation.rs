use crate::config::types::{Config, ProberConfig, UserAgentConfig};
use crate::crawler::EndpointTemplate;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_prober_config(&config.prober)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates probe and retry settings
fn validate_prober_config(config: &ProberConfig) -> Result<(), ConfigError> {
    EndpointTemplate::parse(&config.endpoint)?;

    if config.backoff_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "backoff_ms must be >= 1ms, got {}ms",
            config.backoff_ms
        )));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 1ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
///
/// The name ends up in a header value, so it must be printable ASCII.
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    let header = config.header_value();
    if !header.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return Err(ConfigError::Validation(format!(
            "user agent must be printable ASCII, got '{}'",
            header
        )));
    }

    if let Some(contact) = &config.contact_url {
        url::Url::parse(contact).map_err(|e| {
            ConfigError::Validation(format!("Invalid contact_url '{}': {}", contact, e))
        })?;
    }

    Ok(())
}

use crate::config::types::{AuditConfig, Config, CrawlerConfig, ModelConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_model_config(&config.model)?;
    validate_crawler_config(&config.crawler)?;
    validate_audit_config(&config.audit)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates the text-generation endpoint configuration
fn validate_model_config(config: &ModelConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid model endpoint: {}", e)))?;

    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Model endpoint must use HTTP or HTTPS, got '{}'",
            endpoint.scheme()
        )));
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    // The connect budget is part of the overall request budget
    if config.request_timeout_secs < config.connect_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs ({}) must be >= connect_timeout_secs ({})",
            config.request_timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_limit < 1 || config.page_limit > 500 {
        return Err(ConfigError::Validation(format!(
            "page_limit must be between 1 and 500, got {}",
            config.page_limit
        )));
    }

    if config.fetch_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_audit_config(config: &AuditConfig) -> Result<(), ConfigError> {
    if config.chunk_lines < 1 {
        return Err(ConfigError::Validation(format!(
            "chunk_lines must be >= 1, got {}",
            config.chunk_lines
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

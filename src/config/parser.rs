use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable that overrides `model.default-credential`
pub const CREDENTIAL_ENV_VAR: &str = "TELEX_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// The default credential may be supplied through the `TELEX_API_KEY`
/// environment variable, which takes precedence over the file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use seo_auditor::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Model: {}", config.model.model);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: Config = toml::from_str(&content)?;
    let config = apply_credential_override(config, std::env::var(CREDENTIAL_ENV_VAR).ok());

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Replaces the default credential when an override is present and non-empty
fn apply_credential_override(mut config: Config, credential: Option<String>) -> Config {
    if let Some(credential) = credential.filter(|c| !c.trim().is_empty()) {
        config.model.default_credential = Some(credential);
    }
    config
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so deployments can tell which configuration a running
/// agent was started with.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

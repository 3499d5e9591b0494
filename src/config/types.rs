use serde::Deserialize;

/// Main configuration structure for the audit agent
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Front door listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Text-generation endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Full URL of the chat endpoint
    pub endpoint: String,

    /// Model identifier sent in the request body and the model header
    pub model: String,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Time allowed for the complete response (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Credential used when a request does not carry its own
    #[serde(rename = "default-credential", default)]
    pub default_credential: Option<String>,
}

/// Link discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages visited per crawl
    #[serde(rename = "page-limit", default = "default_page_limit")]
    pub page_limit: usize,

    /// Timeout for a single page fetch (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

/// Audit orchestration configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Maximum number of document lines sent to the model per chunk
    #[serde(rename = "chunk-lines", default = "default_chunk_lines")]
    pub chunk_lines: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            chunk_lines: default_chunk_lines(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    45
}

fn default_page_limit() -> usize {
    20
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_chunk_lines() -> usize {
    500
}

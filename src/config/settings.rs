//! Configuration settings structures for pushrelay-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::LoggerConfig;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "pushrelay-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_keep_alive_timeout() -> u64 {
    75
}

fn default_bark_server() -> String {
    "https://api.day.app".to_string()
}

fn default_wxpusher_api_url() -> String {
    "https://wxpusher.zjiecode.com/api/send/message".to_string()
}

fn default_content_type() -> i32 {
    1
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive_timeout")]
    pub keep_alive_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            keep_alive_timeout: default_keep_alive_timeout(),
        }
    }
}

// ============================================================================
// Bark Router Configuration
// ============================================================================

/// Raw Bark router settings, as written by the operator.
///
/// The `apikey` field is a whitespace-separated text blob of `username:device_key`
/// entries; it is parsed into a recipient map when the router snapshot is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarkSettings {
    /// Whether the Bark router is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Bark server base URL
    #[serde(default = "default_bark_server")]
    pub server: String,

    /// Recipient text: whitespace-separated `username:device_key` tokens
    #[serde(default)]
    pub apikey: String,

    /// Static extra parameters in query-string syntax, merged into every request
    /// body (e.g. `sound=alarm&group=media`)
    #[serde(default)]
    pub params: String,

    /// Message-type allowlist by catalog name; empty means allow all
    #[serde(default)]
    pub msgtypes: Vec<String>,
}

impl Default for BarkSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            server: default_bark_server(),
            apikey: String::new(),
            params: String::new(),
            msgtypes: Vec::new(),
        }
    }
}

// ============================================================================
// WxPusher Router Configuration
// ============================================================================

/// Raw WxPusher router settings, as written by the operator.
///
/// The `uids` field is a comma-separated text blob mixing `username:uid`
/// entries with bare UIDs (the legacy broadcast format).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WxPusherSettings {
    /// Whether the WxPusher router is enabled
    #[serde(default)]
    pub enabled: bool,

    /// WxPusher application token (`AT_...`)
    #[serde(default)]
    pub app_token: String,

    /// WxPusher send API endpoint
    #[serde(default = "default_wxpusher_api_url")]
    pub api_url: String,

    /// Recipient text: comma-separated `username:uid` entries and bare UIDs
    #[serde(default)]
    pub uids: String,

    /// Topic ids, comma-separated
    #[serde(default)]
    pub topic_ids: String,

    /// Content type: 1 = text, 2 = HTML, 3 = markdown
    #[serde(default = "default_content_type")]
    pub content_type: i32,

    /// Message-type allowlist by catalog name; empty means allow all
    #[serde(default)]
    pub msgtypes: Vec<String>,

    /// Fire one forced test message through the pipeline after startup
    #[serde(default)]
    pub run_on_start: bool,
}

impl Default for WxPusherSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            app_token: String::new(),
            api_url: default_wxpusher_api_url(),
            uids: String::new(),
            topic_ids: String::new(),
            content_type: default_content_type(),
            msgtypes: Vec::new(),
            run_on_start: false,
        }
    }
}

// ============================================================================
// Settings (root)
// ============================================================================

/// Root settings object aggregating all configuration sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logger: LoggerConfig,

    #[serde(default)]
    pub bark: BarkSettings,

    #[serde(default)]
    pub wxpusher: WxPusherSettings,
}

impl Settings {
    /// Validates the loaded settings.
    ///
    /// Missing push credentials are deliberately not an error here: an
    /// unconfigured router simply reports itself disabled and skips events.
    /// Only values that would make a request malformed are rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bark.server.is_empty()
            && !self.bark.server.starts_with("http://")
            && !self.bark.server.starts_with("https://")
        {
            return Err(ConfigError::validation(
                "bark.server",
                "Server URL must use http or https",
            ));
        }

        if !self.wxpusher.api_url.starts_with("http://")
            && !self.wxpusher.api_url.starts_with("https://")
        {
            return Err(ConfigError::validation(
                "wxpusher.api_url",
                "API URL must use http or https",
            ));
        }

        if !(1..=3).contains(&self.wxpusher.content_type) {
            return Err(ConfigError::validation(
                "wxpusher.content_type",
                "Content type must be 1 (text), 2 (HTML) or 3 (markdown)",
            ));
        }

        Ok(())
    }
}

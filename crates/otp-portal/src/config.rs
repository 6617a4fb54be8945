//! Configuration for the portal.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Portal configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Record storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the HTML pages
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON documents
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Registered users document, relative to `data_dir`
    #[serde(default = "default_users_file")]
    pub users_file: String,

    /// Contact submissions document, relative to `data_dir`
    #[serde(default = "default_contacts_file")]
    pub contacts_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Mail relay base URL
    #[serde(default)]
    pub api_url: Option<String>,

    /// Mail account user (also the default sender)
    #[serde(default)]
    pub username: Option<String>,

    /// Mail account password
    #[serde(default)]
    pub password: Option<String>,

    /// Sender address override
    #[serde(default)]
    pub from: Option<String>,

    /// Relay request timeout
    #[serde(default = "default_mail_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle lifetime of a session
    #[serde(default = "default_session_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute on form endpoints
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            users_file: default_users_file(),
            contacts_file: default_contacts_file(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            username: None,
            password: None,
            from: None,
            timeout: default_mail_timeout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: default_session_ttl(),
            cookie_name: default_cookie_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    4000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_users_file() -> String {
    "users.json".into()
}

fn default_contacts_file() -> String {
    "contactus.json".into()
}

fn default_mail_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_session_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_cookie_name() -> String {
    "portal.sid".into()
}

fn default_global_rpm() -> u32 {
    600
}

fn default_log_level() -> String {
    "info".into()
}

impl StorageConfig {
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn contacts_path(&self) -> PathBuf {
        self.data_dir.join(&self.contacts_file)
    }
}

/// Everything needed to reach the mail relay.
#[derive(Debug, Clone, Copy)]
pub struct MailCredentials<'a> {
    pub api_url: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

impl MailConfig {
    /// Relay settings, if all of them are present.
    pub fn credentials(&self) -> Option<MailCredentials<'_>> {
        Some(MailCredentials {
            api_url: self.api_url.as_deref().filter(|s| !s.is_empty())?,
            username: self.username.as_deref().filter(|s| !s.is_empty())?,
            password: self.password.as_deref().filter(|s| !s.is_empty())?,
        })
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

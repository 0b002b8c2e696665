//! Server configuration loading from file, environment variables and flags.

use meshboard_admin::{AdminClient, AdminEndpoint, AdminError};
use serde::Deserialize;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Node name used when the hostname cannot be determined.
pub const FALLBACK_NODE_NAME: &str = "Unnamed node";

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Identity of the node shown on the dashboard.
    #[serde(default)]
    pub node: NodeConfig,

    /// Admin endpoint settings.
    #[serde(default)]
    pub admin: AdminConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity of the node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Friendly name shown in the page header.
    #[serde(default = "default_node_name")]
    pub name: String,
}

/// Where and how to reach the admin endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Endpoint address, `unix:///path` or `host:port`.
    #[serde(default = "default_admin_endpoint")]
    pub endpoint: String,

    /// Bound on one admin query, in seconds.
    #[serde(default = "default_admin_timeout_secs")]
    pub timeout_secs: u64,
}

/// Network and file settings for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Page template containing `%HOSTNAME%` and `%PEERS%`.
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Directory holding the stylesheet and chart scripts.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "meshboard_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_node_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| FALLBACK_NODE_NAME.to_string())
}

fn default_admin_endpoint() -> String {
    "unix:///var/run/yggdrasil.sock".to_string()
}

fn default_admin_timeout_secs() -> u64 {
    meshboard_admin::DEFAULT_TIMEOUT.as_secs()
}

fn default_listen() -> SocketAddr {
    SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 80)
}

fn default_template() -> PathBuf {
    PathBuf::from("template.html")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: default_node_name(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            endpoint: default_admin_endpoint(),
            timeout_secs: default_admin_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            template: default_template(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Parses the configured admin endpoint address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AdminEndpoint` if the address is malformed.
    pub fn admin_endpoint(&self) -> Result<AdminEndpoint, ConfigError> {
        Ok(self.admin.endpoint.parse()?)
    }

    /// Builds an admin client from the `[admin]` section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AdminEndpoint` if the address is malformed and
    /// `ConfigError::ZeroTimeout` if `timeout_secs` is 0.
    pub fn admin_client(&self) -> Result<AdminClient, ConfigError> {
        if self.admin.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(AdminClient::new(
            self.admin_endpoint()?,
            Duration::from_secs(self.admin.timeout_secs),
        ))
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The admin endpoint address is malformed.
    #[error("invalid admin endpoint: {0}")]
    AdminEndpoint(#[from] AdminError),

    /// `admin.timeout_secs` is 0, which would fail every query.
    #[error("admin.timeout_secs must be at least 1")]
    ZeroTimeout,
}

/// Where the base configuration came from, before overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from the configuration file.
    File,
    /// Built-in defaults: no path was given or the file does not exist.
    Defaults,
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment variable overrides.
///
/// Environment variable overrides:
/// - `MESHBOARD_NODE_NAME` overrides `node.name`
/// - `MESHBOARD_ADMIN_ENDPOINT` overrides `admin.endpoint`
/// - `MESHBOARD_ADMIN_TIMEOUT_SECS` overrides `admin.timeout_secs`
/// - `MESHBOARD_LISTEN` overrides `server.listen`
/// - `MESHBOARD_TEMPLATE` overrides `server.template`
/// - `MESHBOARD_STATIC_DIR` overrides `server.static_dir`
/// - `MESHBOARD_LOG_LEVEL` overrides `logging.level`
/// - `MESHBOARD_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// Runs before logging is initialized, so the returned [`ConfigSource`]
/// lets the caller report a fallback to defaults once it can.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<(Config, ConfigSource), ConfigError> {
    let (mut config, source) = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => (toml::from_str(&contents)?, ConfigSource::File),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                (Config::default(), ConfigSource::Defaults)
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => (Config::default(), ConfigSource::Defaults),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok((config, source))
}

/// Applies `MESHBOARD_*` overrides read through `lookup`.
///
/// Values that fail to parse are ignored with a warning.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = lookup("MESHBOARD_NODE_NAME") {
        config.node.name = name;
    }
    if let Some(endpoint) = lookup("MESHBOARD_ADMIN_ENDPOINT") {
        config.admin.endpoint = endpoint;
    }
    if let Some(timeout) = lookup("MESHBOARD_ADMIN_TIMEOUT_SECS") {
        match timeout.parse() {
            Ok(parsed) => config.admin.timeout_secs = parsed,
            Err(_) => tracing::warn!(value = %timeout, "ignoring invalid MESHBOARD_ADMIN_TIMEOUT_SECS"),
        }
    }
    if let Some(listen) = lookup("MESHBOARD_LISTEN") {
        match listen.parse() {
            Ok(parsed) => config.server.listen = parsed,
            Err(_) => tracing::warn!(value = %listen, "ignoring invalid MESHBOARD_LISTEN"),
        }
    }
    if let Some(template) = lookup("MESHBOARD_TEMPLATE") {
        config.server.template = PathBuf::from(template);
    }
    if let Some(dir) = lookup("MESHBOARD_STATIC_DIR") {
        config.server.static_dir = PathBuf::from(dir);
    }
    if let Some(level) = lookup("MESHBOARD_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("MESHBOARD_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_historic_flags() {
        let config = Config::default();
        assert_eq!(config.admin.endpoint, "unix:///var/run/yggdrasil.sock");
        assert_eq!(config.server.listen, "[::]:80".parse::<SocketAddr>().unwrap());
        assert_eq!(config.server.template, PathBuf::from("template.html"));
        assert_eq!(config.admin.timeout_secs, 10);
        assert!(!config.node.name.is_empty());
    }

    #[test]
    fn parses_partial_file() {
        let toml_str = r#"
            [node]
            name = "edge-router"

            [admin]
            endpoint = "tcp://localhost:9001"

            [server]
            listen = "127.0.0.1:8080"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.node.name, "edge-router");
        assert_eq!(
            config.admin_endpoint().unwrap(),
            AdminEndpoint::Tcp("localhost:9001".into())
        );
        assert_eq!(config.admin.timeout_secs, 10);
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.server.static_dir, PathBuf::from("."));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn env_overrides_replace_values_and_skip_garbage() {
        let env: HashMap<&str, &str> = [
            ("MESHBOARD_NODE_NAME", "from-env"),
            ("MESHBOARD_ADMIN_TIMEOUT_SECS", "3"),
            ("MESHBOARD_LISTEN", "not an address"),
            ("MESHBOARD_LOG_JSON", "1"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.node.name, "from-env");
        assert_eq!(config.admin.timeout_secs, 3);
        assert_eq!(config.server.listen, default_listen());
        assert!(config.logging.json);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let (config, source) = load_config(path.to_str()).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.server.template, PathBuf::from("template.html"));
    }

    #[test]
    fn existing_file_is_reported_as_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meshboard.toml");
        std::fs::write(&path, "[server]\ntemplate = \"page.html\"\n").unwrap();
        let (config, source) = load_config(path.to_str()).unwrap();
        assert_eq!(source, ConfigSource::File);
        assert_eq!(config.server.template, PathBuf::from("page.html"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nlisten = ").unwrap();
        assert!(matches!(
            load_config(path.to_str()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn invalid_admin_endpoint_is_rejected() {
        let mut config = Config::default();
        config.admin.endpoint = "ftp://example".to_string();
        assert!(matches!(
            config.admin_client(),
            Err(ConfigError::AdminEndpoint(AdminError::InvalidAddress { .. }))
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.admin.endpoint = "tcp://localhost:9001".to_string();
        apply_env_overrides(&mut config, |key| {
            (key == "MESHBOARD_ADMIN_TIMEOUT_SECS").then(|| "0".to_string())
        });
        assert!(matches!(config.admin_client(), Err(ConfigError::ZeroTimeout)));

        config.admin.timeout_secs = 1;
        assert_eq!(config.admin_client().unwrap().timeout(), Duration::from_secs(1));
    }
}

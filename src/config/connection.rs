//! Database connection configuration
//!
//! Loaded from an INI file with a single `[DATABASE]` section:
//!
//! ```ini
//! [DATABASE]
//! server = localhost
//! database = ORDER_DDS
//! username = etl_user
//! password = secret
//! ```
//!
//! Leaving `username` or `password` empty selects OS-identity
//! authentication.

use std::path::{Path, PathBuf};

use ini::Ini;

pub const DEFAULT_CONFIG_PATH: &str = "sql_server_config.cfg";

const SECTION: &str = "DATABASE";
const DEFAULT_SERVER: &str = "localhost";
const DEFAULT_DATABASE: &str = "ORDER_DDS";
const DEFAULT_PORT: u16 = 1433;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Malformed config: {0}")]
    Malformed(String),
}

/// How the connection authenticates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    SqlServer { username: String, password: String },
    /// Fall back to the identity of the OS user running the process
    Integrated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub trust_server_certificate: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            username: String::new(),
            password: String::new(),
            trust_server_certificate: true,
        }
    }
}

impl ConnectionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let ini = Ini::load_from_file(path)
            .map_err(|e| ConfigError::Malformed(format!("{}: {}", path.display(), e)))?;
        Self::from_ini(&ini)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let section = ini.section(Some(SECTION)).ok_or_else(|| {
            ConfigError::Malformed(format!("Config file must contain a [{}] section", SECTION))
        })?;

        let get = |key: &str| section.get(key).map(|v| v.trim().to_string());
        let defaults = Self::default();

        let raw_server = get("server")
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.server);
        let (server, server_port) = split_host_port(&raw_server)?;

        let port = match get("port").filter(|p| !p.is_empty()) {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| ConfigError::Malformed(format!("Invalid port: {}", p)))?,
            None => server_port.unwrap_or(DEFAULT_PORT),
        };

        let trust_server_certificate = match get("trust_server_certificate") {
            Some(v) => parse_flag(&v).ok_or_else(|| {
                ConfigError::Malformed(format!("Invalid trust_server_certificate: {}", v))
            })?,
            None => defaults.trust_server_certificate,
        };

        Ok(Self {
            server,
            port,
            database: get("database")
                .filter(|d| !d.is_empty())
                .unwrap_or(defaults.database),
            username: get("username").unwrap_or_default(),
            password: get("password").unwrap_or_default(),
            trust_server_certificate,
        })
    }

    /// SQL Server authentication needs both a username and a password
    pub fn credentials(&self) -> Credentials {
        if !self.username.is_empty() && !self.password.is_empty() {
            Credentials::SqlServer {
                username: self.username.clone(),
                password: self.password.clone(),
            }
        } else {
            Credentials::Integrated
        }
    }
}

/// Accepts `host`, `host,port` (SQL Server style) and `host:port`
fn split_host_port(raw: &str) -> Result<(String, Option<u16>), ConfigError> {
    let split = raw.rsplit_once(',').or_else(|| raw.rsplit_once(':'));
    match split {
        Some((host, port)) => {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Malformed(format!("Invalid server port in: {}", raw)))?;
            Ok((host.trim().to_string(), Some(port)))
        }
        None => Ok((raw.to_string(), None)),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

//! Process configuration from environment variables.
//!
//! # Responsibility
//! - Resolve the course store location, listen address, and logging target.
//!
//! # Invariants
//! - Every setting has a default; an empty environment yields a runnable config.
//! - Only SQLite stores are accepted.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:///gpa.db";
pub const DEFAULT_PORT: u16 = 8000;
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Where course records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub store: StoreLocation,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Absolute directory for rotating log files; stderr when `None`.
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedDatabaseUrl(String),
    InvalidPort(String),
    InvalidHost(String),
    InvalidEnvFile(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedDatabaseUrl(url) => write!(
                f,
                "unsupported DATABASE_URL `{url}`; expected sqlite:///<path> or a file path"
            ),
            Self::InvalidPort(value) => write!(f, "invalid PORT `{value}`"),
            Self::InvalidHost(value) => write!(f, "invalid HOST `{value}`"),
            Self::InvalidEnvFile(reason) => write!(f, "failed to load .env: {reason}"),
        }
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present;
    /// real environment variables win over it. A `.env` that exists but
    /// cannot be read or parsed is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        env_file_loaded(dotenvy::dotenv().map(|_| ()))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = read("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let store = parse_database_url(&database_url)?;

        let port = match read("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let host = match read("HOST") {
            Some(value) => value
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidHost(value))?,
            None => DEFAULT_HOST,
        };

        let log_level =
            read("LOG_LEVEL").unwrap_or_else(|| gradebook_core::default_log_level().to_string());

        Ok(Self {
            store,
            host,
            port,
            log_level,
            log_dir: read("LOG_DIR"),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parses a SQLAlchemy-style SQLite URL or a bare path.
///
/// `sqlite:///rel.db` is relative, `sqlite:////abs.db` is absolute.
pub fn parse_database_url(url: &str) -> Result<StoreLocation, ConfigError> {
    if url == "sqlite://" || url == "sqlite://:memory:" || url == "sqlite::memory:" {
        return Ok(StoreLocation::Memory);
    }

    if let Some(path) = url.strip_prefix("sqlite:///") {
        if path.is_empty() {
            return Err(ConfigError::UnsupportedDatabaseUrl(url.to_string()));
        }
        return Ok(StoreLocation::File(PathBuf::from(path)));
    }

    if url.contains("://") {
        return Err(ConfigError::UnsupportedDatabaseUrl(url.to_string()));
    }

    Ok(StoreLocation::File(PathBuf::from(url)))
}

/// Treats an absent `.env` as success; any other load failure is reported.
fn env_file_loaded(result: Result<(), dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::InvalidEnvFile(err.to_string())),
    }
}

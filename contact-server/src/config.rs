//! Server configuration read from the environment

use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),

    #[error("{0} is set but {1} is missing")]
    Incomplete(&'static str, &'static str),
}

/// SuperAdmin account created on startup if its email is not yet registered
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Root directory for the Delta tables
    pub data_dir: PathBuf,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ServerConfig {
    /// Read `PORT`, `CONTACT_DATA_DIR` and the optional
    /// `CONTACT_ADMIN_EMAIL` / `CONTACT_ADMIN_PASSWORD` / `CONTACT_ADMIN_NAME`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let data_dir = var("CONTACT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let bootstrap_admin = match (var("CONTACT_ADMIN_EMAIL"), var("CONTACT_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: var("CONTACT_ADMIN_NAME").unwrap_or_else(|| "Administrator".into()),
                email,
                password,
            }),
            (Some(_), None) => {
                return Err(ConfigError::Incomplete("CONTACT_ADMIN_EMAIL", "CONTACT_ADMIN_PASSWORD"))
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete("CONTACT_ADMIN_PASSWORD", "CONTACT_ADMIN_EMAIL"))
            }
            (None, None) => None,
        };

        Ok(Self { port, data_dir, bootstrap_admin })
    }
}

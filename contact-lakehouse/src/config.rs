//! Configuration for the contact lakehouse

use std::path::{Path, PathBuf};

/// Environment variable holding the HS256 signing secret
pub const JWT_SECRET_ENV: &str = "CONTACT_JWT_SECRET";

const DEV_JWT_SECRET: &str = "contact-lakehouse-dev-secret-change-me";

/// Lakehouse configuration
#[derive(Debug, Clone)]
pub struct LakehouseConfig {
    /// Root path for all Delta tables
    pub base_path: PathBuf,

    /// JWT secret for session token signing
    pub jwt_secret: String,

    /// Session lifetime in hours
    pub session_expiry_hours: u32,

    /// Vacuum retention in hours (default: 168 = 7 days)
    pub vacuum_retention_hours: u64,

    /// Bounded mailbox size for the auth and contact actors
    pub mailbox_capacity: usize,
}

impl LakehouseConfig {
    /// Create config with sensible defaults
    ///
    /// # Arguments
    /// * `base_path` - Root directory for Delta tables.
    ///   Structure created:
    ///   ```text
    ///   base_path/
    ///   ├── users/             (Delta table)
    ///   ├── sessions/          (Delta table)
    ///   └── contact_messages/  (Delta table)
    ///   ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            jwt_secret: std::env::var(JWT_SECRET_ENV)
                .unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            session_expiry_hours: 24,
            vacuum_retention_hours: 168, // 7 days
            mailbox_capacity: 256,
        }
    }

    /// Override JWT secret
    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    /// Override session expiry
    pub fn with_session_expiry_hours(mut self, hours: u32) -> Self {
        self.session_expiry_hours = hours;
        self
    }

    /// Override vacuum retention
    pub fn with_vacuum_retention_hours(mut self, hours: u64) -> Self {
        self.vacuum_retention_hours = hours;
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity.max(1);
        self
    }

    /// True when the signing secret is still the built-in development value
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Get path for a specific table
    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.base_path.join(table_name)
    }
}

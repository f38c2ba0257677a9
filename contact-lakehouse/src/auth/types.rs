//! Auth domain types: UserRole, UserRecord, JwtClaims

use serde::{Deserialize, Serialize};

/// Closed set of roles an identity can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Parse a stored role string. Unknown values yield `None` so a corrupted
    /// row can never be read as a privileged identity.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Permission level (higher = more access)
    pub fn level(&self) -> u8 {
        match self {
            Self::User => 0,
            Self::SuperAdmin => 1,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record as stored in the Delta `users` table, minus the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: String,
}

/// JWT claims for session tokens
///
/// No role is carried: authorization always reads the stored role.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user_id)
    pub sub: String,
    pub email: String,
    /// Expiry (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Token id, keeps two logins in the same second distinct
    pub jti: String,
}

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

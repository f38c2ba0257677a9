//! Error types for contact-lakehouse
//!
//! All operations return `Result<T, LakehouseError>`.
//! Callers that need to branch on the failure class use [`LakehouseError::kind`].

use thiserror::Error;

/// Unified error type for all lakehouse operations
#[derive(Error, Debug)]
pub enum LakehouseError {
    // ─── Session Errors ───

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token invalid: {0}")]
    TokenInvalid(String),

    // ─── Policy Errors ───

    #[error("Insufficient permissions: required={required}, have={actual}")]
    InsufficientPermissions { required: String, actual: String },

    // ─── Account Errors ───

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Password too weak: {0}")]
    PasswordTooWeak(String),

    // ─── Resource Errors ───

    #[error("Contact message not found: {0}")]
    ContactNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // ─── Storage Errors ───

    #[error("Delta table error: {0}")]
    DeltaTable(String),

    // ─── Infrastructure Errors ───

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(String),

    #[error("DataFusion error: {0}")]
    DataFusion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Actor unavailable: {0}")]
    ActorUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure classes surfaced to callers, one per distinct response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, malformed, expired, revoked or forged token
    Unauthenticated,
    /// Valid identity whose role does not satisfy the operation
    Unauthorized,
    /// Login with unknown email or wrong password
    InvalidCredentials,
    NotFound,
    InvalidInput,
    Conflict,
    /// Store or collaborator failure not attributable to the caller
    Internal,
}

impl LakehouseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingToken | Self::TokenExpired | Self::TokenInvalid(_) => {
                ErrorKind::Unauthenticated
            }
            Self::InsufficientPermissions { .. } => ErrorKind::Unauthorized,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::ContactNotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) | Self::PasswordTooWeak(_) => ErrorKind::InvalidInput,
            Self::UserAlreadyExists(_) => ErrorKind::Conflict,
            Self::DeltaTable(_)
            | Self::Io(_)
            | Self::Arrow(_)
            | Self::DataFusion(_)
            | Self::Config(_)
            | Self::ActorUnavailable(_)
            | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<deltalake::DeltaTableError> for LakehouseError {
    fn from(err: deltalake::DeltaTableError) -> Self {
        LakehouseError::DeltaTable(err.to_string())
    }
}

impl From<deltalake::arrow::error::ArrowError> for LakehouseError {
    fn from(err: deltalake::arrow::error::ArrowError) -> Self {
        LakehouseError::Arrow(err.to_string())
    }
}

impl From<deltalake::datafusion::error::DataFusionError> for LakehouseError {
    fn from(err: deltalake::datafusion::error::DataFusionError) -> Self {
        LakehouseError::DataFusion(err.to_string())
    }
}

impl From<url::ParseError> for LakehouseError {
    fn from(err: url::ParseError) -> Self {
        LakehouseError::Config(format!("URL parse error: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for LakehouseError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => LakehouseError::TokenExpired,
            _ => LakehouseError::TokenInvalid(err.to_string()),
        }
    }
}

/// Result type alias for lakehouse operations
pub type Result<T> = std::result::Result<T, LakehouseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_stay_distinct() {
        assert_eq!(LakehouseError::MissingToken.kind(), ErrorKind::Unauthenticated);
        assert_eq!(LakehouseError::TokenExpired.kind(), ErrorKind::Unauthenticated);
        let denied = LakehouseError::InsufficientPermissions {
            required: "super_admin".into(),
            actual: "user".into(),
        };
        assert_eq!(denied.kind(), ErrorKind::Unauthorized);
        assert_ne!(denied.kind(), LakehouseError::TokenInvalid("x".into()).kind());
    }

    #[test]
    fn test_storage_failures_are_internal() {
        assert_eq!(LakehouseError::DeltaTable("boom".into()).kind(), ErrorKind::Internal);
        assert_eq!(
            LakehouseError::ActorUnavailable("ContactActor".into()).kind(),
            ErrorKind::Internal
        );
        assert_eq!(LakehouseError::ContactNotFound("c1".into()).kind(), ErrorKind::NotFound);
    }
}

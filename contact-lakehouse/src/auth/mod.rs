//! Authentication module: identities, password hashes and bearer sessions
//!
//! Built on Delta Lake; the actor serializes registration and session writes.

pub mod types;
pub mod actor;

pub use actor::{AuthActor, AuthHandle};
pub use types::{normalize_email, JwtClaims, UserRecord, UserRole};

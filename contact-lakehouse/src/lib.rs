//! # Contact Lakehouse
//!
//! Storage, sessions and role policy for the "contact us" surface of a CRUD
//! back end, built on [delta-rs](https://github.com/delta-io/delta-rs).
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │              workflow                     │
//! │  authenticate → authorize → find → delete │
//! ├──────────────────────┬────────────────────┤
//! │      AuthActor       │    ContactActor    │
//! │  (users, sessions)   │ (contact_messages) │
//! ├──────────────────────┴────────────────────┤
//! │              DeltaStore                   │
//! │     (ACID writes, SQL queries)            │
//! ├───────────────────────────────────────────┤
//! │          Delta Lake (delta-rs)            │
//! └───────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use contact_lakehouse::{workflow, AuthActor, ContactActor, DeltaStore, LakehouseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(DeltaStore::new(LakehouseConfig::new("/data/contacts")).await?);
//!     let auth = AuthActor::spawn_with_store(Arc::clone(&store));
//!     let contacts = ContactActor::spawn(store);
//!
//!     let (token, _) = auth.login("admin@qa.team".into(), "password".into()).await?;
//!     workflow::delete_contact_message(&auth, &contacts, &token, "some-id").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod contact;
pub mod error;
pub mod policy;
pub mod schema;
pub mod store;
pub mod workflow;

#[cfg(feature = "maintenance")]
pub mod maintenance;

// Re-exports for convenience
pub use auth::{AuthActor, AuthHandle, UserRecord, UserRole};
pub use config::LakehouseConfig;
pub use contact::{ContactActor, ContactHandle, ContactMessage, NewContactMessage};
pub use error::{ErrorKind, LakehouseError, Result};
pub use policy::Operation;
pub use store::DeltaStore;
pub use workflow::{ContactStore, SessionVerifier, DELETE_CONFIRMATION};

#[cfg(feature = "maintenance")]
pub use maintenance::{MaintenanceReport, MaintenanceScheduler};

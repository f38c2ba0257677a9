//! Contact-us messages: public submission, privileged read and delete

pub mod types;
pub mod actor;

pub use actor::{ContactActor, ContactHandle};
pub use types::{ContactMessage, NewContactMessage};

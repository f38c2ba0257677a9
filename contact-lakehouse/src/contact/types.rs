//! Contact domain types

use serde::{Deserialize, Serialize};

use crate::error::{LakehouseError, Result};

/// A "contact us" message as stored in the `contact_messages` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
}

/// Unauthenticated submission payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewContactMessage {
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl NewContactMessage {
    /// Trim every field and reject blanks or an email without `@`
    pub fn validated(self) -> Result<Self> {
        let email = self.email.trim().to_lowercase();
        let subject = self.subject.trim().to_string();
        let message = self.message.trim().to_string();

        if !email.contains('@') {
            return Err(LakehouseError::Validation("Invalid email address".into()));
        }
        if subject.is_empty() {
            return Err(LakehouseError::Validation("Subject is required".into()));
        }
        if message.is_empty() {
            return Err(LakehouseError::Validation("Message is required".into()));
        }

        Ok(Self { email, subject, message })
    }
}

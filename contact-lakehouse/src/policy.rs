//! Role policy: which role each operation requires
//!
//! Pure functions over closed enums; no I/O.

use crate::auth::UserRole;

/// Operations exposed on contact messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SubmitContactMessage,
    ListContactMessages,
    ReadContactMessage,
    DeleteContactMessage,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmitContactMessage => "submit_contact_message",
            Self::ListContactMessages => "list_contact_messages",
            Self::ReadContactMessage => "read_contact_message",
            Self::DeleteContactMessage => "delete_contact_message",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum role for an operation; `None` means no identity is needed
pub fn required_role_for(operation: Operation) -> Option<UserRole> {
    match operation {
        Operation::SubmitContactMessage => None,
        Operation::ListContactMessages
        | Operation::ReadContactMessage
        | Operation::DeleteContactMessage => Some(UserRole::SuperAdmin),
    }
}

/// Check if `actual` has at least the permissions of `required`
pub fn is_authorized(actual: UserRole, required: UserRole) -> bool {
    actual.level() >= required.level()
}

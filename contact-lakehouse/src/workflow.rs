//! Authorization-gated operations on contact messages
//!
//! Every privileged operation runs the same prefix: resolve the bearer token
//! to an identity, then check that identity's role against the operation.
//! Authentication always precedes authorization, so an invalid token and an
//! under-privileged token surface as different error kinds.
//!
//! The collaborators are traits so the workflow can run against the Delta
//! backed actors in production and against in-memory fakes in tests.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::auth::UserRecord;
use crate::contact::ContactMessage;
use crate::error::{LakehouseError, Result};
use crate::policy::{is_authorized, required_role_for, Operation};

/// Confirmation reported after a successful delete
pub const DELETE_CONFIRMATION: &str = "Message deleted successfully";

/// Resolves a bearer token to the identity it was issued for
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserRecord>;
}

/// Contact message storage with an atomic delete primitive
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<ContactMessage>>;

    /// All messages, newest first
    async fn list_all(&self) -> Result<Vec<ContactMessage>>;

    /// Returns `true` iff this call removed the row
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}

/// Authenticate `token`, then require the role `operation` needs
pub async fn authorize<V>(verifier: &V, token: &str, operation: Operation) -> Result<UserRecord>
where
    V: SessionVerifier + ?Sized,
{
    let user = verifier.verify(token).await.map_err(|e| {
        debug!(%operation, error = %e, "Authentication failed");
        e
    })?;

    if let Some(required) = required_role_for(operation) {
        if !is_authorized(user.role, required) {
            warn!(user_id = %user.user_id, role = %user.role, %operation, "Role not authorized");
            return Err(LakehouseError::InsufficientPermissions {
                required: required.to_string(),
                actual: user.role.to_string(),
            });
        }
    }

    Ok(user)
}

/// Delete a contact message on behalf of the token's owner
///
/// Fails with an authentication error, `InsufficientPermissions`, or
/// `ContactNotFound`, each without modifying the store. A second delete of
/// the same id is `ContactNotFound`.
pub async fn delete_contact_message<V, S>(
    verifier: &V,
    store: &S,
    token: &str,
    id: &str,
) -> Result<()>
where
    V: SessionVerifier + ?Sized,
    S: ContactStore + ?Sized,
{
    let user = authorize(verifier, token, Operation::DeleteContactMessage).await?;

    if store.find_by_id(id).await?.is_none() {
        return Err(LakehouseError::ContactNotFound(id.to_string()));
    }

    // Lost a race with another delete between lookup and removal
    if !store.delete_by_id(id).await? {
        return Err(LakehouseError::ContactNotFound(id.to_string()));
    }

    info!(user_id = %user.user_id, contact_id = id, "Contact message deleted by request");
    Ok(())
}

/// List every contact message, newest first
pub async fn list_contact_messages<V, S>(
    verifier: &V,
    store: &S,
    token: &str,
) -> Result<Vec<ContactMessage>>
where
    V: SessionVerifier + ?Sized,
    S: ContactStore + ?Sized,
{
    authorize(verifier, token, Operation::ListContactMessages).await?;
    store.list_all().await
}

/// Read one contact message by id
pub async fn get_contact_message<V, S>(
    verifier: &V,
    store: &S,
    token: &str,
    id: &str,
) -> Result<ContactMessage>
where
    V: SessionVerifier + ?Sized,
    S: ContactStore + ?Sized,
{
    authorize(verifier, token, Operation::ReadContactMessage).await?;
    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| LakehouseError::ContactNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::auth::UserRole;
    use crate::error::ErrorKind;

    struct FakeVerifier {
        sessions: HashMap<&'static str, UserRecord>,
    }

    impl FakeVerifier {
        fn new() -> Self {
            let mut sessions = HashMap::new();
            sessions.insert("admin-token", user("admin", UserRole::SuperAdmin));
            sessions.insert("user-token", user("regular", UserRole::User));
            Self { sessions }
        }
    }

    #[async_trait]
    impl SessionVerifier for FakeVerifier {
        async fn verify(&self, token: &str) -> Result<UserRecord> {
            if token.is_empty() {
                return Err(LakehouseError::MissingToken);
            }
            self.sessions
                .get(token)
                .cloned()
                .ok_or_else(|| LakehouseError::TokenInvalid("unknown".into()))
        }
    }

    #[derive(Default)]
    struct FakeStore {
        rows: Mutex<HashMap<String, ContactMessage>>,
        lookups: AtomicUsize,
        deletes: AtomicUsize,
        fail_deletes: bool,
    }

    impl FakeStore {
        fn with(ids: &[&str]) -> Self {
            let store = Self::default();
            for id in ids {
                store.rows.lock().unwrap().insert(id.to_string(), message(id));
            }
            store
        }

        fn contains(&self, id: &str) -> bool {
            self.rows.lock().unwrap().contains_key(id)
        }
    }

    #[async_trait]
    impl ContactStore for FakeStore {
        async fn find_by_id(&self, id: &str) -> Result<Option<ContactMessage>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.lock().unwrap().get(id).cloned())
        }

        async fn list_all(&self) -> Result<Vec<ContactMessage>> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn delete_by_id(&self, id: &str) -> Result<bool> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.fail_deletes {
                return Err(LakehouseError::DeltaTable("commit conflict".into()));
            }
            Ok(self.rows.lock().unwrap().remove(id).is_some())
        }
    }

    /// Store whose lookup always sees the row, simulating a concurrent delete
    /// landing between lookup and removal
    struct RacingStore;

    #[async_trait]
    impl ContactStore for RacingStore {
        async fn find_by_id(&self, id: &str) -> Result<Option<ContactMessage>> {
            Ok(Some(message(id)))
        }

        async fn list_all(&self) -> Result<Vec<ContactMessage>> {
            Ok(vec![])
        }

        async fn delete_by_id(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }
    }

    fn user(id: &str, role: UserRole) -> UserRecord {
        UserRecord {
            user_id: id.into(),
            name: id.into(),
            email: format!("{id}@qa.team"),
            role,
            created_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    fn message(id: &str) -> ContactMessage {
        ContactMessage {
            id: id.into(),
            email: "contact@qa.team".into(),
            subject: "Test subject".into(),
            message: "Test message".into(),
            created_at: "2026-01-01T00:00:00.000000Z".into(),
        }
    }

    #[tokio::test]
    async fn test_super_admin_deletes_exactly_once() {
        let verifier = FakeVerifier::new();
        let store = FakeStore::with(&["c1"]);

        delete_contact_message(&verifier, &store, "admin-token", "c1").await.unwrap();
        assert!(!store.contains("c1"));

        let again = delete_contact_message(&verifier, &store, "admin-token", "c1")
            .await
            .unwrap_err();
        assert_eq!(again.kind(), ErrorKind::NotFound);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_token_touches_nothing() {
        let verifier = FakeVerifier::new();
        let store = FakeStore::with(&["c1"]);

        for token in ["", "invalid_token"] {
            let err = delete_contact_message(&verifier, &store, token, "c1")
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        }

        assert!(store.contains("c1"));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_regular_user_is_unauthorized() {
        let verifier = FakeVerifier::new();
        let store = FakeStore::with(&["c1"]);

        let err = delete_contact_message(&verifier, &store, "user-token", "c1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(store.contains("c1"));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auth_failure_wins_over_missing_resource() {
        let verifier = FakeVerifier::new();
        let store = FakeStore::with(&[]);

        let err = delete_contact_message(&verifier, &store, "user-token", "missing")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = delete_contact_message(&verifier, &store, "admin-token", "missing")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lost_race_reports_not_found() {
        let verifier = FakeVerifier::new();
        let err = delete_contact_message(&verifier, &RacingStore, "admin-token", "c1")
            .await
            .unwrap_err();
        assert!(matches!(err, LakehouseError::ContactNotFound(ref id) if id == "c1"));
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let verifier = FakeVerifier::new();
        let store = FakeStore {
            fail_deletes: true,
            ..FakeStore::with(&["c1"])
        };

        let err = delete_contact_message(&verifier, &store, "admin-token", "c1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_get_requires_super_admin() {
        let verifier = FakeVerifier::new();
        let store = FakeStore::with(&["c1"]);

        let found = get_contact_message(&verifier, &store, "admin-token", "c1").await.unwrap();
        assert_eq!(found.id, "c1");

        let err = get_contact_message(&verifier, &store, "user-token", "c1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let listed = list_contact_messages(&verifier, &store, "admin-token").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(list_contact_messages(&verifier, &store, "bogus").await.is_err());
    }
}

//! Authorized delete workflow against the Delta backed actors

use std::sync::Arc;

use tempfile::TempDir;

use contact_lakehouse::error::{ErrorKind, LakehouseError};
use contact_lakehouse::workflow::{delete_contact_message, get_contact_message};
use contact_lakehouse::{
    AuthActor, AuthHandle, ContactActor, ContactHandle, DeltaStore, LakehouseConfig,
    NewContactMessage, UserRole,
};

struct Fixture {
    _dir: TempDir,
    auth: AuthHandle,
    contacts: ContactHandle,
    admin_token: String,
    user_token: String,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let config =
        LakehouseConfig::new(dir.path()).with_jwt_secret("workflow-test-secret-0123456789");
    let store = Arc::new(DeltaStore::new(config).await.unwrap());
    let auth = AuthActor::spawn_with_store(Arc::clone(&store));
    let contacts = ContactActor::spawn(store);

    auth.register("Admin".into(), "admin@qa.team".into(), "AdminP@ss1".into(), UserRole::SuperAdmin)
        .await
        .unwrap();
    auth.register("User".into(), "user@qa.team".into(), "UserP@ss12".into(), UserRole::User)
        .await
        .unwrap();

    let (admin_token, _) = auth.login("admin@qa.team".into(), "AdminP@ss1".into()).await.unwrap();
    let (user_token, _) = auth.login("user@qa.team".into(), "UserP@ss12".into()).await.unwrap();

    Fixture { _dir: dir, auth, contacts, admin_token, user_token }
}

async fn seed(contacts: &ContactHandle) -> String {
    contacts
        .submit(NewContactMessage {
            email: "contact@qa.team".into(),
            subject: "Test subject".into(),
            message: "Test message".into(),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_super_admin_deletes_message() {
    let fx = fixture().await;
    let id = seed(&fx.contacts).await;

    delete_contact_message(&fx.auth, &fx.contacts, &fx.admin_token, &id).await.unwrap();
    assert!(fx.contacts.get(id.clone()).await.unwrap().is_none());

    let again = delete_contact_message(&fx.auth, &fx.contacts, &fx.admin_token, &id)
        .await
        .unwrap_err();
    assert!(matches!(again, LakehouseError::ContactNotFound(_)));
}

#[tokio::test]
async fn test_invalid_token_leaves_message() {
    let fx = fixture().await;
    let id = seed(&fx.contacts).await;

    let err = delete_contact_message(&fx.auth, &fx.contacts, "invalid_token", &id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    assert!(fx.contacts.get(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_regular_user_cannot_delete() {
    let fx = fixture().await;
    let id = seed(&fx.contacts).await;

    let err = delete_contact_message(&fx.auth, &fx.contacts, &fx.user_token, &id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(fx.contacts.get(id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let fx = fixture().await;
    seed(&fx.contacts).await;

    let err = delete_contact_message(&fx.auth, &fx.contacts, &fx.admin_token, "missing-id")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(fx.contacts.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_logged_out_admin_is_unauthenticated() {
    let fx = fixture().await;
    let id = seed(&fx.contacts).await;

    fx.auth.logout(fx.admin_token.clone()).await.unwrap();

    let err = get_contact_message(&fx.auth, &fx.contacts, &fx.admin_token, &id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
}

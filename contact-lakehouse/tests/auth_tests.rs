//! AuthActor integration tests: register, login, verify, logout

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::TempDir;

use contact_lakehouse::auth::{AuthActor, JwtClaims, UserRole};
use contact_lakehouse::config::LakehouseConfig;
use contact_lakehouse::error::{ErrorKind, LakehouseError};

const SECRET: &str = "test-secret-jwt-key-min-32-chars!!";

fn test_config(dir: &TempDir) -> LakehouseConfig {
    LakehouseConfig::new(dir.path()).with_jwt_secret(SECRET)
}

#[tokio::test]
async fn test_register_and_login() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    let user = handle
        .register(
            "Alice".into(),
            "  Alice@Example.com ".into(),
            "StrongP@ss123".into(),
            UserRole::User,
        )
        .await
        .unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, UserRole::User);

    let (token, logged_in) = handle
        .login("ALICE@example.com".into(), "StrongP@ss123".into())
        .await
        .unwrap();

    assert!(!token.is_empty());
    assert_eq!(logged_in.user_id, user.user_id);
}

#[tokio::test]
async fn test_verify_token_reports_stored_role() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    handle
        .register("Root".into(), "root@qa.team".into(), "SecureP@ss99".into(), UserRole::SuperAdmin)
        .await
        .unwrap();

    let (token, _) = handle.login("root@qa.team".into(), "SecureP@ss99".into()).await.unwrap();

    let user = handle.verify_token(token).await.unwrap();
    assert_eq!(user.email, "root@qa.team");
    assert_eq!(user.role, UserRole::SuperAdmin);

    let bad = handle.verify_token("invalid.token.here".into()).await.unwrap_err();
    assert_eq!(bad.kind(), ErrorKind::Unauthenticated);

    let empty = handle.verify_token(String::new()).await.unwrap_err();
    assert!(matches!(empty, LakehouseError::MissingToken));
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    handle
        .register("Carol".into(), "carol@qa.team".into(), "MyP@ssw0rd!".into(), UserRole::User)
        .await
        .unwrap();

    let (token, _) = handle.login("carol@qa.team".into(), "MyP@ssw0rd!".into()).await.unwrap();
    assert!(handle.verify_token(token.clone()).await.is_ok());

    handle.logout(token.clone()).await.unwrap();

    let err = handle.verify_token(token).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    handle
        .register("Dave".into(), "dave@qa.team".into(), "Passw0rd!".into(), UserRole::User)
        .await
        .unwrap();

    let err = handle
        .register("Dave Two".into(), "DAVE@qa.team".into(), "Passw0rd!".into(), UserRole::User)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_registration_validation() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    let weak = handle
        .register("Eve".into(), "eve@qa.team".into(), "short".into(), UserRole::User)
        .await
        .unwrap_err();
    assert!(matches!(weak, LakehouseError::PasswordTooWeak(_)));

    let bad_email = handle
        .register("Eve".into(), "not-an-email".into(), "LongEnough1".into(), UserRole::User)
        .await
        .unwrap_err();
    assert_eq!(bad_email.kind(), ErrorKind::InvalidInput);

    assert!(handle.find_by_email("eve@qa.team".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    handle
        .register("Frank".into(), "frank@qa.team".into(), "CorrectP@ss1".into(), UserRole::User)
        .await
        .unwrap();

    let wrong = handle.login("frank@qa.team".into(), "WrongP@ss1".into()).await.unwrap_err();
    assert!(matches!(wrong, LakehouseError::InvalidCredentials));

    let unknown = handle.login("nobody@qa.team".into(), "CorrectP@ss1".into()).await.unwrap_err();
    assert!(matches!(unknown, LakehouseError::InvalidCredentials));
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    let user = handle
        .register("Gina".into(), "gina@qa.team".into(), "GinaP@ss12".into(), UserRole::SuperAdmin)
        .await
        .unwrap();

    let now = Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user.user_id.clone(),
        email: user.email.clone(),
        exp: (now - 3600) as usize,
        iat: (now - 7200) as usize,
        jti: "stale".into(),
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .unwrap();

    let err = handle.verify_token(token).await.unwrap_err();
    assert!(matches!(err, LakehouseError::TokenExpired));
}

#[tokio::test]
async fn test_just_expired_token_gets_no_grace_period() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    let user = handle
        .register("Jay".into(), "jay@qa.team".into(), "JayP@ss123".into(), UserRole::SuperAdmin)
        .await
        .unwrap();

    let now = Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user.user_id,
        email: user.email,
        exp: (now - 5) as usize,
        iat: (now - 60) as usize,
        jti: "recent".into(),
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .unwrap();

    let err = handle.verify_token(token).await.unwrap_err();
    assert!(matches!(err, LakehouseError::TokenExpired));
}

#[tokio::test]
async fn test_logout_twice_is_unauthenticated() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    handle
        .register("Kim".into(), "kim@qa.team".into(), "KimP@ss123".into(), UserRole::User)
        .await
        .unwrap();
    let (token, _) = handle.login("kim@qa.team".into(), "KimP@ss123".into()).await.unwrap();

    handle.logout(token.clone()).await.unwrap();
    let err = handle.logout(token).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let dir = TempDir::new().unwrap();
    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();

    let user = handle
        .register("Hal".into(), "hal@qa.team".into(), "HalP@ss123".into(), UserRole::SuperAdmin)
        .await
        .unwrap();

    let now = Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user.user_id,
        email: user.email,
        exp: (now + 3600) as usize,
        iat: now as usize,
        jti: "forged".into(),
    };
    let forged = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret-of-enough-length"),
    )
    .unwrap();

    let err = handle.verify_token(forged).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
}

#[tokio::test]
async fn test_sessions_survive_restart() {
    let dir = TempDir::new().unwrap();

    let token = {
        let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();
        handle
            .register("Ivy".into(), "ivy@qa.team".into(), "IvyP@ss123".into(), UserRole::User)
            .await
            .unwrap();
        let (token, _) = handle.login("ivy@qa.team".into(), "IvyP@ss123".into()).await.unwrap();
        token
    };

    let handle = AuthActor::spawn(test_config(&dir)).await.unwrap();
    let user = handle.verify_token(token).await.unwrap();
    assert_eq!(user.email, "ivy@qa.team");
    assert!(handle.get_user(user.user_id).await.unwrap().is_some());
}

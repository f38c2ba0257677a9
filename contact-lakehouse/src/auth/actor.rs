//! AuthActor: Tokio actor for identities and sessions
//!
//! All operations are processed sequentially via an mpsc channel, so
//! registration uniqueness checks and session writes never interleave.
//!
//! # Usage
//!
//! ```rust,no_run
//! use contact_lakehouse::auth::{AuthActor, UserRole};
//! use contact_lakehouse::LakehouseConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LakehouseConfig::new("/data/contacts")
//!         .with_jwt_secret("my-production-secret");
//!
//!     let handle = AuthActor::spawn(config).await?;
//!
//!     handle.register(
//!         "Admin User".into(), "admin@qa.team".into(), "password".into(), UserRole::SuperAdmin,
//!     ).await?;
//!
//!     // Login → JWT token
//!     let (token, _user) = handle.login("admin@qa.team".into(), "password".into()).await?;
//!
//!     // Verify on each request
//!     let user = handle.verify_token(token).await?;
//!     assert_eq!(user.role, UserRole::SuperAdmin);
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use deltalake::arrow::array::{ArrayRef, BooleanArray, RecordBatch, StringArray};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::LakehouseConfig;
use crate::error::{LakehouseError, Result};
use crate::schema::{self, sql_literal};
use crate::store::{CompactMetrics, DeltaStore};
use crate::workflow::SessionVerifier;

use super::types::*;

const MIN_PASSWORD_LEN: usize = 8;

// ─── Actor Messages ───

enum AuthMsg {
    Register {
        name: String,
        email: String,
        password: String,
        role: UserRole,
        reply: oneshot::Sender<Result<UserRecord>>,
    },
    Login {
        email: String,
        password: String,
        reply: oneshot::Sender<Result<(String, UserRecord)>>,
    },
    VerifyToken {
        token: String,
        reply: oneshot::Sender<Result<UserRecord>>,
    },
    Logout {
        token: String,
        reply: oneshot::Sender<Result<()>>,
    },
    GetUser {
        user_id: String,
        reply: oneshot::Sender<Result<Option<UserRecord>>>,
    },
    FindByEmail {
        email: String,
        reply: oneshot::Sender<Result<Option<UserRecord>>>,
    },
    PurgeExpiredSessions {
        reply: oneshot::Sender<Result<usize>>,
    },
    CompactSessions {
        reply: oneshot::Sender<Result<CompactMetrics>>,
    },
}

// ─── Actor ───

/// Authentication actor: processes auth operations sequentially
pub struct AuthActor {
    store: Arc<DeltaStore>,
    jwt_secret: String,
    session_expiry_hours: u32,
    rx: mpsc::Receiver<AuthMsg>,
}

impl AuthActor {
    /// Spawn the auth actor with its own store
    pub async fn spawn(config: LakehouseConfig) -> Result<AuthHandle> {
        let store = Arc::new(DeltaStore::new(config).await?);
        Ok(Self::spawn_with_store(store))
    }

    /// Spawn with an existing DeltaStore (for sharing with ContactActor)
    pub fn spawn_with_store(store: Arc<DeltaStore>) -> AuthHandle {
        let config = store.config();
        let (tx, rx) = mpsc::channel(config.mailbox_capacity);
        let actor = Self {
            jwt_secret: config.jwt_secret.clone(),
            session_expiry_hours: config.session_expiry_hours,
            store,
            rx,
        };

        tokio::spawn(actor.run());
        info!("AuthActor spawned");
        AuthHandle { tx }
    }

    /// Main event loop
    async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                AuthMsg::Register { name, email, password, role, reply } => {
                    let _ = reply.send(self.handle_register(name, email, password, role).await);
                }
                AuthMsg::Login { email, password, reply } => {
                    let _ = reply.send(self.handle_login(&email, &password).await);
                }
                AuthMsg::VerifyToken { token, reply } => {
                    let _ = reply.send(self.handle_verify_token(&token).await);
                }
                AuthMsg::Logout { token, reply } => {
                    let _ = reply.send(self.handle_logout(&token).await);
                }
                AuthMsg::GetUser { user_id, reply } => {
                    let _ = reply.send(self.find_user("user_id", &user_id).await);
                }
                AuthMsg::FindByEmail { email, reply } => {
                    let _ = reply.send(self.find_user("email", &normalize_email(&email)).await);
                }
                AuthMsg::PurgeExpiredSessions { reply } => {
                    let _ = reply.send(self.handle_purge_expired().await);
                }
                AuthMsg::CompactSessions { reply } => {
                    let _ = reply.send(self.store.compact(schema::TABLE_SESSIONS).await);
                }
            }
        }
        info!("AuthActor stopped");
    }

    // ─── Handler Implementations ───

    async fn handle_register(
        &self,
        name: String,
        email: String,
        password: String,
        role: UserRole,
    ) -> Result<UserRecord> {
        let name = name.trim().to_string();
        let email = normalize_email(&email);

        if name.is_empty() {
            return Err(LakehouseError::Validation("Name is required".into()));
        }
        if !email.contains('@') {
            return Err(LakehouseError::Validation("Invalid email address".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(LakehouseError::PasswordTooWeak(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.find_user("email", &email).await?.is_some() {
            return Err(LakehouseError::UserAlreadyExists(email));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| LakehouseError::Internal(e.to_string()))?
            .to_string();

        let user = UserRecord {
            user_id: Uuid::new_v4().to_string(),
            name,
            email,
            role,
            created_at: Utc::now().to_rfc3339(),
        };

        let batch = RecordBatch::try_new(
            Arc::new(schema::users_arrow_schema()),
            vec![
                Arc::new(StringArray::from(vec![user.user_id.as_str()])) as ArrayRef,
                Arc::new(StringArray::from(vec![user.name.as_str()])),
                Arc::new(StringArray::from(vec![user.email.as_str()])),
                Arc::new(StringArray::from(vec![password_hash.as_str()])),
                Arc::new(StringArray::from(vec![user.role.as_str()])),
                Arc::new(StringArray::from(vec![user.created_at.as_str()])),
            ],
        )?;

        self.store.append(schema::TABLE_USERS, batch).await?;
        info!(user_id = %user.user_id, role = %user.role, "User registered");
        Ok(user)
    }

    async fn handle_login(&self, email: &str, password: &str) -> Result<(String, UserRecord)> {
        let email = normalize_email(email);
        let batches = self
            .store
            .query(schema::TABLE_USERS, &format!("email = {}", sql_literal(&email)))
            .await?;

        let (batch, row) = schema::rows(&batches)
            .next()
            .ok_or(LakehouseError::InvalidCredentials)?;

        let stored_hash = schema::string_at(batch, 3, row)?;
        let parsed_hash = PasswordHash::new(&stored_hash)
            .map_err(|e| LakehouseError::Internal(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| LakehouseError::InvalidCredentials)?;

        let user = user_from_row(batch, row)?;

        let now = Utc::now();
        let expires = now + Duration::hours(i64::from(self.session_expiry_hours));
        let claims = JwtClaims {
            sub: user.user_id.clone(),
            email: user.email.clone(),
            exp: expires.timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        let session_batch = RecordBatch::try_new(
            Arc::new(schema::sessions_arrow_schema()),
            vec![
                Arc::new(StringArray::from(vec![token_digest(&token).as_str()])) as ArrayRef,
                Arc::new(StringArray::from(vec![user.user_id.as_str()])),
                Arc::new(StringArray::from(vec![session_timestamp(now).as_str()])),
                Arc::new(StringArray::from(vec![session_timestamp(expires).as_str()])),
                Arc::new(BooleanArray::from(vec![false])),
            ],
        )?;

        self.store.append(schema::TABLE_SESSIONS, session_batch).await?;

        info!(user_id = %user.user_id, "Login successful");
        Ok((token, user))
    }

    async fn handle_verify_token(&self, token: &str) -> Result<UserRecord> {
        if token.trim().is_empty() {
            return Err(LakehouseError::MissingToken);
        }

        // Signature, algorithm and expiry, with no grace period past `exp`
        let mut validation = Validation::default();
        validation.leeway = 0;
        let claims = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?
        .claims;

        // Session must still be on record and not revoked
        let batches = self
            .store
            .query(
                schema::TABLE_SESSIONS,
                &format!("token_hash = {}", sql_literal(&token_digest(token))),
            )
            .await?;

        let live = match schema::rows(&batches).next() {
            Some((batch, row)) => !schema::bool_at(batch, 4, row)?,
            None => false,
        };
        if !live {
            debug!(user_id = %claims.sub, "Token not found in sessions or revoked");
            return Err(LakehouseError::TokenInvalid("session revoked or unknown".into()));
        }

        self.find_user("user_id", &claims.sub)
            .await?
            .ok_or_else(|| LakehouseError::TokenInvalid("user no longer exists".into()))
    }

    async fn handle_logout(&self, token: &str) -> Result<()> {
        let user = self.handle_verify_token(token).await?;
        self.store
            .update(
                schema::TABLE_SESSIONS,
                &format!("token_hash = {}", sql_literal(&token_digest(token))),
                "is_revoked",
                "true",
            )
            .await?;
        info!(user_id = %user.user_id, "Session revoked");
        Ok(())
    }

    /// Drop session rows past `expires_at`, revoked or not
    async fn handle_purge_expired(&self) -> Result<usize> {
        let now = session_timestamp(Utc::now());
        let metrics = self
            .store
            .delete(schema::TABLE_SESSIONS, &format!("expires_at < {}", sql_literal(&now)))
            .await?;
        if metrics.num_deleted_rows > 0 {
            info!(deleted = metrics.num_deleted_rows, "Cleaned expired sessions");
        }
        Ok(metrics.num_deleted_rows)
    }

    async fn find_user(&self, column: &str, value: &str) -> Result<Option<UserRecord>> {
        let batches = self
            .store
            .query(schema::TABLE_USERS, &format!("{column} = {}", sql_literal(value)))
            .await?;

        let found = schema::rows(&batches)
            .next()
            .map(|(batch, row)| user_from_row(batch, row))
            .transpose();
        found
    }
}

fn user_from_row(batch: &RecordBatch, row: usize) -> Result<UserRecord> {
    let role_str = schema::string_at(batch, 4, row)?;
    let role = UserRole::parse(&role_str)
        .ok_or_else(|| LakehouseError::Internal(format!("Unknown role on record: {role_str}")))?;

    Ok(UserRecord {
        user_id: schema::string_at(batch, 0, row)?,
        name: schema::string_at(batch, 1, row)?,
        email: schema::string_at(batch, 2, row)?,
        role,
        created_at: schema::string_at(batch, 5, row)?,
    })
}

/// Fixed-width UTC form, so `expires_at` compares correctly as a string
fn session_timestamp(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Sessions are stored by digest so the table never holds usable tokens
fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

// ─── Handle (client-facing API) ───

/// Thread-safe handle to communicate with the AuthActor
#[derive(Clone)]
pub struct AuthHandle {
    tx: mpsc::Sender<AuthMsg>,
}

impl AuthHandle {
    async fn call<T>(&self, msg: AuthMsg, rx: oneshot::Receiver<Result<T>>) -> Result<T> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| LakehouseError::ActorUnavailable("AuthActor".into()))?;
        rx.await
            .map_err(|_| LakehouseError::ActorUnavailable("AuthActor dropped".into()))?
    }

    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
        role: UserRole,
    ) -> Result<UserRecord> {
        let (reply, rx) = oneshot::channel();
        self.call(AuthMsg::Register { name, email, password, role, reply }, rx).await
    }

    pub async fn login(&self, email: String, password: String) -> Result<(String, UserRecord)> {
        let (reply, rx) = oneshot::channel();
        self.call(AuthMsg::Login { email, password, reply }, rx).await
    }

    pub async fn verify_token(&self, token: String) -> Result<UserRecord> {
        let (reply, rx) = oneshot::channel();
        self.call(AuthMsg::VerifyToken { token, reply }, rx).await
    }

    pub async fn logout(&self, token: String) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.call(AuthMsg::Logout { token, reply }, rx).await
    }

    pub async fn get_user(&self, user_id: String) -> Result<Option<UserRecord>> {
        let (reply, rx) = oneshot::channel();
        self.call(AuthMsg::GetUser { user_id, reply }, rx).await
    }

    pub async fn find_by_email(&self, email: String) -> Result<Option<UserRecord>> {
        let (reply, rx) = oneshot::channel();
        self.call(AuthMsg::FindByEmail { email, reply }, rx).await
    }

    /// Delete expired session rows; returns how many were removed
    pub async fn purge_expired_sessions(&self) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.call(AuthMsg::PurgeExpiredSessions { reply }, rx).await
    }

    pub async fn compact_sessions(&self) -> Result<CompactMetrics> {
        let (reply, rx) = oneshot::channel();
        self.call(AuthMsg::CompactSessions { reply }, rx).await
    }
}

#[async_trait]
impl SessionVerifier for AuthHandle {
    async fn verify(&self, token: &str) -> Result<UserRecord> {
        self.verify_token(token.to_string()).await
    }
}

//! HTTP surface for contact-us messages
//!
//! Routes:
//! - `GET    /health`
//! - `POST   /api/v1/auth/register`, `/api/v1/auth/login`, `/api/v1/auth/logout`
//! - `POST   /api/v1/contact` (public)
//! - `GET    /api/v1/contact`, `GET|DELETE /api/v1/contact/:id` (SuperAdmin)

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use contact_lakehouse::{
    AuthActor, AuthHandle, ContactActor, ContactHandle, DeltaStore, UserRecord, UserRole,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::BootstrapAdmin;

/// Shared handler state; both handles are cheap clones of actor mailboxes
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthHandle,
    pub contacts: ContactHandle,
}

impl AppState {
    /// Spawn the auth and contact actors over one store
    pub fn new(store: Arc<DeltaStore>) -> Self {
        Self {
            auth: AuthActor::spawn_with_store(Arc::clone(&store)),
            contacts: ContactActor::spawn(store),
        }
    }

    /// Register the configured SuperAdmin unless that email already exists
    pub async fn ensure_admin(
        &self,
        admin: &BootstrapAdmin,
    ) -> contact_lakehouse::Result<UserRecord> {
        if let Some(existing) = self.auth.find_by_email(admin.email.clone()).await? {
            return Ok(existing);
        }
        let user = self
            .auth
            .register(
                admin.name.clone(),
                admin.email.clone(),
                admin.password.clone(),
                UserRole::SuperAdmin,
            )
            .await?;
        info!(user_id = %user.user_id, "Bootstrap SuperAdmin registered");
        Ok(user)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/auth/register", post(handlers::register))
        .route("/api/v1/auth/login", post(handlers::login))
        .route("/api/v1/auth/logout", post(handlers::logout))
        .route(
            "/api/v1/contact",
            post(handlers::submit_contact).get(handlers::list_contacts),
        )
        .route(
            "/api/v1/contact/:id",
            get(handlers::get_contact).delete(handlers::delete_contact),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

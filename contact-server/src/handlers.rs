//! Request handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use contact_lakehouse::{
    workflow, ContactMessage, NewContactMessage, UserRecord, UserRole, DELETE_CONFIRMATION,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;

type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Token from an `Authorization: Bearer <token>` header; empty when absent
pub fn bearer_token(headers: &HeaderMap) -> &str {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or("")
}

pub async fn health() -> ApiResponse<Value> {
    ApiResponse::ok(
        "Service is healthy",
        json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") }),
    )
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserRecord,
}

/// Self-service registration always creates a regular user
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserRecord> {
    let Json(req) = body?;
    let user = state
        .auth
        .register(req.name, req.email, req.password, UserRole::User)
        .await?;
    Ok(ApiResponse::created("User created successfully", user))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(req) = body?;
    let (access_token, user) = state.auth.login(req.email, req.password).await?;
    Ok(ApiResponse::ok("Login successful", LoginResponse { access_token, user }))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    state.auth.logout(bearer_token(&headers).to_string()).await?;
    Ok(ApiResponse::message("Logout successful"))
}

/// Public "contact us" submission
pub async fn submit_contact(
    State(state): State<AppState>,
    body: Result<Json<NewContactMessage>, JsonRejection>,
) -> ApiResult<ContactMessage> {
    let Json(draft) = body?;
    let stored = state.contacts.submit(draft).await?;
    Ok(ApiResponse::created("Message sent successfully", stored))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<ContactMessage>> {
    let messages =
        workflow::list_contact_messages(&state.auth, &state.contacts, bearer_token(&headers))
            .await?;
    debug!(count = messages.len(), "Listed contact messages");
    Ok(ApiResponse::ok("Messages retrieved successfully", messages))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<ContactMessage> {
    let message =
        workflow::get_contact_message(&state.auth, &state.contacts, bearer_token(&headers), &id)
            .await?;
    Ok(ApiResponse::ok("Message retrieved successfully", message))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<()> {
    workflow::delete_contact_message(&state.auth, &state.contacts, bearer_token(&headers), &id)
        .await?;
    info!(contact_id = %id, "Delete request completed");
    Ok(ApiResponse::message(DELETE_CONFIRMATION))
}

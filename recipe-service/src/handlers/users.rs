use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{to_json, InsertOneResponse, StoreUserRequest},
    middleware::AuthUser,
    AppState,
};

/// Full user document. Callers may only read their own.
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    if claims.email != email {
        tracing::warn!(
            caller = %claims.email,
            requested = %email,
            "Rejected read of another user's profile"
        );
        return Err(AppError::Unauthorized(anyhow::anyhow!("Unauthorized Access")));
    }

    // Same answer as the identity mismatch, so the endpoint says nothing about
    // which emails are registered.
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Unauthorized Access")))?;

    Ok(Json(to_json(&user)))
}

/// Wallet (`_id`, `email`, `coins`) of any user.
pub async fn get_creator_wallet(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    let wallet = state
        .store
        .find_wallet_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Users Not Found")))?;

    Ok(Json(to_json(&wallet)))
}

/// Registers a user unless one with the same email already exists.
pub async fn store_user(
    State(state): State<AppState>,
    Json(payload): Json<StoreUserRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    if state.store.find_user_by_email(&payload.email).await?.is_some() {
        tracing::debug!(email = %payload.email, "User already registered");
        return Ok((StatusCode::OK, "user already exist").into_response());
    }

    let email = payload.email.clone();
    let id = state.store.insert_user(payload.into_document()?).await?;

    tracing::info!(user_id = %id, email = %email, "Registered user");

    Ok(Json(InsertOneResponse::from(id)).into_response())
}

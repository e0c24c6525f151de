use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{IssueTokenRequest, TokenResponse},
    services::metrics,
    AppState,
};

/// Signs a session token carrying every field of the body as a claim.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<IssueTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let token = state.jwt.issue_token(&payload.email, payload.profile)?;

    tracing::info!(email = %payload.email, "Issued session token");
    metrics::record_token_issued();

    Ok(Json(TokenResponse { token }))
}

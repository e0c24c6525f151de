use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::{AppError, ErrorResponse};

use crate::{
    dtos::{PurchaseResponse, UpdateRecipeRequest},
    middleware::AuthUser,
    services::{metrics, purchase::apply_purchase},
    AppState,
};

/// Applies a purchase: buyer, creator and recipe updates in sequence.
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateRecipeRequest>,
) -> Result<Response, AppError> {
    let update = payload.into_update()?;
    let recipe_id = update.recipe.id;

    match apply_purchase(&*state.store, update).await {
        Ok(outcome) if outcome.fully_applied() => {
            tracing::info!(caller = %claims.email, recipe_id = %recipe_id, "Purchase applied");
            metrics::record_purchase("applied");

            Ok(Json(PurchaseResponse {
                message: "Update successful".to_string(),
                update_user_res: outcome.buyer.into(),
                update_creator_res: outcome.creator.into(),
                update_recipe_res: outcome.recipe.into(),
            })
            .into_response())
        }
        Ok(outcome) => {
            if outcome.partially_applied() {
                tracing::warn!(
                    caller = %claims.email,
                    recipe_id = %recipe_id,
                    buyer_modified = outcome.buyer.modified,
                    creator_modified = outcome.creator.modified,
                    recipe_modified = outcome.recipe.modified,
                    "Purchase partially applied"
                );
            }
            metrics::record_purchase("not_modified");

            Err(AppError::BadRequest(anyhow::anyhow!("No records were updated")))
        }
        Err(e) => {
            tracing::error!(error = %e, recipe_id = %recipe_id, "Purchase failed");
            metrics::record_purchase("failed");

            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(
                    ErrorResponse::new("Something went wrong. Try again.")
                        .with_details(e.to_string()),
                ),
            )
                .into_response())
        }
    }
}

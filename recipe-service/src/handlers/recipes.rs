use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use service_core::error::AppError;

use crate::{
    dtos::{parse_object_id, to_json, InsertOneResponse, NewRecipeRequest},
    middleware::AuthUser,
    AppState,
};

pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    let summaries = state.store.list_recipe_summaries().await?;

    Ok(Json(summaries.iter().map(to_json).collect()))
}

/// Full recipe, or `null` when no recipe has this id.
pub async fn get_recipe(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id)?;

    match state.store.find_recipe(id).await? {
        Some(recipe) => Ok(Json(to_json(&recipe))),
        None => {
            tracing::debug!(recipe_id = %id, "Recipe not found");
            Ok(Json(Value::Null))
        }
    }
}

/// Publishes a recipe on behalf of the authenticated creator.
pub async fn store_recipe(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<NewRecipeRequest>,
) -> Result<Json<InsertOneResponse>, AppError> {
    if payload.creator_email() != Some(claims.email.as_str()) {
        tracing::warn!(
            caller = %claims.email,
            creator = ?payload.creator_email(),
            "Rejected recipe published under another creator"
        );
        return Err(AppError::Unauthorized(anyhow::anyhow!("Unauthorized access")));
    }

    let recipe = payload.into_document()?;
    let name = recipe.get_str("recipeName").unwrap_or_default().to_string();
    let id = state.store.insert_recipe(recipe).await?;

    tracing::info!(recipe_id = %id, recipe_name = %name, creator = %claims.email, "Stored recipe");

    Ok(Json(InsertOneResponse::from(id)))
}

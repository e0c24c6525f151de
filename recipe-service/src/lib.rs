pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware,
    request_id::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{CorsConfig, RecipeConfig};
use crate::services::{JwtService, MarketplaceStore, PaymentGateway};

pub use startup::Application;

#[derive(Clone)]
pub struct AppState {
    pub config: RecipeConfig,
    pub store: Arc<dyn MarketplaceStore>,
    pub jwt: JwtService,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(
        config: RecipeConfig,
        store: Arc<dyn MarketplaceStore>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt);
        Self {
            config,
            store,
            jwt,
            payments,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users/:email", get(handlers::users::get_user))
        .route(
            "/creator-users/:email",
            get(handlers::users::get_creator_wallet),
        )
        .route("/get-recipe/:id", get(handlers::recipes::get_recipe))
        .route("/recipe-store", post(handlers::recipes::store_recipe))
        .route("/update-recipe", patch(handlers::purchase::update_recipe))
        .route(
            "/create-payment-intent",
            post(handlers::payments::create_payment_intent),
        )
        .route("/payment", post(handlers::payments::record_payment))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_bearer,
        ));

    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/jwt", post(handlers::auth::issue_token))
        .route("/store-user", post(handlers::users::store_user))
        .route("/get-recipe", get(handlers::recipes::list_recipes))
        .merge(protected)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.allowed_origins.iter().filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Invalid CORS origin '{}': {}. Skipping.", origin, e))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

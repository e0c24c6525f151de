use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{ClientSecretResponse, CreatePaymentIntentRequest, InsertOneResponse, RecordPaymentRequest},
    middleware::AuthUser,
    models::payment_receipt,
    services::{
        metrics,
        payment_gateway::PaymentIntentRequest,
        wallet::{amount_in_cents, coins_for_amount},
    },
    AppState,
};

/// Opens a card payment intent for `price` dollars and hands the client secret
/// to the browser.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreatePaymentIntentRequest>,
) -> Result<Json<ClientSecretResponse>, AppError> {
    let amount = payload
        .price
        .value()
        .and_then(amount_in_cents)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("price must be a positive number")))?;

    let currency = state.config.payment_gateway.currency.as_str();
    let request = PaymentIntentRequest::card(amount, currency);

    let intent = match state.payments.create_payment_intent(&request).await {
        Ok(intent) => intent,
        Err(e) => {
            metrics::record_payment_intent(currency, "failed");
            return Err(e.into());
        }
    };

    tracing::info!(
        caller = %claims.email,
        intent_id = %intent.id,
        amount = amount,
        "Payment intent ready"
    );
    metrics::record_payment_intent(currency, "created");

    Ok(Json(ClientSecretResponse {
        client_secret: intent.into_client_secret()?,
    }))
}

/// Credits the wallet after a successful card payment and stores the receipt.
pub async fn record_payment(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<Json<InsertOneResponse>, AppError> {
    payload.validate()?;

    let coins = coins_for_amount(payload.amount().as_ref());

    let outcome = state.store.set_coins_by_email(&payload.email, coins).await?;
    if !outcome.modified_any() {
        tracing::warn!(
            email = %payload.email,
            coins = coins,
            matched = outcome.matched,
            "Wallet top-up modified no user"
        );
        metrics::record_wallet_top_up(coins, "not_modified");
        return Err(AppError::InternalError(anyhow::anyhow!(
            "Internal Error. Try again"
        )));
    }

    let receipt = payment_receipt(&payload.email, payload.body_document()?, coins);
    let id = state.store.insert_payment(receipt).await?;

    tracing::info!(payment_id = %id, email = %payload.email, coins = coins, "Wallet topped up");
    metrics::record_wallet_top_up(coins, "credited");

    Ok(Json(InsertOneResponse::from(id)))
}

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder. Calling it twice is an error.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))
    })?;

    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("Metrics recorder already initialized"))
    })
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_token_issued() {
    counter!("recipe_tokens_issued_total").increment(1);
}

/// `outcome` is `applied`, `not_modified` or `failed`.
pub fn record_purchase(outcome: &'static str) {
    counter!("recipe_purchases_total", "outcome" => outcome).increment(1);
}

pub fn record_wallet_top_up(coins: i64, outcome: &'static str) {
    counter!(
        "wallet_top_ups_total",
        "coins" => coins.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_payment_intent(currency: &str, outcome: &'static str) {
    counter!(
        "payment_intents_total",
        "currency" => currency.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

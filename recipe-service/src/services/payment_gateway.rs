//! Payment gateway client.
//!
//! Only the creation of card payment intents is used: the browser confirms the
//! intent with the returned client secret and then reports the top-up through
//! `POST /payment`.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use service_core::error::AppError;
use std::sync::Mutex;
use thiserror::Error;

use crate::config::PaymentGatewayConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Payment gateway credentials not configured")]
    NotConfigured,

    #[error("Payment gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Payment gateway rejected the request: {code} - {message}")]
    Rejected { code: String, message: String },

    #[error("Payment gateway returned an unreadable response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Payment intent {0} has no client secret")]
    MissingClientSecret(String),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotConfigured => {
                AppError::InternalError(anyhow!("Payment gateway is not configured"))
            }
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// Parameters of a payment intent.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentRequest {
    /// Amount in the smallest currency unit (cents for USD).
    pub amount: u64,
    pub currency: String,
    pub payment_method_types: Vec<String>,
}

impl PaymentIntentRequest {
    /// A card-only intent.
    pub fn card(amount: u64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            payment_method_types: vec!["card".to_string()],
        }
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("amount", self.amount.to_string()),
            ("currency", self.currency.clone()),
        ];
        for method in &self.payment_method_types {
            form.push(("payment_method_types[]", method.clone()));
        }
        form
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
    pub client_secret: Option<String>,
}

impl PaymentIntent {
    pub fn into_client_secret(self) -> Result<String, GatewayError> {
        self.client_secret
            .ok_or(GatewayError::MissingClientSecret(self.id))
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError>;
}

/// Stripe Payment Intents API client.
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    config: PaymentGatewayConfig,
}

impl StripeGateway {
    pub fn new(config: PaymentGatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn is_configured(&self) -> bool {
        !self.config.secret_key.expose_secret().is_empty()
    }

    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        if !self.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let url = format!(
            "{}/payment_intents",
            self.config.api_base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(self.config.secret_key.expose_secret(), None::<&str>)
            .form(&request.form())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, "Stripe create payment intent response");

        if status.is_success() {
            let intent: PaymentIntent = serde_json::from_str(&body)?;
            tracing::info!(
                intent_id = %intent.id,
                amount = intent.amount,
                currency = %intent.currency,
                status = %intent.status,
                "Payment intent created"
            );
            Ok(intent)
        } else {
            let (code, message) = match serde_json::from_str::<StripeErrorBody>(&body) {
                Ok(parsed) => (
                    parsed
                        .error
                        .code
                        .or(parsed.error.kind)
                        .unwrap_or_else(|| status.as_u16().to_string()),
                    parsed.error.message.unwrap_or_default(),
                ),
                Err(_) => (status.as_u16().to_string(), body),
            };
            tracing::error!(code = %code, message = %message, "Payment intent creation failed");
            Err(GatewayError::Rejected { code, message })
        }
    }
}

/// Gateway double that records requests and answers with fake intents.
#[derive(Default)]
pub struct MockPaymentGateway {
    requests: Mutex<Vec<PaymentIntentRequest>>,
    fail: bool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every call is declined.
    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn requests(&self) -> Vec<PaymentIntentRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn is_configured(&self) -> bool {
        true
    }

    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let sequence = match self.requests.lock() {
            Ok(mut requests) => {
                requests.push(request.clone());
                requests.len()
            }
            Err(_) => 0,
        };

        if self.fail {
            return Err(GatewayError::Rejected {
                code: "card_declined".to_string(),
                message: "Your card was declined.".to_string(),
            });
        }

        let id = format!("pi_mock_{}", sequence);
        Ok(PaymentIntent {
            client_secret: Some(format!("{}_secret_mock", id)),
            id,
            amount: request.amount,
            currency: request.currency.clone(),
            status: "requires_payment_method".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(base_url: &str, key: &str) -> StripeGateway {
        StripeGateway::new(PaymentGatewayConfig {
            secret_key: Secret::new(key.to_string()),
            api_base_url: base_url.to_string(),
            currency: "usd".to_string(),
        })
    }

    #[test]
    fn card_intent_form_encoding() {
        let form = PaymentIntentRequest::card(1999, "usd").form();
        assert_eq!(
            form,
            vec![
                ("amount", "1999".to_string()),
                ("currency", "usd".to_string()),
                ("payment_method_types[]", "card".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unconfigured_gateway_refuses_to_call_out() {
        let result = gateway("http://127.0.0.1:9", "")
            .create_payment_intent(&PaymentIntentRequest::card(100, "usd"))
            .await;
        assert!(matches!(result, Err(GatewayError::NotConfigured)));
    }

    #[tokio::test]
    async fn creates_intent_and_returns_client_secret() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment_intents"))
            .and(header_exists("authorization"))
            .and(body_string_contains("amount=500"))
            .and(body_string_contains("currency=usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pi_123",
                "object": "payment_intent",
                "amount": 500,
                "currency": "usd",
                "status": "requires_payment_method",
                "client_secret": "pi_123_secret_abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let intent = gateway(&server.uri(), "sk_test_123")
            .create_payment_intent(&PaymentIntentRequest::card(500, "usd"))
            .await
            .unwrap();

        assert_eq!(intent.into_client_secret().unwrap(), "pi_123_secret_abc");
    }

    #[tokio::test]
    async fn surfaces_stripe_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment_intents"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "type": "invalid_request_error",
                    "code": "amount_too_small",
                    "message": "Amount must be at least $0.50 usd"
                }
            })))
            .mount(&server)
            .await;

        let result = gateway(&server.uri(), "sk_test_123")
            .create_payment_intent(&PaymentIntentRequest::card(10, "usd"))
            .await;

        match result {
            Err(GatewayError::Rejected { code, .. }) => assert_eq!(code, "amount_too_small"),
            other => panic!("expected rejection, got {:?}", other.map(|i| i.id)),
        }
    }

    #[tokio::test]
    async fn mock_gateway_records_requests() {
        let mock = MockPaymentGateway::new();
        let intent = mock
            .create_payment_intent(&PaymentIntentRequest::card(100, "usd"))
            .await
            .unwrap();

        assert_eq!(intent.client_secret.as_deref(), Some("pi_mock_1_secret_mock"));
        assert_eq!(mock.requests(), vec![PaymentIntentRequest::card(100, "usd")]);
    }
}

//! Test helpers for recipe-service integration tests.
//!
//! Each test gets its own server on a random port, backed by an in-memory store
//! and a mock payment gateway.

#![allow(dead_code)]

use mongodb::bson::{doc, oid::ObjectId, Document};
use recipe_service::{
    build_router,
    config::{
        CorsConfig, JwtConfig, PaymentGatewayConfig, RecipeConfig, StoreBackend, StoreConfig,
    },
    models::{new_recipe, new_user},
    services::{InMemoryStore, JwtService, MarketplaceStore, MockPaymentGateway, PaymentGateway},
    AppState,
};
use reqwest::Client;
use secrecy::Secret;
use serde_json::{Map, Value};
use service_core::config::Environment;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

pub fn test_config() -> RecipeConfig {
    RecipeConfig {
        environment: Environment::Dev,
        service_name: "recipe-service".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        port: 0,
        otlp_endpoint: None,
        store: StoreConfig {
            backend: StoreBackend::Memory,
            uri: Secret::new(String::new()),
            database: "RecipeHouseTest".to_string(),
        },
        jwt: JwtConfig {
            secret: Secret::new(TEST_JWT_SECRET.to_string()),
            token_expiry_minutes: 60,
        },
        payment_gateway: PaymentGatewayConfig {
            secret_key: Secret::new("sk_test_123".to_string()),
            api_base_url: "http://127.0.0.1:9".to_string(),
            currency: "usd".to_string(),
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub store: InMemoryStore,
    pub gateway: Arc<MockPaymentGateway>,
    pub jwt: JwtService,
    client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_gateway(MockPaymentGateway::new()).await
    }

    pub async fn spawn_with_gateway(gateway: MockPaymentGateway) -> Self {
        let config = test_config();
        let store = InMemoryStore::new();
        let gateway = Arc::new(gateway);

        let state = AppState::new(
            config,
            Arc::new(store.clone()) as Arc<dyn MarketplaceStore>,
            gateway.clone() as Arc<dyn PaymentGateway>,
        );
        let jwt = state.jwt.clone();

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        let router = build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            address: format!("http://127.0.0.1:{}", port),
            store,
            gateway,
            jwt,
            client: Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn token_for(&self, email: &str) -> String {
        self.jwt
            .issue_token(email, Map::new())
            .expect("Failed to issue test token")
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn authed_get(&self, path: &str, email: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(self.token_for(email))
    }

    pub fn authed_post(&self, path: &str, email: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(self.token_for(email))
    }

    pub fn authed_patch(&self, path: &str, email: &str) -> reqwest::RequestBuilder {
        self.client
            .patch(self.url(path))
            .bearer_auth(self.token_for(email))
    }

    pub async fn seed_user(&self, email: &str, coins: Option<i64>) -> ObjectId {
        let profile = match coins {
            Some(coins) => doc! { "coins": coins },
            None => Document::new(),
        };
        self.store
            .insert_user(new_user(email, profile))
            .await
            .expect("Failed to seed user")
    }

    pub async fn seed_recipe(&self, name: &str, creator: &str) -> ObjectId {
        self.store
            .insert_recipe(new_recipe(doc! {
                "recipeName": name,
                "recipeImage": format!("https://img.example.com/{}.png", name),
                "creatorEmail": creator,
                "countryName": "Italy",
                "recipeDetails": "Boil, stir, serve.",
            }))
            .await
            .expect("Failed to seed recipe")
    }

    /// Stored user with this email.
    pub async fn user(&self, email: &str) -> Document {
        self.store
            .find_user_by_email(email)
            .await
            .expect("Failed to read user")
            .expect("User not stored")
    }
}

/// Integer `coins` of a stored user, if it holds one.
pub fn coins(user: &Document) -> Option<i64> {
    user.get_i64("coins").ok()
}

pub async fn json_body(response: reqwest::Response) -> Value {
    response.json().await.expect("Failed to parse JSON body")
}

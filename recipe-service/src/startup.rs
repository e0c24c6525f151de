//! Application startup and lifecycle management.

use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{RecipeConfig, StoreBackend};
use crate::services::{InMemoryStore, MarketplaceStore, MongoStore, PaymentGateway, StripeGateway};
use crate::{build_router, AppState};

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connects the store, wires the gateway and binds the listener.
    pub async fn build(config: RecipeConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await?;

        let gateway = StripeGateway::new(config.payment_gateway.clone());
        if gateway.is_configured() {
            tracing::info!("Payment gateway client initialized");
        } else {
            tracing::warn!(
                "Payment gateway key not configured - payment intents will fail"
            );
        }
        let payments: Arc<dyn PaymentGateway> = Arc::new(gateway);

        let state = AppState::new(config.clone(), store, payments);

        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("{} listening on port {}", config.service_name, port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router).await
    }
}

async fn connect_store(config: &RecipeConfig) -> Result<Arc<dyn MarketplaceStore>, AppError> {
    use secrecy::ExposeSecret;

    match config.store.backend {
        StoreBackend::Mongo => {
            let store =
                MongoStore::connect(config.store.uri.expose_secret(), &config.store.database)
                    .await?;

            store.ping().await.map_err(|e| {
                tracing::error!("MongoDB ping failed: {}", e);
                AppError::from(e)
            })?;

            store.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;

            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store - data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

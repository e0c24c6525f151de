use secrecy::{ExposeSecret, Secret};
use service_core::config::{get_env, get_optional_env, load_dotenv, parse_env, Environment};
use service_core::error::AppError;

#[derive(Debug, Clone)]
pub struct RecipeConfig {
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub port: u16,
    pub otlp_endpoint: Option<String>,
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    pub payment_gateway: PaymentGatewayConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub uri: Secret<String>,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub token_expiry_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct PaymentGatewayConfig {
    pub secret_key: Secret<String>,
    pub api_base_url: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl RecipeConfig {
    pub fn from_env() -> Result<Self, AppError> {
        load_dotenv();

        let environment = Environment::from_env()?;
        let is_prod = environment.is_prod();

        let config = RecipeConfig {
            service_name: get_env("SERVICE_NAME", Some("recipe-service"), false)?,
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: get_env("LOG_LEVEL", Some("info,recipe_service=debug"), false)?,
            port: parse_env("PORT", 5000)?,
            otlp_endpoint: get_optional_env("OTEL_EXPORTER_OTLP_ENDPOINT"),
            store: StoreConfig {
                backend: get_env("STORE_BACKEND", Some("mongo"), false)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                uri: Secret::new(mongo_uri(is_prod)?),
                database: get_env("MONGODB_DATABASE", Some("RecipeHouse"), false)?,
            },
            jwt: JwtConfig {
                secret: Secret::new(get_env("JSON_SECRET_KEY", Some("dev-secret"), is_prod)?),
                token_expiry_minutes: parse_env("TOKEN_EXPIRY_MINUTES", 60)?,
            },
            payment_gateway: PaymentGatewayConfig {
                secret_key: Secret::new(get_optional_env("PAYMENT_GATEWAY_KEY").unwrap_or_default()),
                api_base_url: get_env(
                    "PAYMENT_GATEWAY_URL",
                    Some("https://api.stripe.com/v1"),
                    false,
                )?,
                currency: get_env("PAYMENT_CURRENCY", Some("usd"), false)?,
            },
            cors: CorsConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("*"), false)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.jwt.token_expiry_minutes <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "TOKEN_EXPIRY_MINUTES must be positive"
            )));
        }

        if self.jwt.secret.expose_secret().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JSON_SECRET_KEY must not be empty"
            )));
        }

        if self.environment.is_prod() {
            if self.cors.allows_any_origin() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.store.backend == StoreBackend::Memory {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "The in-memory store cannot be used in production"
                )));
            }

            if self.payment_gateway.secret_key.expose_secret().is_empty() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "PAYMENT_GATEWAY_KEY is required in production"
                )));
            }
        }

        Ok(())
    }
}

/// `MONGODB_URI` when set, otherwise an Atlas SRV URI assembled from
/// `DB_NAME`/`DB_PASS`/`DB_HOST`, otherwise a local server outside production.
fn mongo_uri(is_prod: bool) -> Result<String, AppError> {
    if let Some(uri) = get_optional_env("MONGODB_URI") {
        return Ok(uri);
    }

    match (
        get_optional_env("DB_NAME"),
        get_optional_env("DB_PASS"),
        get_optional_env("DB_HOST"),
    ) {
        (Some(user), Some(pass), Some(host)) => Ok(atlas_uri(&user, &pass, &host)),
        _ if is_prod => Err(AppError::ConfigError(anyhow::anyhow!(
            "MONGODB_URI or DB_NAME/DB_PASS/DB_HOST is required in production"
        ))),
        _ => Ok("mongodb://localhost:27017".to_string()),
    }
}

fn atlas_uri(user: &str, pass: &str, host: &str) -> String {
    format!(
        "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
        user, pass, host
    )
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service_core::error::AppError;

use crate::config::JwtConfig;

/// Claims the server sets itself; client-supplied values under these names are dropped.
const RESERVED_CLAIMS: [&str; 3] = ["email", "iat", "exp"];

/// HS256 session tokens signed with the shared secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_minutes: i64,
}

/// Claims carried by a session token.
///
/// Whatever the client posted to `/jwt` besides `email` rides along in `profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_minutes: config.token_expiry_minutes,
        }
    }

    /// Signs a session token for `email`.
    pub fn issue_token(&self, email: &str, mut profile: Map<String, Value>) -> Result<String, AppError> {
        for claim in RESERVED_CLAIMS {
            profile.remove(claim);
        }

        let now = Utc::now();
        let exp = now + Duration::minutes(self.token_expiry_minutes);

        let claims = SessionClaims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            profile,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to encode session token: {}", e))
        })
    }

    /// Verifies signature and expiry and returns the decoded claims.
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    pub fn token_expiry_seconds(&self) -> i64 {
        self.token_expiry_minutes * 60
    }
}

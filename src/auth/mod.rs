use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User identity the token was issued for
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            sub: user_id.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("Token lifetime of {0} hours is out of range")]
    InvalidExpiry(u64),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Who is making the request. Resolved once per request by the session middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Authenticated { user_id: UserId },
    Anonymous,
}

impl Session {
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Session::Authenticated {
            user_id: UserId::new(user_id),
        }
    }

    /// Identity that scopes every project query, or 401.
    pub fn user_id(&self) -> Result<&UserId, ApiError> {
        match self {
            Session::Authenticated { user_id } => Ok(user_id),
            Session::Anonymous => Err(ApiError::unauthorized("Unauthorized")),
        }
    }
}

/// Resolves the caller's session from request headers.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session(&self, headers: &HeaderMap) -> Session;
}

/// HS256 bearer-token sessions.
pub struct JwtSessionProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionProvider {
    pub fn new(secret: &str) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        })
    }

    fn validate(&self, token: &str) -> Result<Claims, String> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| format!("Invalid JWT token: {}", e))
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn session(&self, headers: &HeaderMap) -> Session {
        let token = match extract_bearer_token(headers) {
            Ok(token) => token,
            Err(msg) => {
                tracing::debug!("No session: {}", msg);
                return Session::Anonymous;
            }
        };

        match self.validate(token) {
            Ok(claims) if !claims.sub.trim().is_empty() => Session::authenticated(claims.sub),
            Ok(_) => {
                tracing::debug!("No session: token has an empty subject");
                Session::Anonymous
            }
            Err(msg) => {
                tracing::debug!("No session: {}", msg);
                Session::Anonymous
            }
        }
    }
}

/// Extract JWT token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}

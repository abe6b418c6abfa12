//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Kind of token carried in the claims
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Access or refresh
    pub token_type: TokenType,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Access and refresh token issued together
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a fresh access/refresh pair for a user
    pub fn generate_pair(&self, user_id: i64, username: &str) -> Result<TokenPair, AuthError> {
        debug!("Generating token pair for user: {}", username);

        Ok(TokenPair {
            refresh: self.generate_token(user_id, username, TokenType::Refresh)?,
            access: self.generate_token(user_id, username, TokenType::Access)?,
        })
    }

    /// Generate a single JWT token for a user
    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        token_type: TokenType,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let exp = now + ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate a token of the expected type and return its claims
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            },
        )?;

        // Check expiration
        let now = Utc::now().timestamp();
        if token_data.claims.exp < now {
            return Err(AuthError::TokenExpired);
        }

        if token_data.claims.token_type != expected {
            return Err(AuthError::WrongTokenType(expected.as_str()));
        }

        Ok(token_data.claims)
    }

    /// Exchange a valid refresh token for a new access token
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.validate_token(refresh_token, TokenType::Refresh)?;
        let user_id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        self.generate_token(user_id, &claims.username, TokenType::Access)
    }
}

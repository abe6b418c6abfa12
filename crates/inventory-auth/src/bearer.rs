//! Bearer credential handling

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::jwt::Claims;

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        Ok(Self {
            id: claims.sub.parse().map_err(|_| AuthError::InvalidToken)?,
            username: claims.username.clone(),
        })
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

//! Request/Response DTOs

use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Token issuance request
#[derive(Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: String,
}

/// Token refresh response
#[derive(Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

// ==================== User Types ====================

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

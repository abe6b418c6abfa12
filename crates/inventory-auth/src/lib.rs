//! Inventory Authentication
//!
//! This crate provides password hashing and JWT access/refresh
//! token handling for the inventory service.

pub mod bearer;
pub mod error;
pub mod jwt;
pub mod password;

pub use bearer::{AuthUser, extract_bearer_token};
pub use error::AuthError;
pub use jwt::{Claims, JwtManager, TokenPair, TokenType};
pub use password::{hash_password, verify_password};

//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    routing::post,
};
use inventory_auth::{
    AuthError, AuthUser, TokenPair, TokenType, extract_bearer_token, hash_password,
    verify_password,
};
use inventory_core::ValidationErrors;
use inventory_db::{DbError, NewUser};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::Payload;
use crate::state::AppState;

use super::types::{RefreshRequest, RefreshResponse, RegisterRequest, TokenRequest};

// ==================== Auth Extractors ====================

/// Extractor for authenticated user (required)
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingAuthHeader)?;

        let token = extract_bearer_token(auth_header)?;
        let claims = app_state.jwt.validate_token(token, TokenType::Access)?;
        let user = AuthUser::from_claims(&claims)?;

        debug!("Authenticated user: {}", user.username);
        Ok(RequireAuth(user))
    }
}

// ==================== Input Validation ====================

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 150;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Validate username format and length
fn check_username(username: &str, errors: &mut ValidationErrors) {
    if username.is_empty() {
        errors.add("username", "This field may not be blank.");
    } else if username.chars().count() > MAX_USERNAME_LENGTH {
        errors.add(
            "username",
            format!("Ensure this field has no more than {} characters.", MAX_USERNAME_LENGTH),
        );
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

/// Validate password presence and length
fn check_password(password: &str, errors: &mut ValidationErrors) {
    if password.is_empty() {
        errors.add("password", "This field may not be blank.");
    } else if password.len() > MAX_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Ensure this field has no more than {} characters.", MAX_PASSWORD_LENGTH),
        );
    }
}

fn into_result(errors: ValidationErrors) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

// ==================== Auth Routes ====================

/// POST /register
async fn register(
    State(state): State<AppState>,
    Payload(request): Payload<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenPair>), ApiError> {
    let mut errors = ValidationErrors::default();
    check_username(&request.username, &mut errors);
    check_password(&request.password, &mut errors);
    if !request.email.is_empty() && !request.email.contains('@') {
        errors.add("email", "Enter a valid email address.");
    }
    into_result(errors)?;

    debug!("Registering user: {}", request.username);

    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .insert_user(NewUser {
            username: request.username,
            password_hash,
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
        })
        .await
        .map_err(|e| match e {
            DbError::Duplicate(_) => {
                let mut errors = ValidationErrors::default();
                errors.add("username", "A user with that username already exists.");
                ApiError::Validation(errors)
            }
            other => ApiError::Database(other),
        })?;

    let tokens = state.jwt.generate_pair(user.id, &user.username)?;

    info!("User registered: {}", user.username);

    Ok((StatusCode::CREATED, Json(tokens)))
}

/// POST /api/token/
async fn obtain_token(
    State(state): State<AppState>,
    Payload(request): Payload<TokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let mut errors = ValidationErrors::default();
    if request.username.is_empty() {
        errors.add("username", "This field may not be blank.");
    }
    check_password(&request.password, &mut errors);
    into_result(errors)?;

    debug!("Token request for user: {}", request.username);

    let user_result = state.db.get_user_by_username(&request.username).await?;

    // Unknown users still pay for one hash verification so response time
    // does not reveal which usernames exist. The dummy never verifies.
    const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

    let user = match user_result {
        Some(user) if verify_password(&request.password, &user.password_hash)? => user,
        Some(_) => return Err(AuthError::InvalidCredentials.into()),
        None => {
            let _ = verify_password(&request.password, DUMMY_HASH);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let tokens = state.jwt.generate_pair(user.id, &user.username)?;

    info!("Issued tokens for user {}", user.username);

    Ok(Json(tokens))
}

/// POST /api/token/refresh/
async fn refresh_token(
    State(state): State<AppState>,
    Payload(request): Payload<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    if request.refresh.is_empty() {
        let mut errors = ValidationErrors::default();
        errors.add("refresh", "This field may not be blank.");
        return Err(ApiError::Validation(errors));
    }

    let access = state.jwt.refresh_access(&request.refresh)?;
    Ok(Json(RefreshResponse { access }))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/api/token/", post(obtain_token))
        .route("/api/token/refresh/", post(refresh_token))
}

//! Registration and token issuance handlers
//!
//! The only endpoints reachable without a bearer token.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use cvforge_common::{
    auth,
    db::Repository,
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let password_hash = auth::hash_password(&request.password)?;

    let user = repo.create_user(request.username, password_hash).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully!".to_string(),
        }),
    ))
}

/// Issue a JWT for valid credentials
pub async fn token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>> {
    let repo = Repository::new(state.db.clone());

    let user = repo
        .find_user_by_username(&request.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid username or password".to_string(),
        })?;

    if !auth::verify_password(&request.password, &user.password_hash) {
        return Err(AppError::Unauthorized {
            message: "Invalid username or password".to_string(),
        });
    }

    let manager = auth::JwtManager::new(
        state
            .config
            .auth
            .jwt_secret
            .as_deref()
            .ok_or_else(|| AppError::Configuration {
                message: "auth.jwt_secret is not configured".to_string(),
            })?,
        state.config.auth.jwt_expiration_secs,
    );

    let access_token = manager.generate_token(user.id, &user.username)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.config.auth.jwt_expiration_secs,
    }))
}

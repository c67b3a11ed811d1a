// ABOUTME: Registration, login, and user-existence handlers.
// ABOUTME: Login compares bcrypt hashes off the async workers and answers with a signed bearer token.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use ratekeeper_core::Credentials;
use serde_json::{Value, json};

use crate::api::{JsonBody, blocking};
use crate::app_state::SharedState;
use crate::auth::AuthClaims;
use crate::error::ApiError;

/// POST /rate/registers - Create a user with a hashed password.
pub async fn register(
    State(state): State<SharedState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<Value>, ApiError> {
    let user = blocking(move || Ok(state.users.register(&credentials)?)).await?;
    tracing::info!("registered user {}", user.username);
    Ok(Json(json!({ "message": "User registered successfully!" })))
}

/// POST /rate/login - Exchange a username and password for a token.
pub async fn login(
    State(state): State<SharedState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(&state);
    let user = blocking(move || {
        let user = store
            .users
            .find_by_username(&credentials.username)?
            .ok_or(ApiError::InvalidCredentials)?;
        if !store.users.compare_password(&user, &credentials.password)? {
            return Err(ApiError::InvalidCredentials);
        }
        Ok(user)
    })
    .await?;

    let token = state.tokens.issue_token(user.user_id)?;
    tracing::info!("user {} logged in", user.username);
    Ok(Json(json!({ "token": token })))
}

/// GET /rate/users/check - Confirm at least one user exists. Requires a token.
pub async fn check_users(
    State(state): State<SharedState>,
    axum::Extension(claims): AuthClaims,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!("user check requested by {}", claims.user_id);
    if blocking(move || Ok(state.users.count_users()?)).await? == 0 {
        return Err(ApiError::NotFound("No users found"));
    }
    Ok(Json(json!({ "message": "Users exist" })))
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::extract::ApiJson;
use crate::{
    auth::{authenticate, AuthError},
    error::ApiError,
    models::FieldErrors,
    state::AppState,
};

/// Credentials posted to `/login`.
#[derive(Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name
    #[serde(default)]
    pub login: String,
    /// Password in clear
    #[serde(rename = "clave", alias = "password", default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.login.trim().is_empty() {
            errors.insert("login".to_string(), "must not be blank".to_string());
        }
        if self.password.is_empty() {
            errors.insert("clave".to_string(), "must not be blank".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Always `AUTH_SUCCESS`
    pub code: String,
    pub message: String,
    /// Bearer token for later requests
    #[serde(rename = "authenticationToken")]
    pub authentication_token: String,
}

/// Authenticate and receive a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "Authentication",
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing login or password"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate().map_err(ApiError::validation)?;

    let user = authenticate(&state.store, &request.login, &request.password)
        .await
        .map_err(|e| {
            tracing::info!(login = %request.login, reason = %e, "Login failed");
            AuthError::from(e)
        })?;

    let token = state.tokens.issue(&user).map_err(AuthError::from)?;
    tracing::info!(user_id = user.user_id, login = %user.login, "Login succeeded");

    Ok(Json(LoginResponse {
        code: "AUTH_SUCCESS".to_string(),
        message: "Authentication successful.".to_string(),
        authentication_token: token,
    }))
}

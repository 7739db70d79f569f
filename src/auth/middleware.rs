// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Two layers run in front of every route:
//!
//! 1. [`identity_filter`] reads the bearer token. No token means the request
//!    continues anonymously; a bad token ends the request here; a good token
//!    whose subject exists in the store attaches an [`AuthenticatedUser`] to
//!    the request extensions.
//! 2. [`enforce_access_policy`] checks the attached identity (or its
//!    absence) against the [`AccessPolicy`](super::AccessPolicy).
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/medicos", get(list_doctors))
//!     .layer(middleware::from_fn_with_state(state.clone(), enforce_access_policy))
//!     .layer(middleware::from_fn_with_state(state.clone(), identity_filter));
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Bearer token from the `Authorization` header, if there is one.
///
/// Headers that are not valid UTF-8 or use another scheme count as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
}

/// Resolve the identity behind a bearer token.
///
/// `Ok(None)` means the token is good but its subject no longer exists.
pub async fn resolve_identity(
    state: &AppState,
    token: &str,
) -> Result<Option<AuthenticatedUser>, AuthError> {
    state.tokens.validate(token)?;
    let login = state.tokens.subject_of(token)?;

    let store = state.store.read().await;
    Ok(store.user_by_login(&login).map(AuthenticatedUser::from_user))
}

/// Identity filter.
pub async fn identity_filter(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        return next.run(request).await;
    };

    match resolve_identity(&state, &token).await {
        Ok(Some(user)) => {
            tracing::debug!(user_id = user.user_id, role = %user.role, "Request authenticated");
            request.extensions_mut().insert(user);
        }
        Ok(None) => {
            tracing::debug!("Token subject not found, continuing anonymously");
        }
        Err(e) => {
            tracing::warn!(
                error_code = e.error_code(),
                path = %request.uri().path(),
                "Rejected bearer token"
            );
            return e.into_response();
        }
    }

    next.run(request).await
}

/// Access policy enforcement. Must run after [`identity_filter`].
pub async fn enforce_access_policy(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    {
        let user = request.extensions().get::<AuthenticatedUser>();

        if let Err(e) = state
            .policy
            .authorize(request.method(), request.uri().path(), user)
        {
            tracing::info!(
                error_code = e.error_code(),
                method = %request.method(),
                path = %request.uri().path(),
                user_id = user.map(|u| u.user_id),
                "Access refused"
            );
            return e.into_response();
        }
    }

    next.run(request).await
}

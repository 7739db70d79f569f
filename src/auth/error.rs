// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::credentials::CredentialError;
use super::token::TokenError;
use crate::error::ApiError;

/// Authentication and authorization failures.
///
/// Token variants are produced by the identity filter, the two policy
/// variants by the access policy, and `InvalidCredentials` by login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown login or wrong password
    #[error("Invalid credentials. Check your login and password.")]
    InvalidCredentials,
    /// Token could not be parsed
    #[error("Token is malformed")]
    MalformedToken,
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,
    /// Signature or issuer invalid, or subject missing
    #[error("Token is invalid")]
    InvalidToken,
    /// Anonymous request to a protected route
    #[error("Authentication is required to access this resource")]
    AuthenticationRequired,
    /// Authenticated, but the role is not permitted
    #[error("Insufficient permissions for this operation")]
    AccessDenied,
    /// Hashing or signing failed
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "ERR_INVALID_CREDENTIALS",
            AuthError::MalformedToken => "ERR_MALFORMED_TOKEN",
            AuthError::TokenExpired => "ERR_TOKEN_EXPIRED",
            AuthError::InvalidToken => "ERR_INVALID_TOKEN",
            AuthError::AuthenticationRequired => "ERR_AUTHENTICATION_REQUIRED",
            AuthError::AccessDenied => "ERR_ACCESS_DENIED",
            AuthError::Internal(_) => "ERR_INTERNAL",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MalformedToken => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::InvalidToken
            | AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Malformed => AuthError::MalformedToken,
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::InvalidSignature
            | TokenError::InvalidIssuer
            | TokenError::MissingSubject => AuthError::InvalidToken,
            TokenError::Signing(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<CredentialError> for AuthError {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::UserNotFound | CredentialError::BadCredentials => {
                AuthError::InvalidCredentials
            }
            CredentialError::Hashing(msg) => AuthError::Internal(msg),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

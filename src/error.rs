// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API error responses.
//!
//! Every failure leaving the service goes through [`ApiError`], which renders
//! `{code, message}` or, for field validation, `{code, errors}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::models::FieldErrors;
use crate::store::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub errors: Option<FieldErrors>,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            errors: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "ERR_RECORD_NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "ERR_INVALID_REQUEST", message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "ERR_METHOD_NOT_ALLOWED",
            "Method not allowed for this resource",
        )
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "ERR_DUPLICATE_RECORD", message)
    }

    /// Field validation failure, reported per field.
    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "ERR_VALIDATION_FAILED",
            message: "Request validation failed".to_string(),
            errors: Some(errors),
        }
    }

    /// Internal failure. The detail is logged, never returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ERR_INTERNAL",
            "Internal server error",
        )
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Internal(detail) => ApiError::internal(detail),
            other => ApiError::new(other.status_code(), other.error_code(), other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate(_) => ApiError::conflict(error.to_string()),
            StoreError::NotFound => ApiError::not_found("The requested record was not found"),
            StoreError::Incomplete(field) => ApiError::validation(FieldErrors::from([(
                field.to_string(),
                "must not be null".to_string(),
            )])),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match &rejection {
            JsonRejection::JsonDataError(e) if e.body_text().contains("unknown variant") => {
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "ERR_INVALID_SPECIALITY",
                    "The specialty is not valid",
                )
            }
            _ => ApiError::bad_request(rejection.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.errors {
            Some(errors) => ErrorBody {
                code: self.code,
                message: None,
                errors: Some(errors),
            },
            None => ErrorBody {
                code: self.code,
                message: Some(self.message),
                errors: None,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

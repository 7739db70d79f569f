// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request extractors whose rejections render as [`ApiError`].
//!
//! Axum's own extractors answer bad input with plain-text bodies; these
//! wrappers route every rejection through the same JSON error shape as the
//! rest of the API.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// Like [`axum::Json`]. Unreadable bodies become `ERR_INVALID_REQUEST` or
/// `ERR_INVALID_SPECIALITY`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Like [`axum::extract::Path`]. Unparseable segments become
/// `ERR_INVALID_REQUEST`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Like [`axum::extract::Query`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

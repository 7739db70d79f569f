// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Voll Med - Clinic Management Service
//!
//! REST API for doctor and patient records. Every request passes through a
//! JWT identity filter and an ordered, role-based access policy before it
//! reaches a handler.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Login, token codec, identity filter and access policy
//! - `config` - Environment configuration
//! - `store` - In-memory record store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod store;

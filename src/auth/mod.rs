// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Login, token verification and route authorization for the Voll Med API.
//!
//! ## Auth Flow
//!
//! 1. Client sends `POST /login` with `{login, clave}`
//! 2. Server:
//!    - Verifies the password against the stored bcrypt hash
//!    - Issues an HMAC-signed JWT (`sub` = login, `rol` = `ROLE_<ROLE>`,
//!      issuer `voll med`, one hour lifetime)
//! 3. Client sends `Authorization: Bearer <token>` on later requests
//! 4. Server, per request:
//!    - Identity filter verifies the token and attaches the stored user
//!    - Access policy admits or refuses the request by method, path and role
//!
//! ## Security
//!
//! - Only `POST /login` is reachable without a token
//! - Token verification is stateless; tokens cannot be revoked before expiry
//! - Expiry is exclusive and has no clock-skew leeway
//! - Passwords are never stored or logged in clear

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use credentials::{authenticate, hash_password, CredentialError};
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use policy::{AccessPolicy, AccessRule, Requirement};
pub use roles::Role;
pub use token::{TokenCodec, TokenError};

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential verification and password hashing.
//!
//! Passwords are stored as bcrypt hashes. Hashing and verification are
//! CPU-bound and run on the blocking thread pool.

use tokio::sync::RwLock;

use super::AuthenticatedUser;
use crate::store::InMemoryStore;

/// bcrypt cost used when none is configured.
pub const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Longest password bcrypt hashes without truncating (in bytes).
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Why a login attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("user not found")]
    UserNotFound,
    #[error("bad credentials")]
    BadCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Hash a password with bcrypt at `cost` (defaults to [`BCRYPT_COST`]).
///
/// Passwords longer than [`MAX_PASSWORD_LENGTH`] bytes are refused.
pub async fn hash_password(password: &str, cost: Option<u32>) -> Result<String, CredentialError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(CredentialError::Hashing(format!(
            "password exceeds {MAX_PASSWORD_LENGTH} bytes"
        )));
    }

    let password = password.to_string();
    let cost = cost.unwrap_or(BCRYPT_COST);

    tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, cost).map_err(|e| CredentialError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| CredentialError::Hashing(format!("task join error: {e}")))?
}

/// Compare a cleartext password against a bcrypt hash.
///
/// bcrypt only reads the first 72 bytes, so a longer password never matches.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Ok(false);
    }

    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &hash).map_err(|e| CredentialError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| CredentialError::Hashing(format!("task join error: {e}")))?
}

/// Check a login/password pair against the identity store.
///
/// The store lock is released before the hash comparison runs.
pub async fn authenticate(
    store: &RwLock<InMemoryStore>,
    login: &str,
    password: &str,
) -> Result<AuthenticatedUser, CredentialError> {
    let user = store
        .read()
        .await
        .user_by_login(login)
        .cloned()
        .ok_or(CredentialError::UserNotFound)?;

    if verify_password(password, &user.password_hash).await? {
        Ok(AuthenticatedUser::from_user(&user))
    } else {
        Err(CredentialError::BadCredentials)
    }
}

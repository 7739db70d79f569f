// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are compact JWTs signed with an HMAC key taken from the configured
//! secret. Verification is stateless: there is no session store, so a token
//! stays usable until it expires.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::claims::{AuthenticatedUser, TokenClaims};

/// Issuer written into, and required from, every token.
pub const TOKEN_ISSUER: &str = "voll med";

/// Lifetime of an issued token.
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Shortest secret accepted as an HMAC key (256 bits).
pub const MIN_SECRET_LEN: usize = 32;

/// Reasons a token is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token issuer is invalid")]
    InvalidIssuer,
    #[error("token has no subject")]
    MissingSubject,
    #[error("token could not be signed: {0}")]
    Signing(String),
}

/// Signing secret rejected at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("signing secret must be at least 32 bytes, got {0}")]
pub struct WeakSecretError(pub usize);

/// Encodes and verifies login tokens.
///
/// Holds the derived keys only; every call is independent, so one codec is
/// shared by all requests.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    /// Derive the signing keys from a secret.
    ///
    /// The HMAC variant follows the key size: 64 bytes or more selects HS512,
    /// 48 or more HS384, otherwise HS256.
    pub fn from_secret(secret: &[u8]) -> Result<Self, WeakSecretError> {
        let algorithm = match secret.len() {
            n if n >= 64 => Algorithm::HS512,
            n if n >= 48 => Algorithm::HS384,
            n if n >= MIN_SECRET_LEN => Algorithm::HS256,
            n => return Err(WeakSecretError(n)),
        };

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: TOKEN_TTL,
        })
    }

    /// HMAC algorithm selected for this secret.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Issue a token for `user`, valid from now for [`TOKEN_TTL`].
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, user: &AuthenticatedUser, now: i64) -> Result<String, TokenError> {
        let claims = TokenClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: Some(user.login.clone()),
            id: user.user_id,
            rol: user.role.authority(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check a token's structure, signature, issuer, expiry and subject.
    pub fn validate(&self, token: &str) -> Result<(), TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// [`validate`](Self::validate) against an explicit clock.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<(), TokenError> {
        self.verify_at(token, now).map(|_| ())
    }

    /// Verify a token and return its subject (the user's login).
    pub fn subject_of(&self, token: &str) -> Result<String, TokenError> {
        self.subject_of_at(token, Utc::now().timestamp())
    }

    /// [`subject_of`](Self::subject_of) against an explicit clock.
    pub fn subject_of_at(&self, token: &str, now: i64) -> Result<String, TokenError> {
        self.verify_at(token, now)?
            .sub
            .ok_or(TokenError::MissingSubject)
    }

    /// Full verification, returning the claims of a good token.
    ///
    /// Expiry is exclusive: at `now == exp` the token is already expired.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        // Expiry is checked below against the caller's clock, without leeway.
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::Malformed,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
                ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => {
                    TokenError::InvalidIssuer
                }
                ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed,
                _ => TokenError::InvalidSignature,
            })?
            .claims;

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        match claims.sub.as_deref() {
            Some(sub) if !sub.is_empty() => Ok(claims),
            _ => Err(TokenError::MissingSubject),
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;
use crate::models::User;

/// Claims carried by tokens issued at login.
///
/// `sub` is optional on the way in so that a token without a subject decodes
/// and can be rejected with a precise error instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer (always `voll med` for tokens minted here)
    #[serde(default)]
    pub iss: String,

    /// Subject (user login)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// User ID
    pub id: u64,

    /// Role authority, e.g. `ROLE_ADMIN`
    pub rol: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl TokenClaims {
    /// Role named by the `rol` claim, if it is one we know.
    pub fn role(&self) -> Option<Role> {
        Role::from_authority(&self.rol)
    }
}

/// Authenticated user information.
///
/// This is the identity attached to a request by the identity filter and
/// handed to handlers through the [`Auth`](super::Auth) extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// User ID in the identity store
    pub user_id: u64,

    /// Login name
    pub login: String,

    /// Granted role
    pub role: Role,
}

impl AuthenticatedUser {
    /// Build the identity for a stored user.
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            login: user.login.clone(),
            role: user.role,
        }
    }

    /// Check if the user holds one of the given roles.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

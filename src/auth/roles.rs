// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix carried by role authorities inside issued tokens.
const AUTHORITY_PREFIX: &str = "ROLE_";

/// User roles for authorization.
///
/// ## Roles
///
/// - `Admin` - Clinic administration (doctor records, read access to patients)
/// - `UserMedic` - Doctors (patient records, read access to doctors)
/// - `UserPatient` - Patients (read access to doctors)
///
/// Roles are not hierarchical: the access policy names every role it admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Clinic administrator
    Admin,
    /// Medical staff
    UserMedic,
    /// Patient
    UserPatient,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::UserMedic, Role::UserPatient];

    /// Bare role name, e.g. `USER_MEDIC`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::UserMedic => "USER_MEDIC",
            Role::UserPatient => "USER_PATIENT",
        }
    }

    /// Authority string written into the token's `rol` claim, e.g. `ROLE_ADMIN`.
    pub fn authority(&self) -> String {
        format!("{AUTHORITY_PREFIX}{}", self.as_str())
    }

    /// Parse a role from its bare name (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
    }

    /// Parse a role from its authority form. The bare name is accepted too.
    pub fn from_authority(s: &str) -> Option<Role> {
        Role::from_str(s.strip_prefix(AUTHORITY_PREFIX).unwrap_or(s))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

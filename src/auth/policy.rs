// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route-level access policy.
//!
//! An ordered list of rules, each pairing a method and a set of path
//! patterns with a requirement. The first rule that matches a request
//! decides; later rules are never consulted, so specific rules must come
//! before broad ones. Requests no rule matches need an authenticated user.
//!
//! ## Path Patterns
//!
//! - `**` matches zero or more path segments
//! - `*` matches exactly one segment
//! - anything else matches a segment literally
//!
//! `/medicos/**` therefore covers `/medicos`, `/medicos/5` and deeper paths.

use axum::http::Method;

use super::{AuthError, AuthenticatedUser, Role};

/// What a rule demands of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, including anonymous callers
    Public,
    /// Any authenticated user
    Authenticated,
    /// An authenticated user holding one of these roles
    AnyRole(Vec<Role>),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<String>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            raw: pattern.to_string(),
            segments: split_path(pattern).map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split_path(path).collect();
        let pattern: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        match_segments(&pattern, &path)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => (0..=path.len()).any(|skip| match_segments(rest, &path[skip..])),
        Some((head, rest)) => match path.split_first() {
            Some((segment, remaining)) => {
                (*head == "*" || head == segment) && match_segments(rest, remaining)
            }
            None => false,
        },
    }
}

/// One entry of the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    /// `None` matches every method.
    pub method: Option<Method>,
    pub patterns: Vec<PathPattern>,
    pub requirement: Requirement,
}

impl AccessRule {
    /// Rule for a single method.
    pub fn new(method: Method, patterns: &[&str], requirement: Requirement) -> Self {
        Self {
            method: Some(method),
            patterns: patterns.iter().map(|p| PathPattern::new(p)).collect(),
            requirement,
        }
    }

    /// Rule for every method.
    pub fn any_method(patterns: &[&str], requirement: Requirement) -> Self {
        Self {
            method: None,
            patterns: patterns.iter().map(|p| PathPattern::new(p)).collect(),
            requirement,
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method)
            && self.patterns.iter().any(|p| p.matches(path))
    }
}

/// Ordered access rules, evaluated first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    fallback: Requirement,
}

impl AccessPolicy {
    /// Policy from explicit rules; unmatched requests need authentication.
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self {
            rules,
            fallback: Requirement::Authenticated,
        }
    }

    /// The clinic's route table.
    pub fn clinic() -> Self {
        use Role::{Admin, UserMedic, UserPatient};

        Self::new(vec![
            AccessRule::new(Method::POST, &["/login"], Requirement::Public),
            AccessRule::new(
                Method::GET,
                &["/medicos/**"],
                Requirement::AnyRole(vec![Admin, UserMedic, UserPatient]),
            ),
            AccessRule::new(
                Method::GET,
                &["/pacientes/**"],
                Requirement::AnyRole(vec![UserMedic, Admin]),
            ),
            AccessRule::any_method(&["/pacientes/**"], Requirement::AnyRole(vec![UserMedic])),
            AccessRule::any_method(
                &["/medicos/**", "/pacientes/**"],
                Requirement::AnyRole(vec![Admin]),
            ),
        ])
    }

    /// Requirement of the first rule matching the request.
    pub fn requirement_for(&self, method: &Method, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| &rule.requirement)
            .unwrap_or(&self.fallback)
    }

    /// Decide whether `user` may make this request.
    pub fn authorize(
        &self,
        method: &Method,
        path: &str,
        user: Option<&AuthenticatedUser>,
    ) -> Result<(), AuthError> {
        match (self.requirement_for(method, path), user) {
            (Requirement::Public, _) => Ok(()),
            (_, None) => Err(AuthError::AuthenticationRequired),
            (Requirement::Authenticated, Some(_)) => Ok(()),
            (Requirement::AnyRole(roles), Some(user)) if user.has_any_role(roles) => Ok(()),
            (Requirement::AnyRole(_), Some(_)) => Err(AuthError::AccessDenied),
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::clinic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: 1,
            login: "someone".to_string(),
            role,
        }
    }

    fn allowed(method: Method, path: &str, role: Role) -> bool {
        AccessPolicy::clinic()
            .authorize(&method, path, Some(&user(role)))
            .is_ok()
    }

    #[test]
    fn double_star_matches_any_depth() {
        let pattern = PathPattern::new("/medicos/**");
        assert!(pattern.matches("/medicos"));
        assert!(pattern.matches("/medicos/"));
        assert!(pattern.matches("/medicos/5"));
        assert!(pattern.matches("/medicos/5/agenda"));
        assert!(!pattern.matches("/medicosx"));
        assert!(!pattern.matches("/pacientes/5"));
    }

    #[test]
    fn single_star_matches_one_segment() {
        let pattern = PathPattern::new("/medicos/*");
        assert!(pattern.matches("/medicos/5"));
        assert!(!pattern.matches("/medicos"));
        assert!(!pattern.matches("/medicos/5/agenda"));
    }

    #[test]
    fn double_star_in_the_middle() {
        let pattern = PathPattern::new("/a/**/z");
        assert!(pattern.matches("/a/z"));
        assert!(pattern.matches("/a/b/c/z"));
        assert!(!pattern.matches("/a/b/c"));
    }

    #[test]
    fn login_is_public() {
        let policy = AccessPolicy::clinic();
        assert!(policy.authorize(&Method::POST, "/login", None).is_ok());
        assert_eq!(
            policy.authorize(&Method::GET, "/login", None),
            Err(AuthError::AuthenticationRequired)
        );
    }

    #[test]
    fn every_role_may_read_doctors() {
        for role in Role::ALL {
            assert!(allowed(Method::GET, "/medicos", role));
            assert!(allowed(Method::GET, "/medicos/5", role));
        }
    }

    #[test]
    fn patient_reads_need_medic_or_admin() {
        assert!(allowed(Method::GET, "/pacientes", Role::UserMedic));
        assert!(allowed(Method::GET, "/pacientes/5", Role::Admin));
        assert!(!allowed(Method::GET, "/pacientes/5", Role::UserPatient));
    }

    #[test]
    fn patient_writes_are_medic_only() {
        // The medic-only rule precedes the admin rule, so admins are refused.
        assert!(allowed(Method::DELETE, "/pacientes/5", Role::UserMedic));
        assert!(allowed(Method::POST, "/pacientes", Role::UserMedic));
        assert!(!allowed(Method::DELETE, "/pacientes/5", Role::Admin));
        assert!(!allowed(Method::PUT, "/pacientes", Role::UserPatient));
    }

    #[test]
    fn doctor_writes_are_admin_only() {
        assert!(allowed(Method::DELETE, "/medicos/5", Role::Admin));
        assert!(allowed(Method::PUT, "/medicos", Role::Admin));
        assert!(!allowed(Method::POST, "/medicos", Role::UserMedic));
        assert!(!allowed(Method::DELETE, "/medicos/5", Role::UserPatient));
    }

    #[test]
    fn unmatched_routes_need_any_user() {
        let policy = AccessPolicy::clinic();
        assert!(policy
            .authorize(&Method::GET, "/docs", Some(&user(Role::UserPatient)))
            .is_ok());
        assert_eq!(
            policy.authorize(&Method::GET, "/docs", None),
            Err(AuthError::AuthenticationRequired)
        );
    }

    #[test]
    fn anonymous_is_refused_on_role_routes() {
        let policy = AccessPolicy::clinic();
        assert_eq!(
            policy.authorize(&Method::GET, "/medicos", None),
            Err(AuthError::AuthenticationRequired)
        );
    }

    #[test]
    fn first_match_wins() {
        let policy = AccessPolicy::new(vec![
            AccessRule::any_method(&["/x/**"], Requirement::AnyRole(vec![Role::Admin])),
            AccessRule::any_method(&["/x/open"], Requirement::Public),
        ]);
        assert_eq!(
            policy.requirement_for(&Method::GET, "/x/open"),
            &Requirement::AnyRole(vec![Role::Admin])
        );
        assert_eq!(
            policy.requirement_for(&Method::GET, "/y"),
            &Requirement::Authenticated
        );
    }
}

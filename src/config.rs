// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once, at startup, and never
//! reloaded.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `API_SECURITY_SECRET` | HMAC secret for signing tokens (32+ bytes) | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `BCRYPT_COST` | bcrypt cost for passwords hashed by the server | `12` |
//! | `SEED_ADMIN_LOGIN` | Admin user created at startup | Optional |
//! | `SEED_ADMIN_PASSWORD` | Password for the seeded admin | Required with `SEED_ADMIN_LOGIN` |

use std::net::SocketAddr;

use crate::auth::credentials::BCRYPT_COST;
use crate::auth::token::MIN_SECRET_LEN;

pub const SECRET_ENV: &str = "API_SECURITY_SECRET";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const SEED_ADMIN_LOGIN_ENV: &str = "SEED_ADMIN_LOGIN";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("API_SECURITY_SECRET must be at least 32 bytes")]
    WeakSecret,
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Credentials for an admin created at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct Config {
    pub secret: String,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub bcrypt_cost: u32,
    pub seed_admin: Option<SeedAdmin>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_format", &self.log_format)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("seed_admin", &self.seed_admin)
            .finish()
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup(SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(SECRET_ENV))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, PORT_ENV, 8080)?;
        let bcrypt_cost = parse_or(&lookup, BCRYPT_COST_ENV, BCRYPT_COST)?;

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        let seed_admin = match lookup(SEED_ADMIN_LOGIN_ENV) {
            Some(login) => Some(SeedAdmin {
                login,
                password: lookup(SEED_ADMIN_PASSWORD_ENV)
                    .ok_or(ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV))?,
            }),
            None => None,
        };

        Ok(Self {
            secret,
            host,
            port,
            log_format,
            bcrypt_cost,
            seed_admin,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                value: self.host.clone(),
            })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

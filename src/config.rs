// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup (a `.env` file in the working directory is read first, if
//! present).
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5066` |
//! | `ACCESS_TOKEN_SECRET` | Session token signing secret | Required |
//! | `TOKEN_TTL_SECS` | Session token lifetime in seconds, at most one year | `7200` |
//! | `NODE_ENV` / `APP_ENV` | `production` enables secure cross-site cookies | unset |
//! | `DATABASE_PATH` | redb database file | `./data/survey.redb` |
//! | `CORS_ORIGINS` | Comma-separated allowed front-end origins | `http://localhost:5173` |
//! | `STRIPE_SECRET_KEY` | Payment provider secret key | Optional |
//! | `STRIPE_API_BASE_URL` | Payment provider base URL | `https://api.stripe.com` |
//! | `PAYMENT_CURRENCY` | Currency for payment intents | `usd` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::token::DEFAULT_TOKEN_TTL;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Secret used to sign session tokens.
///
/// Must be stable across restarts for issued tokens to stay valid, and must
/// stay confidential: anyone holding it can mint a session for any email.
pub const TOKEN_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const NODE_ENV: &str = "NODE_ENV";
pub const APP_ENV: &str = "APP_ENV";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const CORS_ORIGINS_ENV: &str = "CORS_ORIGINS";
pub const STRIPE_SECRET_KEY_ENV: &str = "STRIPE_SECRET_KEY";
pub const STRIPE_API_BASE_URL_ENV: &str = "STRIPE_API_BASE_URL";
pub const PAYMENT_CURRENCY_ENV: &str = "PAYMENT_CURRENCY";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5066;
pub const DEFAULT_DATABASE_PATH: &str = "./data/survey.redb";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Upper bound for `TOKEN_TTL_SECS` (one year).
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Payment provider settings, present only when a secret key is configured.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub api_base_url: String,
    pub currency: String,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("api_base_url", &self.api_base_url)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

/// Process-wide configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub token_secret: String,
    pub token_ttl: Duration,
    pub production: bool,
    pub database_path: PathBuf,
    pub cors_origins: Vec<String>,
    pub payments: Option<PaymentConfig>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token_ttl", &self.token_ttl)
            .field("production", &self.production)
            .field("database_path", &self.database_path)
            .field("cors_origins", &self.cors_origins)
            .field("payments", &self.payments)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup` (environment-shaped).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let token_secret = get(TOKEN_SECRET_ENV).ok_or(ConfigError::Missing(TOKEN_SECRET_ENV))?;

        let token_ttl = match get(TOKEN_TTL_ENV) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: TOKEN_TTL_ENV,
                    reason: e.to_string(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_ENV,
                        reason: "must be greater than zero".to_string(),
                    });
                }
                if secs > MAX_TOKEN_TTL_SECS {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_ENV,
                        reason: format!("must be at most {MAX_TOKEN_TTL_SECS}"),
                    });
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TOKEN_TTL,
        };

        let production = [NODE_ENV, APP_ENV]
            .iter()
            .filter_map(|name| get(*name))
            .any(|mode| mode.eq_ignore_ascii_case("production"));

        let database_path = PathBuf::from(
            get(DATABASE_PATH_ENV).unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
        );

        let cors_origins = get(CORS_ORIGINS_ENV)
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let payments = get(STRIPE_SECRET_KEY_ENV).map(|secret_key| PaymentConfig {
            secret_key,
            api_base_url: get(STRIPE_API_BASE_URL_ENV)
                .unwrap_or_else(|| crate::providers::stripe::DEFAULT_API_BASE_URL.to_string()),
            currency: get(PAYMENT_CURRENCY_ENV)
                .unwrap_or_else(|| crate::providers::stripe::DEFAULT_CURRENCY.to_string())
                .to_ascii_lowercase(),
        });

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host,
            port,
            token_secret,
            token_ttl,
            production,
            database_path,
            cors_origins,
            payments,
            log_format,
        })
    }
}

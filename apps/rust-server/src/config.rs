// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup. Secrets are
//! only ever supplied this way; nothing secret lives in source or is sent
//! over the wire.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RESPONSE_SECRET` | Secret the response envelope key is derived from (≥ 32 bytes) | Required |
//! | `JWT_SECRET` | HS256 secret for session tokens | Required |
//! | `SESSION_COOKIE` | Cookie carrying the session JWT | `token` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SEED_FILE` | JSON document used to seed the store | none |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | none |
//! | `TLS_KEY_PATH` | PEM private key | none |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::envelope::MIN_SECRET_LEN;

pub const RESPONSE_SECRET_ENV: &str = "RESPONSE_SECRET";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const SESSION_COOKIE_ENV: &str = "SESSION_COOKIE";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SEED_FILE_ENV: &str = "SEED_FILE";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_SESSION_COOKIE: &str = "token";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Everything the server needs at startup.
#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub response_secret: String,
    pub jwt_secret: String,
    pub session_cookie: String,
    pub seed_file: Option<PathBuf>,
    pub tls: Option<TlsPaths>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("response_secret", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("session_cookie", &self.session_cookie)
            .field("seed_file", &self.seed_file)
            .field("tls", &self.tls)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let response_secret = get(RESPONSE_SECRET_ENV).ok_or(ConfigError::Missing(RESPONSE_SECRET_ENV))?;
        if response_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: RESPONSE_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let jwt_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(port) => port.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: TLS_CERT_PATH_ENV,
                    reason: format!("{TLS_CERT_PATH_ENV} and {TLS_KEY_PATH_ENV} must be set together"),
                })
            }
        };

        Ok(Self {
            bind_addr,
            response_secret,
            jwt_secret,
            session_cookie: get(SESSION_COOKIE_ENV)
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
            seed_file: get(SEED_FILE_ENV).map(PathBuf::from),
            tls,
        })
    }
}

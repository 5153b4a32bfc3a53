// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. Token signing
//! material and validity windows are mandatory; everything else has a
//! sensible default.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APPLICATION_NAME` | Issuer string stamped into access tokens | `relational-identity-server` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TOKEN_ACCESS_VALIDITY_MINUTES` | Access token lifetime | Required, positive |
//! | `TOKEN_REFRESH_VALIDITY_MINUTES` | Refresh token lifetime (cache TTL) | Required, positive |
//! | `TOKEN_ACCESS_SECRET_KEY` | Base64 HMAC secret (symmetric mode) | One key mode required |
//! | `TOKEN_ACCESS_PRIVATE_KEY` | PKCS#8 PEM RSA private key (asymmetric mode) | One key mode required |
//! | `TOKEN_ACCESS_PUBLIC_KEY` | X.509 PEM RSA public key (asymmetric mode) | One key mode required |
//! | `UNSECURED_API_PATH_GET` | Comma-separated path globs open for GET | empty |
//! | `UNSECURED_API_PATH_POST` | Comma-separated path globs open for POST | empty |
//! | `UNSECURED_API_PATH_PUT` | Comma-separated path globs open for PUT | empty |
//! | `UNSECURED_API_PATH_SWAGGER_V3` | Expose swagger-ui without authentication | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable '{0}' is not set")]
    MissingVariable(&'static str),
    #[error("environment variable '{name}' is invalid: {reason}")]
    InvalidVariable { name: &'static str, reason: String },
    #[error("both symmetric and asymmetric token keys are configured; set exactly one")]
    AmbiguousKeyMaterial,
    #[error("no token signing material configured; set TOKEN_ACCESS_SECRET_KEY or the RSA key pair")]
    MissingKeyMaterial,
}

/// Token signing material. The mode, and with it the signing algorithm, is
/// locked for the lifetime of the process.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// Base64-encoded HMAC secret, signed and verified with HS256.
    Symmetric { secret_key: String },
    /// RSA key pair in PEM form (PKCS#8 private, X.509 public), RS512.
    /// The BEGIN/END markers may be omitted; bare Base64 bodies are
    /// re-wrapped before parsing.
    RsaKeyPair {
        private_key_pem: String,
        public_key_pem: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Issuer claim stamped into every minted access token.
    pub application_name: String,
    pub host: String,
    pub port: u16,
    pub access_token_validity_minutes: u64,
    pub refresh_token_validity_minutes: u64,
    pub key_material: KeyMaterial,
    pub unsecured_get_paths: Vec<String>,
    pub unsecured_post_paths: Vec<String>,
    pub unsecured_put_paths: Vec<String>,
    pub swagger_v3: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let application_name = env::var("APPLICATION_NAME")
            .unwrap_or_else(|_| "relational-identity-server".to_string());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = optional_parsed("PORT")?.unwrap_or(8080);

        let access_token_validity_minutes =
            required_positive("TOKEN_ACCESS_VALIDITY_MINUTES")?;
        let refresh_token_validity_minutes =
            required_positive("TOKEN_REFRESH_VALIDITY_MINUTES")?;

        let secret_key = non_blank(env::var("TOKEN_ACCESS_SECRET_KEY").ok());
        let private_key = non_blank(env::var("TOKEN_ACCESS_PRIVATE_KEY").ok());
        let public_key = non_blank(env::var("TOKEN_ACCESS_PUBLIC_KEY").ok());

        let key_material = match (secret_key, private_key, public_key) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(ConfigError::AmbiguousKeyMaterial)
            }
            (Some(secret_key), None, None) => KeyMaterial::Symmetric { secret_key },
            (None, Some(private_key_pem), Some(public_key_pem)) => KeyMaterial::RsaKeyPair {
                private_key_pem,
                public_key_pem,
            },
            (None, Some(_), None) => {
                return Err(ConfigError::InvalidVariable {
                    name: "TOKEN_ACCESS_PUBLIC_KEY",
                    reason: "private key configured without matching public key".to_string(),
                })
            }
            (None, None, Some(_)) => {
                return Err(ConfigError::InvalidVariable {
                    name: "TOKEN_ACCESS_PRIVATE_KEY",
                    reason: "public key configured without matching private key".to_string(),
                })
            }
            (None, None, None) => return Err(ConfigError::MissingKeyMaterial),
        };

        Ok(Self {
            application_name,
            host,
            port,
            access_token_validity_minutes,
            refresh_token_validity_minutes,
            key_material,
            unsecured_get_paths: path_list("UNSECURED_API_PATH_GET"),
            unsecured_post_paths: path_list("UNSECURED_API_PATH_POST"),
            unsecured_put_paths: path_list("UNSECURED_API_PATH_PUT"),
            swagger_v3: env::var("UNSECURED_API_PATH_SWAGGER_V3")
                .map(|value| value.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn path_list(name: &str) -> Vec<String> {
    env::var(name)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn optional_parsed<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidVariable {
                name,
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn required_positive(name: &'static str) -> Result<u64, ConfigError> {
    let raw = env::var(name).map_err(|_| ConfigError::MissingVariable(name))?;
    let value: u64 = raw.parse().map_err(|_| ConfigError::InvalidVariable {
        name,
        reason: format!("expected a positive integer, got '{raw}'"),
    })?;
    if value == 0 {
        return Err(ConfigError::InvalidVariable {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

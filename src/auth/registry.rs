// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Endpoint security registry.
//!
//! Built once at startup from the public-endpoint registrations in the
//! router plus any path globs from configuration. The authentication filter
//! consults it to decide whether a request may bypass token verification.
//!
//! Patterns use glob matching with literal separators: `*` spans a single
//! path segment, `**` spans any number of segments. Requests with methods
//! other than GET/POST/PUT are always secured.

use axum::http::Method;
use glob::{MatchOptions, Pattern};
use thiserror::Error;

use crate::config::Config;

/// Documentation paths opened up when swagger exposure is enabled. The bare
/// mount point is listed explicitly; `**` only matches below it.
const SWAGGER_V3_PATHS: &[&str] = &[
    "/swagger-ui",
    "/swagger-ui/",
    "/swagger-ui/**",
    "/api-docs/**",
];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid public endpoint pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
}

#[derive(Default)]
pub struct EndpointSecurityRegistry {
    get: Vec<Pattern>,
    post: Vec<Pattern>,
    put: Vec<Pattern>,
}

impl EndpointSecurityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the registry from configured path globs; swagger paths join the
    /// GET bucket when documentation exposure is enabled.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for path in &config.unsecured_get_paths {
            registry.permit(&Method::GET, path)?;
        }
        for path in &config.unsecured_post_paths {
            registry.permit(&Method::POST, path)?;
        }
        for path in &config.unsecured_put_paths {
            registry.permit(&Method::PUT, path)?;
        }
        if config.swagger_v3 {
            for path in SWAGGER_V3_PATHS {
                registry.permit(&Method::GET, path)?;
            }
        }
        Ok(registry)
    }

    /// Registers a public endpoint pattern under the method's bucket.
    /// Methods without a bucket stay secured and the registration is
    /// dropped with a warning.
    pub fn permit(&mut self, method: &Method, path: &str) -> Result<(), RegistryError> {
        let pattern = Pattern::new(path).map_err(|source| RegistryError::InvalidPattern {
            pattern: path.to_string(),
            source,
        })?;
        match *method {
            Method::GET => self.get.push(pattern),
            Method::POST => self.post.push(pattern),
            Method::PUT => self.put.push(pattern),
            _ => tracing::warn!(%method, path, "no public bucket for method; kept secured"),
        }
        Ok(())
    }

    /// True when the request targets an unsecured endpoint and may bypass
    /// the authentication filter.
    pub fn is_unsecured(&self, method: &Method, path: &str) -> bool {
        let bucket = match *method {
            Method::GET => &self.get,
            Method::POST => &self.post,
            Method::PUT => &self.put,
            _ => return false,
        };

        // `*` must not cross segment boundaries; `**` may.
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::default()
        };
        bucket
            .iter()
            .any(|pattern| pattern.matches_with(path, options))
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state handed to every handler and the authentication
//! filter. Construction wires the token codec, cache-backed services and the
//! endpoint security registry from a loaded [`Config`].

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::api::PUBLIC_ENDPOINTS;
use crate::auth::{
    AuthenticationService, CompromisedPasswordChecker, DenyListPasswordChecker,
    EndpointSecurityRegistry, RegistryError, RevocationService, TokenCodec, TokenError,
};
use crate::cache::{InMemoryTokenCache, TokenCache};
use crate::config::Config;
use crate::store::InMemoryStore;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub codec: Arc<TokenCodec>,
    pub cache: Arc<dyn TokenCache>,
    pub registry: Arc<EndpointSecurityRegistry>,
    pub authentication: Arc<AuthenticationService>,
    pub revocation: Arc<RevocationService>,
    pub password_checker: Arc<dyn CompromisedPasswordChecker>,
    /// Whether swagger-ui is mounted and its paths opened in the registry.
    pub swagger_enabled: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let codec = Arc::new(TokenCodec::new(
            &config.key_material,
            config.application_name.clone(),
            config.access_token_validity_minutes,
        )?);
        let cache: Arc<dyn TokenCache> = Arc::new(InMemoryTokenCache::new());
        let store = Arc::new(RwLock::new(InMemoryStore::new()));

        let mut registry = EndpointSecurityRegistry::from_config(config)?;
        for (method, path) in PUBLIC_ENDPOINTS {
            registry.permit(method, path)?;
        }

        let password_checker: Arc<dyn CompromisedPasswordChecker> =
            Arc::new(DenyListPasswordChecker);
        let refresh_validity = Duration::from_secs(config.refresh_token_validity_minutes * 60);
        let authentication = Arc::new(AuthenticationService::new(
            Arc::clone(&codec),
            Arc::clone(&cache),
            Arc::clone(&store),
            Arc::clone(&password_checker),
            refresh_validity,
        ));
        let revocation = Arc::new(RevocationService::new(
            Arc::clone(&codec),
            Arc::clone(&cache),
        ));

        Ok(Self {
            store,
            codec,
            cache,
            registry: Arc::new(registry),
            authentication,
            revocation,
            password_checker,
            swagger_enabled: config.swagger_v3,
        })
    }
}

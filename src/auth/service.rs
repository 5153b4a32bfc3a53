// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential login and refresh-token exchange.
//!
//! Login verifies the bcrypt password hash, mints an access token carrying
//! the scopes for the user's current status and stores a fresh opaque
//! refresh token in the cache for the configured refresh validity. Refresh
//! exchanges a live refresh token for a new access token; the refresh token
//! itself is not rotated and stays valid until its cache entry lapses.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::refresh;
use super::token::TokenCodec;
use crate::cache::TokenCache;
use crate::error::ApiError;
use crate::models::{TokenResponse, UserLoginRequest};
use crate::store::InMemoryStore;

pub const COMPROMISED_PASSWORD_MESSAGE: &str =
    "The provided password is compromised and must be changed";

pub struct AuthenticationService {
    codec: Arc<TokenCodec>,
    cache: Arc<dyn TokenCache>,
    store: Arc<RwLock<InMemoryStore>>,
    password_checker: Arc<dyn CompromisedPasswordChecker>,
    refresh_validity: Duration,
}

impl AuthenticationService {
    pub fn new(
        codec: Arc<TokenCodec>,
        cache: Arc<dyn TokenCache>,
        store: Arc<RwLock<InMemoryStore>>,
        password_checker: Arc<dyn CompromisedPasswordChecker>,
        refresh_validity: Duration,
    ) -> Self {
        Self {
            codec,
            cache,
            store,
            password_checker,
            refresh_validity,
        }
    }

    /// Exchanges credentials for a token pair. Unknown email and wrong
    /// password are indistinguishable to the caller; a correct but
    /// compromised password is called out explicitly so the user changes it.
    pub async fn login(
        &self,
        request: &UserLoginRequest,
        now: DateTime<Utc>,
    ) -> Result<TokenResponse, ApiError> {
        let user = {
            let store = self.store.read().await;
            store
                .user_by_email(&request.email_id)
                .ok_or(ApiError::InvalidCredentials)?
        };

        let password_matches = bcrypt::verify(&request.password, &user.password)
            .map_err(|e| ApiError::internal(format!("stored password hash unreadable: {e}")))?;
        if !password_matches {
            return Err(ApiError::InvalidCredentials);
        }
        if self.password_checker.is_compromised(&request.password) {
            return Err(ApiError::CompromisedPassword(
                COMPROMISED_PASSWORD_MESSAGE.to_string(),
            ));
        }

        let minted = self
            .codec
            .mint_access(user.id, user.status.scopes(), now)
            .map_err(|e| ApiError::internal(format!("access token minting failed: {e}")))?;

        let refresh_token = refresh::generate();
        self.cache
            .put(&refresh_token, &user.id.to_string(), self.refresh_validity)
            .await
            .map_err(|e| ApiError::internal(format!("refresh token storage failed: {e}")))?;

        tracing::info!(user_id = %user.id, jti = %minted.jti, "user logged in");
        Ok(TokenResponse {
            access_token: minted.token,
            refresh_token: Some(refresh_token),
        })
    }

    /// Exchanges a live refresh token for a fresh access token. Scopes are
    /// re-derived from the user's status at exchange time, so a status
    /// change takes effect on the next refresh.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenResponse, ApiError> {
        let user_id = match self.cache.get(refresh_token).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return Err(ApiError::TokenVerification),
            Err(e) => {
                tracing::warn!(error = %e, "refresh token cache unavailable; failing closed");
                return Err(ApiError::TokenVerification);
            }
        };
        let user_id = Uuid::parse_str(&user_id)
            .map_err(|e| ApiError::internal(format!("cached user id unparseable: {e}")))?;

        let user = {
            let store = self.store.read().await;
            store.user_by_id(user_id).map_err(|_| {
                tracing::warn!(%user_id, "refresh token maps to an unknown user");
                ApiError::TokenVerification
            })?
        };

        let minted = self
            .codec
            .mint_access(user.id, user.status.scopes(), now)
            .map_err(|e| ApiError::internal(format!("access token minting failed: {e}")))?;

        Ok(TokenResponse {
            access_token: minted.token,
            refresh_token: None,
        })
    }
}

/// Screens candidate passwords against known-compromised material at account
/// creation. Existing accounts are never re-screened.
pub trait CompromisedPasswordChecker: Send + Sync {
    fn is_compromised(&self, password: &str) -> bool;
}

/// Built-in deny-list checker covering the most common breached passwords.
/// Matching is case-insensitive: `PASSWORD` is as burnt as `password`.
#[derive(Default)]
pub struct DenyListPasswordChecker;

const COMPROMISED_PASSWORDS: &[&str] = &[
    "password", "password1", "passw0rd", "123456", "12345678", "123456789", "qwerty", "abc123",
    "letmein", "iloveyou", "admin", "welcome", "monkey", "dragon", "sunshine", "princess",
    "football", "baseball", "superman", "trustno1",
];

impl CompromisedPasswordChecker for DenyListPasswordChecker {
    fn is_compromised(&self, password: &str) -> bool {
        let lowered = password.to_lowercase();
        COMPROMISED_PASSWORDS
            .iter()
            .any(|known| *known == lowered)
    }
}

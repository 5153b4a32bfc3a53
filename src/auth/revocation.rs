// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access-token revocation.
//!
//! Revoking a token records its `jti` in the cache for exactly the token's
//! remaining lifetime. Once the entry lapses the token is expired anyway, so
//! the revocation list never grows beyond the set of live revoked tokens.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::token::TokenCodec;
use crate::cache::TokenCache;
use crate::error::ApiError;

pub struct RevocationService {
    codec: Arc<TokenCodec>,
    cache: Arc<dyn TokenCache>,
}

impl RevocationService {
    pub fn new(codec: Arc<TokenCodec>, cache: Arc<dyn TokenCache>) -> Self {
        Self { codec, cache }
    }

    /// Revokes the presented access token. Idempotent: revoking an already
    /// revoked token refreshes its marker, and a token past its expiry needs
    /// no marker at all.
    pub async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<(), ApiError> {
        let jti = self
            .codec
            .jti(token)
            .map_err(|_| ApiError::TokenVerification)?;
        let remaining = self
            .codec
            .ttl_remaining(token, now)
            .map_err(|_| ApiError::TokenVerification)?;

        if remaining <= Duration::zero() {
            tracing::debug!(%jti, "token already expired; skipping revocation marker");
            return Ok(());
        }

        let ttl = remaining
            .to_std()
            .map_err(|e| ApiError::internal(format!("residual token lifetime: {e}")))?;
        self.cache
            .put_marker(&jti, ttl)
            .await
            .map_err(|e| ApiError::internal(format!("revocation cache write failed: {e}")))?;
        tracing::info!(%jti, ttl_secs = ttl.as_secs(), "access token revoked");
        Ok(())
    }

    /// Whether the token's `jti` carries a live revocation marker. A cache
    /// failure reads as revoked, so an outage can never un-revoke a token.
    pub async fn is_revoked(&self, token: &str) -> Result<bool, ApiError> {
        let jti = self
            .codec
            .jti(token)
            .map_err(|_| ApiError::TokenVerification)?;
        match self.cache.exists(&jti).await {
            Ok(revoked) => Ok(revoked),
            Err(e) => {
                tracing::warn!(error = %e, "revocation cache unavailable; failing closed");
                Err(ApiError::TokenVerification)
            }
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped caller identity and the scope guard.
//!
//! The authentication filter binds a [`Principal`] into the request
//! extensions of every successfully authenticated request. Handlers receive
//! it through the extractor below; nothing about a caller ever lives in
//! process-global state, so concurrent requests cannot observe each other's
//! identity.

use std::collections::HashSet;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

/// Permission strings carried in the token's `scp` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Scope {
    #[serde(rename = "userprofile.read")]
    UserProfileRead,
    #[serde(rename = "userprofile.update")]
    UserProfileUpdate,
    #[serde(rename = "useridentity.verify")]
    UserIdentityVerify,
    #[serde(rename = "fullaccess")]
    FullAccess,
}

impl Scope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Scope::UserProfileRead => "userprofile.read",
            Scope::UserProfileUpdate => "userprofile.update",
            Scope::UserIdentityVerify => "useridentity.verify",
            Scope::FullAccess => "fullaccess",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the security registry classified the current request. Inserted by the
/// authentication filter so downstream extractors can tell a missing token on
/// a secured route (401) apart from a programming error on a public one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityDisposition {
    Public,
    Secured,
}

/// The authenticated caller: user id plus the scopes signed into the
/// presented token. Scope decisions use this set, never a fresh lookup.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub scopes: HashSet<String>,
}

impl Principal {
    pub fn new(user_id: Uuid, scopes: HashSet<String>) -> Self {
        Self { user_id, scopes }
    }

    /// Any-of check against the caller's granted scopes.
    pub fn has_any_scope(&self, required: &[Scope]) -> bool {
        required
            .iter()
            .any(|scope| self.scopes.contains(scope.as_str()))
    }

    /// Guard called at handler entry; rejects with 403 when the caller holds
    /// none of the required scopes.
    pub fn require_any_scope(&self, required: &[Scope]) -> Result<(), ApiError> {
        if self.has_any_scope(required) {
            Ok(())
        } else {
            Err(ApiError::AccessDenied)
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        // A public handler asking for a caller identity is a wiring bug, not
        // an authentication failure the client can fix.
        match parts.extensions.get::<SecurityDisposition>() {
            Some(SecurityDisposition::Public) => Err(ApiError::internal(
                "caller identity requested on a public endpoint with no bound principal",
            )),
            _ => Err(ApiError::TokenVerification),
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token-based authentication and authorization for the identity API.
//!
//! ## Request Flow
//!
//! 1. Client logs in with credentials and receives a signed JWT access token
//!    plus an opaque refresh token
//! 2. Client sends `Authorization: Bearer <access token>` on every call
//! 3. The [`filter::authentication_filter`] middleware:
//!    - skips verification for endpoints in the [`EndpointSecurityRegistry`]
//!    - verifies signature, issuer, claim shape and expiry
//!    - rejects tokens whose `jti` carries a live revocation marker
//!    - binds a [`Principal`] (user id + granted scopes) into the request
//! 4. Handlers enforce scopes via [`Principal::require_any_scope`]
//!
//! ## Security
//!
//! - The signing algorithm is locked at startup from the configured key
//!   material (HS256 symmetric or RS512 RSA)
//! - Revocation markers live exactly as long as the token they revoke
//! - Cache outages fail closed: an unverifiable token is a rejected token

pub mod filter;
pub mod principal;
pub mod refresh;
pub mod registry;
pub mod revocation;
pub mod service;
pub mod token;

pub use principal::{Principal, Scope, SecurityDisposition};
pub use registry::{EndpointSecurityRegistry, RegistryError};
pub use revocation::RevocationService;
pub use service::{AuthenticationService, CompromisedPasswordChecker, DenyListPasswordChecker};
pub use token::{AccessClaims, TokenCodec, TokenError, BEARER_PREFIX};

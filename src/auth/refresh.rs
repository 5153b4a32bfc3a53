// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Opaque refresh-token generation.
//!
//! A refresh token is the lowercase hex SHA-256 of a freshly drawn random
//! 128-bit identifier: 64 characters, no structure, no claims. It only means
//! something while the cache maps it to a user id.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generates a fresh opaque refresh token. The identifier comes from the
/// OS CSPRNG via UUIDv4, so collisions are negligible.
pub fn generate() -> String {
    let identifier = Uuid::new_v4().to_string();
    let digest = Sha256::digest(identifier.as_bytes());
    hex::encode(digest)
}

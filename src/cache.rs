// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared key-TTL cache backing token revocation and refresh-token storage.
//!
//! The cache holds two kinds of entries:
//!
//! - revoked access-token identifiers (`jti` → empty marker, TTL = residual
//!   token lifetime), and
//! - live refresh tokens (token → user id, TTL = refresh validity).
//!
//! The production deployment points this trait at an external store; the
//! in-memory implementation below provides the same visible semantics for
//! single-process deployments and tests: expired keys are invisible,
//! last-writer-wins on concurrent puts, no cross-key ordering.
//!
//! All operations are fallible so callers can fail closed on cache outage.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Upsert `key` → `value` expiring after `ttl`. A zero TTL is a no-op.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Upsert `key` with an empty value marker expiring after `ttl`.
    async fn put_marker(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-process [`TokenCache`] with second-granularity expiry.
///
/// Expired entries are purged lazily on write so reads stay cheap; reads
/// treat an expired-but-present entry as absent either way.
#[derive(Default)]
pub struct InMemoryTokenCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Ok(());
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        tracing::debug!(key, ttl_secs = ttl.as_secs(), "cached entry");
        Ok(())
    }

    async fn put_marker(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        self.put(key, "", ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = InMemoryTokenCache::new();
        cache
            .put("refresh-token", "user-id", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get("refresh-token").await.unwrap(),
            Some("user-id".to_string())
        );
        assert!(cache.exists("refresh-token").await.unwrap());
    }

    #[tokio::test]
    async fn marker_entries_exist_with_empty_value() {
        let cache = InMemoryTokenCache::new();
        cache
            .put_marker("some-jti", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.exists("some-jti").await.unwrap());
        assert_eq!(cache.get("some-jti").await.unwrap(), Some(String::new()));
    }

    #[tokio::test]
    async fn zero_ttl_put_is_a_noop() {
        let cache = InMemoryTokenCache::new();
        cache.put("key", "value", Duration::ZERO).await.unwrap();
        assert!(!cache.exists("key").await.unwrap());
    }

    #[tokio::test]
    async fn expired_entries_are_invisible() {
        let cache = InMemoryTokenCache::new();
        cache
            .put("key", "value", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;

        assert_eq!(cache.get("key").await.unwrap(), None);
        assert!(!cache.exists("key").await.unwrap());
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let cache = InMemoryTokenCache::new();
        cache
            .put("key", "first", Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put("key", "second", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("key").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn missing_key_reads_as_absent() {
        let cache = InMemoryTokenCache::new();
        assert_eq!(cache.get("missing").await.unwrap(), None);
        assert!(!cache.exists("missing").await.unwrap());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Identity Server - Authentication and User Identity Service
//!
//! This crate provides an HTTP identity backend issuing short-lived JWT
//! access tokens and opaque refresh tokens, with scope-based authorization
//! and explicit token revocation through a shared TTL cache.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token minting, verification, revocation and the request filter
//! - `cache` - Key-TTL cache behind revocation and refresh-token storage
//! - `store` - In-memory stand-in for the persistence layer

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;

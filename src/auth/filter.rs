// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware.
//!
//! Runs on every request before routing reaches a handler. Requests to
//! unsecured endpoints pass straight through. On secured endpoints a
//! presented bearer token is verified and checked against the revocation
//! list; success binds a [`Principal`] into the request extensions, any
//! failure answers 401 immediately. A secured request carrying no bearer
//! token is forwarded without a principal and rejected by the extractor
//! at the handler boundary instead.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use super::principal::{Principal, SecurityDisposition};
use super::token::BEARER_PREFIX;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn authentication_filter(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if state.registry.is_unsecured(&method, &path) {
        request.extensions_mut().insert(SecurityDisposition::Public);
        return next.run(request).await;
    }
    request
        .extensions_mut()
        .insert(SecurityDisposition::Secured);

    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.starts_with(BEARER_PREFIX))
        .map(str::to_string);

    let Some(token) = bearer else {
        // No credential offered; the Principal extractor answers 401 when
        // the handler needs one.
        return next.run(request).await;
    };

    let now = Utc::now();
    let claims = match state.codec.verify(&token, now) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(%method, path, error = %e, "bearer token rejected");
            return ApiError::TokenVerification.into_response();
        }
    };

    match state.revocation.is_revoked(&token).await {
        Ok(false) => {}
        Ok(true) => {
            tracing::debug!(%method, path, jti = %claims.jti, "revoked token presented");
            return ApiError::TokenVerification.into_response();
        }
        Err(e) => return e.into_response(),
    }

    let user_id = match claims.user_id() {
        Ok(user_id) => user_id,
        Err(_) => return ApiError::TokenVerification.into_response(),
    };

    request
        .extensions_mut()
        .insert(Principal::new(user_id, claims.scope_set()));
    next.run(request).await
}

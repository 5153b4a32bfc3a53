// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP router, OpenAPI document and shared extractors.
//!
//! Every route passes through the authentication filter; the endpoints in
//! [`PUBLIC_ENDPOINTS`] are exempted by the security registry rather than by
//! being mounted outside the middleware, so the registry stays the single
//! authority on what is public.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::Method,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::filter::authentication_filter,
    error::ApiError,
    models::{
        Currency, DepositAccountDetail, IdentityVerificationRequest, TokenResponse,
        TransactionDetail, TransactionRequest, TransactionType, UserCreationRequest,
        UserDetail, UserLoginRequest, UserStatus, UserUpdateRequest,
    },
    state::AppState,
};

pub mod auth;
pub mod deposit_accounts;
pub mod health;
pub mod identity;
pub mod users;

/// Endpoints reachable without a bearer token. Fed into the security
/// registry at startup alongside the configured path globs.
pub const PUBLIC_ENDPOINTS: &[(Method, &str)] = &[
    (Method::GET, "/health"),
    (Method::POST, "/auth/login"),
    (Method::PUT, "/auth/refresh"),
    (Method::POST, "/users"),
];

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", put(auth::refresh))
        .route(
            "/users",
            post(users::create_user)
                .get(users::get_user)
                .put(users::update_user),
        )
        .route("/users/deactivate", delete(users::deactivate_user))
        .route(
            "/users/identity-verification",
            post(identity::verify_identity),
        )
        .route(
            "/deposit-accounts",
            post(deposit_accounts::create_deposit_account)
                .get(deposit_accounts::get_deposit_account),
        )
        .route(
            "/deposit-accounts/transactions",
            post(deposit_accounts::process_transaction)
                .get(deposit_accounts::get_transactions),
        );

    // Documentation is only mounted when configured; the registry opens its
    // paths for GET at the same time.
    if state.swagger_enabled {
        app = app
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    app.layer(middleware::from_fn_with_state(
        state.clone(),
        authentication_filter,
    ))
    .with_state(state)
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::refresh,
        users::create_user,
        users::get_user,
        users::update_user,
        users::deactivate_user,
        identity::verify_identity,
        deposit_accounts::create_deposit_account,
        deposit_accounts::get_deposit_account,
        deposit_accounts::process_transaction,
        deposit_accounts::get_transactions
    ),
    components(
        schemas(
            health::HealthResponse,
            UserLoginRequest,
            TokenResponse,
            UserCreationRequest,
            UserUpdateRequest,
            UserDetail,
            UserStatus,
            IdentityVerificationRequest,
            DepositAccountDetail,
            TransactionRequest,
            TransactionDetail,
            TransactionType,
            Currency
        )
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Authentication", description = "Login, token refreshal and revocation"),
        (name = "Users", description = "Account registration and profile management"),
        (name = "Deposit Accounts", description = "Deposit account and transaction processing")
    )
)]
struct ApiDoc;

/// JSON extractor that funnels deserialization failures through the standard
/// error body instead of axum's plain-text rejection.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

fn map_json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::MalformedBody(rejection.body_text())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode};

use super::ValidJson;
use crate::{
    auth::{Principal, Scope},
    error::ApiError,
    models::{IdentityVerificationRequest, ResidentialAddress},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/users/identity-verification",
    request_body = IdentityVerificationRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Identity verified; account promoted to APPROVED"),
        (status = 400, description = "Request body failed validation"),
        (status = 401, description = "Token missing, invalid, revoked or expired"),
        (status = 403, description = "Caller lacks the required scope"),
        (status = 409, description = "Identity verification already completed")
    )
)]
pub async fn verify_identity(
    State(state): State<AppState>,
    principal: Principal,
    ValidJson(request): ValidJson<IdentityVerificationRequest>,
) -> Result<StatusCode, ApiError> {
    principal.require_any_scope(&[Scope::UserIdentityVerify])?;
    request.validate()?;

    let address = ResidentialAddress {
        user_id: principal.user_id,
        street_address: request.street_address,
        city: request.city,
        state: request.state,
        postal_code: request.postal_code,
    };

    let mut store = state.store.write().await;
    store.record_identity_verification(principal.user_id, request.date_of_birth, address)?;
    tracing::info!(user_id = %principal.user_id, "identity verified; user approved");
    Ok(StatusCode::OK)
}

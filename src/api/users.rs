// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;

use super::ValidJson;
use crate::{
    auth::service::COMPROMISED_PASSWORD_MESSAGE,
    auth::{Principal, Scope},
    error::ApiError,
    models::{UserCreationRequest, UserDetail, UserStatus, UserUpdateRequest},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/users",
    request_body = UserCreationRequest,
    tag = "Users",
    responses(
        (status = 201, description = "Account created in PENDING_APPROVAL status"),
        (status = 400, description = "Request body failed validation"),
        (status = 409, description = "Account with provided email-id already exists"),
        (status = 422, description = "Password is compromised and cannot be used")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UserCreationRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;
    if state.password_checker.is_compromised(&request.password) {
        return Err(ApiError::CompromisedPassword(
            COMPROMISED_PASSWORD_MESSAGE.to_string(),
        ));
    }

    let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))?;

    let mut store = state.store.write().await;
    let user = store.create_user(
        request.first_name,
        request.last_name,
        request.email_id,
        password_hash,
    )?;
    tracing::info!(user_id = %user.id, "user account created");
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, body = UserDetail),
        (status = 401, description = "Token missing, invalid, revoked or expired"),
        (status = 403, description = "Caller lacks the required scope")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<UserDetail>, ApiError> {
    principal.require_any_scope(&[Scope::UserProfileRead, Scope::FullAccess])?;

    let store = state.store.read().await;
    let user = store.user_by_id(principal.user_id)?;
    Ok(Json(UserDetail::from(&user)))
}

#[utoipa::path(
    put,
    path = "/users",
    request_body = UserUpdateRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 401, description = "Token missing, invalid, revoked or expired"),
        (status = 403, description = "Caller lacks the required scope")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    ValidJson(request): ValidJson<UserUpdateRequest>,
) -> Result<StatusCode, ApiError> {
    principal.require_any_scope(&[Scope::UserProfileUpdate, Scope::FullAccess])?;

    let mut store = state.store.write().await;
    store.update_user(principal.user_id, request)?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/users/deactivate",
    tag = "Users",
    responses(
        (status = 204, description = "Account deactivated and presented token revoked"),
        (status = 401, description = "Token missing, invalid, revoked or expired"),
        (status = 403, description = "Caller lacks the required scope")
    )
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    principal.require_any_scope(&[Scope::UserProfileUpdate, Scope::FullAccess])?;

    // The filter only binds a principal off a bearer header, so it is
    // present here; revoke it before the status flips.
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::TokenVerification)?;
    state.revocation.revoke(token, Utc::now()).await?;

    let mut store = state.store.write().await;
    store.set_user_status(principal.user_id, UserStatus::Deactivated)?;
    tracing::info!(user_id = %principal.user_id, "user account deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::test_state;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn creation_request() -> UserCreationRequest {
        UserCreationRequest {
            first_name: "Hardik".to_string(),
            last_name: Some("Behl".to_string()),
            email_id: "hardik.behl@example.com".to_string(),
            password: "correct-horse-battery".to_string(),
        }
    }

    fn principal_with(user_id: Uuid, scopes: &[Scope]) -> Principal {
        Principal::new(
            user_id,
            scopes
                .iter()
                .map(|scope| scope.as_str().to_string())
                .collect::<HashSet<String>>(),
        )
    }

    #[tokio::test]
    async fn create_user_stores_a_hashed_password() {
        let state = test_state();
        let status = create_user(State(state.clone()), ValidJson(creation_request()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let store = state.store.read().await;
        let user = store.user_by_email("hardik.behl@example.com").unwrap();
        assert_eq!(user.status, UserStatus::PendingApproval);
        assert_ne!(user.password, "correct-horse-battery");
        assert!(bcrypt::verify("correct-horse-battery", &user.password).unwrap());
    }

    #[tokio::test]
    async fn create_user_rejects_compromised_passwords() {
        let state = test_state();
        let mut request = creation_request();
        request.password = "password1".to_string();

        let err = create_user(State(state), ValidJson(request))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::CompromisedPassword(_)));
    }

    #[tokio::test]
    async fn create_user_conflicts_on_duplicate_email() {
        let state = test_state();
        create_user(State(state.clone()), ValidJson(creation_request()))
            .await
            .unwrap();

        let err = create_user(State(state), ValidJson(creation_request()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AccountAlreadyExists(_)));
    }

    #[tokio::test]
    async fn get_user_requires_a_read_scope() {
        let state = test_state();
        let user_id = {
            let mut store = state.store.write().await;
            store
                .create_user(
                    "Hardik".to_string(),
                    None,
                    "hardik.behl@example.com".to_string(),
                    "$2a$04$notarealhashbutlongenough".to_string(),
                )
                .unwrap()
                .id
        };

        let err = get_user(
            State(state.clone()),
            principal_with(user_id, &[Scope::UserIdentityVerify]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::AccessDenied));

        let Json(detail) = get_user(
            State(state),
            principal_with(user_id, &[Scope::UserProfileRead]),
        )
        .await
        .unwrap();
        assert_eq!(detail.email_id, "hardik.behl@example.com");
        assert_eq!(detail.status, "Pending Approval");
    }

    #[tokio::test]
    async fn update_user_patches_only_supplied_fields() {
        let state = test_state();
        let user_id = {
            let mut store = state.store.write().await;
            store
                .create_user(
                    "Hardik".to_string(),
                    Some("Behl".to_string()),
                    "hardik.behl@example.com".to_string(),
                    "$2a$04$notarealhashbutlongenough".to_string(),
                )
                .unwrap()
                .id
        };

        let status = update_user(
            State(state.clone()),
            principal_with(user_id, &[Scope::UserProfileUpdate]),
            ValidJson(UserUpdateRequest {
                first_name: Some("Hardikk".to_string()),
                last_name: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::OK);

        let store = state.store.read().await;
        let user = store.user_by_id(user_id).unwrap();
        assert_eq!(user.first_name, "Hardikk");
        assert_eq!(user.last_name, Some("Behl".to_string()));
    }
}

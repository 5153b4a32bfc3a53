// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;

use super::ValidJson;
use crate::{
    error::ApiError,
    models::{TokenResponse, UserLoginRequest},
    state::AppState,
};

/// Header carrying the opaque refresh token on token refreshal.
pub const REFRESH_TOKEN_HEADER: &str = "X-Refresh-Token";

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = UserLoginRequest,
    tag = "Authentication",
    responses(
        (status = 200, body = TokenResponse),
        (status = 400, description = "Request body failed validation"),
        (status = 401, description = "Invalid login credentials provided"),
        (status = 422, description = "Password is compromised and must be changed")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UserLoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    request.validate()?;
    let response = state.authentication.login(&request, Utc::now()).await?;
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/auth/refresh",
    params(
        ("X-Refresh-Token" = String, Header, description = "Opaque refresh token issued at login")
    ),
    tag = "Authentication",
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, description = "Refresh token missing, unknown or expired")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let refresh_token = headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::TokenVerification)?;

    let response = state
        .authentication
        .refresh(refresh_token, Utc::now())
        .await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::test_state;

    async fn seeded_login(state: &AppState) -> TokenResponse {
        {
            let mut store = state.store.write().await;
            let hash = bcrypt::hash("correct-horse-battery", 4).unwrap();
            store
                .create_user(
                    "Hardik".to_string(),
                    None,
                    "hardik.behl@example.com".to_string(),
                    hash,
                )
                .unwrap();
        }
        let Json(response) = login(
            State(state.clone()),
            ValidJson(UserLoginRequest {
                email_id: "hardik.behl@example.com".to_string(),
                password: "correct-horse-battery".to_string(),
            }),
        )
        .await
        .expect("login succeeds");
        response
    }

    #[tokio::test]
    async fn login_returns_token_pair() {
        let state = test_state();
        let response = seeded_login(&state).await;

        assert_eq!(response.access_token.matches('.').count(), 2);
        assert_eq!(response.refresh_token.unwrap().len(), 64);
    }

    #[tokio::test]
    async fn login_rejects_invalid_body_fields() {
        let state = test_state();
        let err = login(
            State(state),
            ValidJson(UserLoginRequest {
                email_id: "not-an-email".to_string(),
                password: String::new(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn refresh_requires_the_header() {
        let state = test_state();
        let err = refresh(State(state), HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::TokenVerification));
    }

    #[tokio::test]
    async fn refresh_exchanges_header_for_access_token() {
        let state = test_state();
        let login_response = seeded_login(&state).await;

        let mut headers = HeaderMap::new();
        headers.insert(
            REFRESH_TOKEN_HEADER,
            login_response.refresh_token.unwrap().parse().unwrap(),
        );
        let Json(refreshed) = refresh(State(state), headers).await.unwrap();

        assert!(refreshed.refresh_token.is_none());
        assert_eq!(refreshed.access_token.matches('.').count(), 2);
    }
}

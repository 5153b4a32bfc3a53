// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;

use relational_identity_server::{
    api::router,
    config::{Config, KeyMaterial},
    state::AppState,
};

const EMAIL: &str = "hardik.behl@example.com";
const PASSWORD: &str = "correct-horse-battery";

const TOKEN_FAILURE_MESSAGE: &str =
    "Authentication failure: Token missing, invalid, revoked or expired";
const ACCESS_DENIED_MESSAGE: &str =
    "Access Denied: You do not have sufficient privileges to access this resource.";

fn test_config() -> Config {
    Config {
        application_name: "relational-identity-server".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        access_token_validity_minutes: 30,
        refresh_token_validity_minutes: 120,
        key_material: KeyMaterial::Symmetric {
            secret_key: BASE64_STANDARD.encode(b"an-integration-test-signing-secret"),
        },
        unsecured_get_paths: vec![],
        unsecured_post_paths: vec![],
        unsecured_put_paths: vec![],
        swagger_v3: false,
    }
}

fn create_test_app() -> (Router, AppState) {
    let state = AppState::from_config(&test_config()).expect("Failed to build application state");
    (router(state.clone()), state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn register(app: &Router) {
    register_as(app, "Hardik", EMAIL).await;
}

async fn register_as(app: &Router, first_name: &str, email: &str) {
    let (status, _) = send(
        app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "FirstName": first_name,
            "LastName": "Behl",
            "EmailId": email,
            "Password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn login(app: &Router) -> (String, String) {
    login_as(app, EMAIL).await
}

async fn login_as(app: &Router, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"EmailId": email, "Password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["AccessToken"].as_str().unwrap().to_string(),
        body["RefreshToken"].as_str().unwrap().to_string(),
    )
}

async fn verify_identity(app: &Router, access_token: &str) {
    let (status, _) = send(
        app,
        Method::POST,
        "/users/identity-verification",
        Some(access_token),
        Some(json!({
            "DateOfBirth": "1995-06-15",
            "StreetAddress": "12/3A Main Street",
            "City": "New Delhi",
            "State": "Delhi",
            "PostalCode": "110001",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// --- Health ---

#[tokio::test]
async fn health_check_needs_no_token() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// --- Registration and login ---

#[tokio::test]
async fn register_login_and_read_profile() {
    let (app, _) = create_test_app();
    register(&app).await;
    let (access_token, refresh_token) = login(&app).await;

    // Token shapes: JWT with three segments, refresh token 64 hex chars.
    assert_eq!(access_token.matches('.').count(), 2);
    assert_eq!(refresh_token.len(), 64);
    assert!(refresh_token
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));

    let (status, body) = send(&app, Method::GET, "/users", Some(&access_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["EmailId"], EMAIL);
    assert_eq!(body["Status"], "Pending Approval");
}

#[tokio::test]
async fn wrong_password_is_unauthorized_with_stable_body() {
    let (app, _) = create_test_app();
    register(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"EmailId": EMAIL, "Password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["Status"], "401 UNAUTHORIZED");
    assert_eq!(body["Description"], "Invalid login credentials provided");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (app, _) = create_test_app();
    register(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "FirstName": "Other",
            "EmailId": EMAIL,
            "Password": "another-fine-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["Status"], "409 CONFLICT");
}

#[tokio::test]
async fn compromised_password_is_unprocessable_at_registration() {
    let (app, _) = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "FirstName": "Hardik",
            "EmailId": EMAIL,
            "Password": "password1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["Status"], "422 UNPROCESSABLE_ENTITY");
}

#[tokio::test]
async fn validation_failures_list_every_field() {
    let (app, _) = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({"FirstName": "", "EmailId": "nope", "Password": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Description"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let (app, _) = create_test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// --- Refresh ---

#[tokio::test]
async fn refresh_exchanges_for_a_new_access_token() {
    let (app, state) = create_test_app();
    register(&app).await;
    let (_, refresh_token) = login(&app).await;

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/auth/refresh")
        .header("X-Refresh-Token", &refresh_token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body.get("RefreshToken").is_none());

    let access_token = body["AccessToken"].as_str().unwrap();
    let claims = state.codec.verify(access_token, chrono::Utc::now()).unwrap();
    assert!(claims
        .scope_set()
        .contains(relational_identity_server::auth::Scope::UserProfileRead.as_str()));

    // The fresh access token works against a secured endpoint.
    let (status, _) = send(&app, Method::GET, "/users", Some(access_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_refresh_token_is_unauthorized() {
    let (app, _) = create_test_app();

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/auth/refresh")
        .header("X-Refresh-Token", "0".repeat(64))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["Status"], "401 UNAUTHORIZED");
    assert_eq!(body["Description"], TOKEN_FAILURE_MESSAGE);
}

// --- Token verification on secured endpoints ---

#[tokio::test]
async fn missing_token_on_secured_endpoint_is_unauthorized() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["Description"], TOKEN_FAILURE_MESSAGE);
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let (app, _) = create_test_app();
    register(&app).await;
    let (access_token, _) = login(&app).await;

    let mut tampered = access_token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'a' { 'b' } else { 'a' });

    let (status, body) = send(&app, Method::GET, "/users", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["Description"], TOKEN_FAILURE_MESSAGE);
}

#[tokio::test]
async fn tampered_token_does_not_block_public_endpoints() {
    let (app, _) = create_test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "FirstName": "Hardik",
                "EmailId": EMAIL,
                "Password": PASSWORD,
            })
            .to_string(),
        ))
        .unwrap();

    // Public endpoints bypass verification entirely, so the garbage header
    // is ignored rather than rejected.
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

// --- Authorization ---

#[tokio::test]
async fn pending_user_cannot_reach_deposit_accounts() {
    let (app, _) = create_test_app();
    register(&app).await;
    let (access_token, _) = login(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/deposit-accounts",
        Some(&access_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["Status"], "403 FORBIDDEN");
    assert_eq!(body["Description"], ACCESS_DENIED_MESSAGE);
}

#[tokio::test]
async fn scopes_are_frozen_into_the_token_at_mint_time() {
    let (app, _) = create_test_app();
    register(&app).await;
    let (pending_token, refresh_token) = login(&app).await;

    verify_identity(&app, &pending_token).await;

    // The already-issued token still carries only the pending scopes.
    let (status, _) = send(
        &app,
        Method::GET,
        "/deposit-accounts",
        Some(&pending_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A refreshed token picks up the new status and its fullaccess scope.
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/auth/refresh")
        .header("X-Refresh-Token", &refresh_token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let approved_token = body["AccessToken"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/deposit-accounts",
        Some(&approved_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// --- Full account journey ---

#[tokio::test]
async fn verified_user_transacts_against_their_account() {
    let (app, _) = create_test_app();
    register(&app).await;
    let (pending_token, _) = login(&app).await;
    verify_identity(&app, &pending_token).await;
    let (access_token, _) = login(&app).await;

    let (status, account) = send(
        &app,
        Method::POST,
        "/deposit-accounts",
        Some(&access_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account["Balance"], 0.0);

    let (status, _) = send(
        &app,
        Method::POST,
        "/deposit-accounts/transactions",
        Some(&access_token),
        Some(json!({"Amount": 500.0, "Currency": "USD", "Type": "DEPOSIT"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/deposit-accounts/transactions",
        Some(&access_token),
        Some(json!({"Amount": 9000.0, "Currency": "USD", "Type": "WITHDRAW"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["Status"], "422 UNPROCESSABLE_ENTITY");

    let (status, body) = send(
        &app,
        Method::GET,
        "/deposit-accounts",
        Some(&access_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Balance"], 500.0);

    let (status, transactions) = send(
        &app,
        Method::GET,
        "/deposit-accounts/transactions",
        Some(&access_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transactions.as_array().unwrap().len(), 1);
}

// --- Deactivation and revocation ---

#[tokio::test]
async fn deactivation_revokes_the_presented_token() {
    let (app, _) = create_test_app();
    register(&app).await;
    let (access_token, _) = login(&app).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/users/deactivate",
        Some(&access_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The revoked token is dead even though its expiry lies in the future.
    let (status, body) = send(&app, Method::GET, "/users", Some(&access_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["Description"], TOKEN_FAILURE_MESSAGE);

    // A fresh login still works, but the deactivated account holds no
    // scopes, so every secured endpoint answers 403.
    let (deactivated_token, _) = login(&app).await;
    let (status, body) = send(&app, Method::GET, "/users", Some(&deactivated_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["Description"], ACCESS_DENIED_MESSAGE);
}

#[tokio::test]
async fn other_sessions_survive_a_single_token_revocation() {
    let (app, _) = create_test_app();
    register(&app).await;
    let (first_token, _) = login(&app).await;
    let (second_token, _) = login(&app).await;

    // Deactivation revokes only the presented token. The second token keeps
    // the scopes frozen into it at mint time and stays usable until expiry.
    let (status, _) = send(
        &app,
        Method::DELETE,
        "/users/deactivate",
        Some(&first_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (first_status, _) = send(&app, Method::GET, "/users", Some(&first_token), None).await;
    assert_eq!(first_status, StatusCode::UNAUTHORIZED);

    let (second_status, _) = send(&app, Method::GET, "/users", Some(&second_token), None).await;
    assert_eq!(second_status, StatusCode::OK);
}

// --- Principal isolation ---

#[tokio::test]
async fn concurrent_requests_see_their_own_principal() {
    let (app, _) = create_test_app();
    register_as(&app, "Hardik", "hardik.behl@example.com").await;
    register_as(&app, "Aanya", "aanya.mehra@example.com").await;

    let (first_token, _) = login_as(&app, "hardik.behl@example.com").await;
    let (second_token, _) = login_as(&app, "aanya.mehra@example.com").await;

    // Both profile reads run in flight at the same time; each response must
    // reflect its own bearer, not whichever principal was bound last.
    let (first, second) = tokio::join!(
        send(&app, Method::GET, "/users", Some(&first_token), None),
        send(&app, Method::GET, "/users", Some(&second_token), None),
    );

    let (first_status, first_body) = first;
    let (second_status, second_body) = second;
    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first_body["EmailId"], "hardik.behl@example.com");
    assert_eq!(first_body["FirstName"], "Hardik");
    assert_eq!(second_body["EmailId"], "aanya.mehra@example.com");
    assert_eq!(second_body["FirstName"], "Aanya");
}

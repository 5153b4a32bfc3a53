// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API error taxonomy.
//!
//! Every failure surfaced to a client is funneled through [`ApiError`] so
//! the response body always has the same shape:
//!
//! ```json
//! {"Status": "401 UNAUTHORIZED", "Description": "..."}
//! ```
//!
//! `Description` is a single string, except for request validation failures
//! where it is an array of per-field messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const TOKEN_VERIFICATION_FAILURE_MESSAGE: &str =
    "Authentication failure: Token missing, invalid, revoked or expired";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid login credentials provided";
pub const ACCESS_DENIED_MESSAGE: &str =
    "Access Denied: You do not have sufficient privileges to access this resource.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong.";

#[derive(Debug)]
pub enum ApiError {
    /// Bearer token missing, invalid, revoked or expired (401).
    TokenVerification,
    /// Unknown email or wrong password; both cases share one message (401).
    InvalidCredentials,
    /// Authenticated caller lacks every required scope (403).
    AccessDenied,
    /// Unique-constraint style conflicts, e.g. email already registered (409).
    AccountAlreadyExists(String),
    /// Password found in the compromised-password list (422).
    CompromisedPassword(String),
    /// Request body failed field validation (400, one message per field).
    ValidationFailed(Vec<String>),
    /// Request body could not be deserialized at all (400).
    MalformedBody(String),
    /// Referenced entity does not exist (404).
    NotFound(String),
    /// Withdrawal exceeding the account balance (422).
    InsufficientBalance,
    /// Programming errors and misconfiguration. The detail is logged, never
    /// sent to the client.
    Internal(String),
}

#[derive(Serialize)]
#[serde(untagged)]
enum Description {
    Single(String),
    Many(Vec<String>),
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    status: String,
    description: Description,
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        ApiError::Internal(detail.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::TokenVerification | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::AccessDenied => StatusCode::FORBIDDEN,
            ApiError::AccountAlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::CompromisedPassword(_) | ApiError::InsufficientBalance => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::ValidationFailed(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// Status line in `<code> <REASON>` form, e.g. `422 UNPROCESSABLE_ENTITY`.
    fn status_line(&self) -> String {
        let status = self.status_code();
        let reason = status
            .canonical_reason()
            .unwrap_or("UNKNOWN")
            .to_uppercase()
            .replace(' ', "_");
        format!("{} {}", status.as_u16(), reason)
    }

    fn description(&self) -> Description {
        match self {
            ApiError::TokenVerification => {
                Description::Single(TOKEN_VERIFICATION_FAILURE_MESSAGE.to_string())
            }
            ApiError::InvalidCredentials => {
                Description::Single(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            ApiError::AccessDenied => Description::Single(ACCESS_DENIED_MESSAGE.to_string()),
            ApiError::AccountAlreadyExists(message)
            | ApiError::CompromisedPassword(message)
            | ApiError::MalformedBody(message)
            | ApiError::NotFound(message) => Description::Single(message.clone()),
            ApiError::ValidationFailed(messages) => Description::Many(messages.clone()),
            ApiError::InsufficientBalance => Description::Single(
                "Insufficient balance in deposit account to process transaction".to_string(),
            ),
            ApiError::Internal(_) => Description::Single(INTERNAL_ERROR_MESSAGE.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.description() {
            Description::Single(message) => write!(f, "{message}"),
            Description::Many(messages) => write!(f, "{}", messages.join(", ")),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(%detail, "internal error surfaced to client");
        }
        let body = Json(ErrorBody {
            status: self.status_line(),
            description: self.description(),
        });
        (self.status_code(), body).into_response()
    }
}

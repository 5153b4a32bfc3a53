// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Entities and API Data Models
//!
//! Wire DTOs use PascalCase JSON keys (`EmailId`, `AccessToken`, ...) and
//! derive `ToSchema` for OpenAPI documentation. Domain entities live in the
//! [`crate::store::InMemoryStore`]; persistence proper is an external
//! collaborator and the in-memory store is its stand-in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Scope;
use crate::error::ApiError;

// =============================================================================
// User
// =============================================================================

/// Lifecycle status of a user account. The status decides which scopes are
/// stamped into access tokens minted for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    PendingApproval,
    Approved,
    Deactivated,
}

impl UserStatus {
    /// Scopes granted to tokens minted while the user holds this status.
    /// Scopes are frozen into the token at mint time; a later status change
    /// does not alter already-issued tokens.
    pub fn scopes(&self) -> &'static [Scope] {
        match self {
            UserStatus::PendingApproval => &[
                Scope::UserProfileRead,
                Scope::UserProfileUpdate,
                Scope::UserIdentityVerify,
            ],
            UserStatus::Approved => &[Scope::FullAccess],
            UserStatus::Deactivated => &[],
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::PendingApproval => write!(f, "Pending Approval"),
            UserStatus::Approved => write!(f, "Approved"),
            UserStatus::Deactivated => write!(f, "Deactivated"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email_id: String,
    /// Bcrypt hash, never the plain text.
    pub password: String,
    pub status: UserStatus,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Residential address captured during identity verification.
#[derive(Debug, Clone)]
pub struct ResidentialAddress {
    pub user_id: Uuid,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

// =============================================================================
// Deposit Account
// =============================================================================

#[derive(Debug, Clone)]
pub struct DepositAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Deposit,
    Withdraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_type: TransactionType,
    pub currency: Currency,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Authentication DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UserLoginRequest {
    pub email_id: String,
    pub password: String,
}

impl UserLoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        validate_email(&self.email_id, &mut errors);
        if self.password.trim().is_empty() {
            errors.push("password must not be empty".to_string());
        }
        collect(errors)
    }
}

/// Token pair returned on login; refresh is absent on token refreshal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

// =============================================================================
// User DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UserCreationRequest {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email_id: String,
    pub password: String,
}

impl UserCreationRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push("first-name must not be empty".to_string());
        }
        validate_email(&self.email_id, &mut errors);
        if self.password.trim().is_empty() {
            errors.push("password must not be empty".to_string());
        }
        collect(errors)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UserUpdateRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UserDetail {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDetail {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email_id: user.email_id.clone(),
            status: user.status.to_string(),
            date_of_birth: user.date_of_birth,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityVerificationRequest {
    /// Date of birth in `YYYY-MM-DD` format; must lie in the past.
    pub date_of_birth: NaiveDate,
    pub street_address: String,
    pub city: String,
    pub state: String,
    /// 6-digit postal code.
    pub postal_code: String,
}

impl IdentityVerificationRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.date_of_birth >= Utc::now().date_naive() {
            errors.push("Date of birth must be in the past".to_string());
        }
        if self.street_address.trim().is_empty() {
            errors.push("Street address must not be empty".to_string());
        }
        if self.city.trim().is_empty() {
            errors.push("City must not be empty".to_string());
        }
        if self.state.trim().is_empty() {
            errors.push("State must not be empty".to_string());
        }
        if self.postal_code.len() != 6 || !self.postal_code.bytes().all(|b| b.is_ascii_digit()) {
            errors.push("Postal code must be a 6-digit number".to_string());
        }
        collect(errors)
    }
}

// =============================================================================
// Deposit Account DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionRequest {
    pub amount: f64,
    pub currency: Currency,
    #[serde(rename = "Type")]
    pub transaction_type: TransactionType,
}

impl TransactionRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.amount < 0.01 {
            errors.push("Amount must be greater than or equal to 0.01".to_string());
        }
        collect(errors)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DepositAccountDetail {
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionDetail {
    pub amount: f64,
    pub currency: Currency,
    #[serde(rename = "Type")]
    pub transaction_type: TransactionType,
    pub timestamp: DateTime<Utc>,
}

impl From<&Transaction> for TransactionDetail {
    fn from(transaction: &Transaction) -> Self {
        Self {
            amount: transaction.amount,
            currency: transaction.currency,
            transaction_type: transaction.transaction_type,
            timestamp: transaction.timestamp,
        }
    }
}

fn validate_email(email_id: &str, errors: &mut Vec<String>) {
    if email_id.trim().is_empty() {
        errors.push("email-id must not be empty".to_string());
    } else if !is_plausible_email(email_id) {
        errors.push("email-id must be of valid format".to_string());
    }
}

fn is_plausible_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn collect(errors: Vec<String>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationFailed(errors))
    }
}

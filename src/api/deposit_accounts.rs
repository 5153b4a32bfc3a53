// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use super::ValidJson;
use crate::{
    auth::{Principal, Scope},
    error::ApiError,
    models::{DepositAccountDetail, TransactionDetail, TransactionRequest},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/deposit-accounts",
    tag = "Deposit Accounts",
    responses(
        (status = 201, body = DepositAccountDetail),
        (status = 401, description = "Token missing, invalid, revoked or expired"),
        (status = 403, description = "Caller lacks the required scope"),
        (status = 409, description = "Deposit account already exists for user")
    )
)]
pub async fn create_deposit_account(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<(StatusCode, Json<DepositAccountDetail>), ApiError> {
    principal.require_any_scope(&[Scope::FullAccess])?;

    let mut store = state.store.write().await;
    let account = store.create_deposit_account(principal.user_id)?;
    tracing::info!(user_id = %principal.user_id, account_id = %account.id, "deposit account opened");
    Ok((
        StatusCode::CREATED,
        Json(DepositAccountDetail {
            balance: account.balance,
            created_at: account.created_at,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/deposit-accounts",
    tag = "Deposit Accounts",
    responses(
        (status = 200, body = DepositAccountDetail),
        (status = 401, description = "Token missing, invalid, revoked or expired"),
        (status = 403, description = "Caller lacks the required scope"),
        (status = 404, description = "Deposit account not found")
    )
)]
pub async fn get_deposit_account(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<DepositAccountDetail>, ApiError> {
    principal.require_any_scope(&[Scope::FullAccess])?;

    let store = state.store.read().await;
    let account = store.deposit_account_by_user(principal.user_id)?;
    Ok(Json(DepositAccountDetail {
        balance: account.balance,
        created_at: account.created_at,
    }))
}

#[utoipa::path(
    post,
    path = "/deposit-accounts/transactions",
    request_body = TransactionRequest,
    tag = "Deposit Accounts",
    responses(
        (status = 201, body = TransactionDetail),
        (status = 400, description = "Request body failed validation"),
        (status = 401, description = "Token missing, invalid, revoked or expired"),
        (status = 403, description = "Caller lacks the required scope"),
        (status = 404, description = "Deposit account not found"),
        (status = 422, description = "Insufficient balance to process withdrawal")
    )
)]
pub async fn process_transaction(
    State(state): State<AppState>,
    principal: Principal,
    ValidJson(request): ValidJson<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionDetail>), ApiError> {
    principal.require_any_scope(&[Scope::FullAccess])?;
    request.validate()?;

    let mut store = state.store.write().await;
    let transaction = store.process_transaction(principal.user_id, &request)?;
    Ok((StatusCode::CREATED, Json(TransactionDetail::from(&transaction))))
}

#[utoipa::path(
    get,
    path = "/deposit-accounts/transactions",
    tag = "Deposit Accounts",
    responses(
        (status = 200, body = [TransactionDetail]),
        (status = 401, description = "Token missing, invalid, revoked or expired"),
        (status = 403, description = "Caller lacks the required scope"),
        (status = 404, description = "Deposit account not found")
    )
)]
pub async fn get_transactions(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<TransactionDetail>>, ApiError> {
    principal.require_any_scope(&[Scope::FullAccess])?;

    let store = state.store.read().await;
    let transactions = store.transactions_for_user(principal.user_id)?;
    Ok(Json(
        transactions.iter().map(TransactionDetail::from).collect(),
    ))
}

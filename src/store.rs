// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store for users, addresses, deposit accounts and transactions.
//!
//! Persistence proper is an external collaborator; this store stands in for
//! it behind the same operations. All mutation goes through `&mut self`, so
//! the [`crate::state::AppState`] lock provides the only synchronization the
//! store needs.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    DepositAccount, ResidentialAddress, Transaction, TransactionRequest, TransactionType, User,
    UserStatus, UserUpdateRequest,
};

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<Uuid, User>,
    addresses: HashMap<Uuid, ResidentialAddress>,
    deposit_accounts: HashMap<Uuid, DepositAccount>,
    transactions: Vec<Transaction>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new user in `PENDING_APPROVAL` status. The email id is a
    /// unique key; `password_hash` must already be a bcrypt hash.
    pub fn create_user(
        &mut self,
        first_name: String,
        last_name: Option<String>,
        email_id: String,
        password_hash: String,
    ) -> Result<User, ApiError> {
        if self
            .users
            .values()
            .any(|user| user.email_id.eq_ignore_ascii_case(&email_id))
        {
            return Err(ApiError::AccountAlreadyExists(
                "Account with provided email-id already exists".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email_id,
            password: password_hash,
            status: UserStatus::PendingApproval,
            date_of_birth: None,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn user_by_email(&self, email_id: &str) -> Option<User> {
        self.users
            .values()
            .find(|user| user.email_id.eq_ignore_ascii_case(email_id))
            .cloned()
    }

    pub fn user_by_id(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Partial profile update; absent fields keep their current value.
    pub fn update_user(
        &mut self,
        user_id: Uuid,
        request: UserUpdateRequest,
    ) -> Result<User, ApiError> {
        let Some(user) = self.users.get_mut(&user_id) else {
            return Err(ApiError::NotFound("User not found".to_string()));
        };

        if let Some(first_name) = request.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            user.last_name = Some(last_name);
        }
        Ok(user.clone())
    }

    pub fn set_user_status(&mut self, user_id: Uuid, status: UserStatus) -> Result<(), ApiError> {
        let Some(user) = self.users.get_mut(&user_id) else {
            return Err(ApiError::NotFound("User not found".to_string()));
        };
        user.status = status;
        Ok(())
    }

    /// Completes identity verification for a pending user: records the date
    /// of birth and address and promotes the account to `APPROVED`.
    pub fn record_identity_verification(
        &mut self,
        user_id: Uuid,
        date_of_birth: NaiveDate,
        address: ResidentialAddress,
    ) -> Result<(), ApiError> {
        let Some(user) = self.users.get_mut(&user_id) else {
            return Err(ApiError::NotFound("User not found".to_string()));
        };
        if user.status != UserStatus::PendingApproval {
            return Err(ApiError::AccountAlreadyExists(
                "Identity verification has already been completed".to_string(),
            ));
        }

        user.date_of_birth = Some(date_of_birth);
        user.status = UserStatus::Approved;
        self.addresses.insert(user_id, address);
        Ok(())
    }

    /// Opens the caller's deposit account with a zero balance. Each user
    /// holds at most one account.
    pub fn create_deposit_account(&mut self, user_id: Uuid) -> Result<DepositAccount, ApiError> {
        if !self.users.contains_key(&user_id) {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
        if self.deposit_accounts.contains_key(&user_id) {
            return Err(ApiError::AccountAlreadyExists(
                "Deposit account already exists for user".to_string(),
            ));
        }

        let account = DepositAccount {
            id: Uuid::new_v4(),
            user_id,
            balance: 0.0,
            created_at: Utc::now(),
        };
        self.deposit_accounts.insert(user_id, account.clone());
        Ok(account)
    }

    pub fn deposit_account_by_user(&self, user_id: Uuid) -> Result<DepositAccount, ApiError> {
        self.deposit_accounts
            .get(&user_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Deposit account not found".to_string()))
    }

    /// Applies a deposit or withdrawal against the caller's account.
    /// Withdrawals beyond the current balance are rejected without mutating
    /// anything.
    pub fn process_transaction(
        &mut self,
        user_id: Uuid,
        request: &TransactionRequest,
    ) -> Result<Transaction, ApiError> {
        let Some(account) = self.deposit_accounts.get_mut(&user_id) else {
            return Err(ApiError::NotFound("Deposit account not found".to_string()));
        };

        match request.transaction_type {
            TransactionType::Deposit => account.balance += request.amount,
            TransactionType::Withdraw => {
                if request.amount > account.balance {
                    return Err(ApiError::InsufficientBalance);
                }
                account.balance -= request.amount;
            }
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            account_id: account.id,
            transaction_type: request.transaction_type,
            currency: request.currency,
            amount: request.amount,
            timestamp: Utc::now(),
        };
        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// The caller's transactions, newest first.
    pub fn transactions_for_user(&self, user_id: Uuid) -> Result<Vec<Transaction>, ApiError> {
        let account = self.deposit_account_by_user(user_id)?;
        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|transaction| transaction.account_id == account.id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(transactions)
    }
}

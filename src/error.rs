// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the ledger core

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::TransactionType;

/// Input rejected before anything is written to the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Amount must not be negative (got {0})")]
    NegativeAmount(Decimal),

    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Category '{category}' is not valid for {kind} transactions")]
    CategoryMismatch {
        category: String,
        kind: TransactionType,
    },

    #[error("Unknown transaction type '{0}'")]
    UnknownType(String),

    #[error("Budget ceiling must not be negative (got {0})")]
    NegativeCeiling(Decimal),

    #[error("Invalid reminder time '{0}', expected HH:MM")]
    ReminderTime(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}; please retry")]
    StoreUnavailable(#[from] StoreError),

    #[error("Notification permission denied: {0}")]
    PermissionDenied(String),

    #[error("Reminders are not enabled")]
    NotificationsDisabled,

    #[error("Transaction '{0}' not found")]
    NotFound(String),

    #[error("No user selected")]
    NoUser,
}

impl CoreError {
    /// Store failures are the only ones worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

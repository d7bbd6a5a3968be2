// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! # Tracker
//!
//! Binds one user's transaction collection to the aggregation functions.
//! The tracker only ever holds the most recently delivered snapshot; writes
//! go to the store and show up here when the next snapshot lands.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::budget::{self, BudgetStatus};
use crate::error::{CoreError, Result};
use crate::ledger::{self, LedgerSummary};
use crate::models::{Budget, Transaction, TransactionDraft, TransactionType, validate_ceiling};
use crate::stats::{self, StatsProjection, TimeWindow};
use crate::store::{Snapshot, Store, Subscription, paths};

pub struct Tracker<S: Store> {
    store: S,
    user: Option<String>,
    subscription: Option<Subscription>,
    transactions: Vec<Transaction>,
    budget: Option<Budget>,
}

impl<S: Store> Tracker<S> {
    pub fn new(store: S) -> Self {
        Tracker {
            store,
            user: None,
            subscription: None,
            transactions: Vec::new(),
            budget: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    fn current_user(&self) -> Result<&str> {
        self.user.as_deref().ok_or(CoreError::NoUser)
    }

    /// Drop everything tied to the previous user, then subscribe for `user`.
    pub fn switch_user(&mut self, user: &str) -> Result<()> {
        self.sign_out();
        self.user = Some(user.to_string());
        info!(user, "Switched user");

        self.subscription = Some(self.store.subscribe(&paths::transactions(user))?);
        self.reload_budget()?;
        self.pump();
        Ok(())
    }

    pub fn sign_out(&mut self) {
        if let Some(sub) = self.subscription.take() {
            debug!(collection = sub.collection(), "Cancelling subscription");
            sub.cancel();
        }
        self.user = None;
        self.transactions.clear();
        self.budget = None;
    }

    /// Take the newest pending snapshot, if any. Returns whether state changed.
    pub fn pump(&mut self) -> bool {
        let latest = match &self.subscription {
            Some(sub) => sub.latest(),
            None => None,
        };
        match latest {
            Some(snapshot) => self.apply_snapshot(snapshot),
            None => false,
        }
    }

    /// Replace the held transaction set wholesale. Snapshots for any
    /// collection other than the current user's are ignored.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> bool {
        let expected = match &self.user {
            Some(user) => paths::transactions(user),
            None => return false,
        };
        if snapshot.collection != expected {
            warn!(collection = %snapshot.collection, "Ignoring snapshot for another user");
            return false;
        }
        self.transactions = snapshot.transactions();
        debug!(count = self.transactions.len(), "Applied snapshot");
        true
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Newest first, optionally narrowed to one type.
    pub fn list(&self, kind: Option<TransactionType>, limit: Option<usize>) -> Vec<&Transaction> {
        ledger::newest_first(&self.transactions)
            .into_iter()
            .filter(|t| kind.is_none_or(|k| t.kind == k))
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    pub fn summary<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> LedgerSummary {
        LedgerSummary::compute(&self.transactions, now)
    }

    pub fn budget(&self) -> Option<&Budget> {
        self.budget.as_ref()
    }

    pub fn budget_status<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> BudgetStatus {
        let spent = ledger::month_to_date(&self.transactions, TransactionType::Expense, now);
        budget::status(self.budget.as_ref().map(|b| b.monthly_ceiling), spent)
    }

    pub fn stats<Tz: TimeZone>(&self, window: TimeWindow, now: &DateTime<Tz>) -> StatsProjection {
        stats::project(&self.transactions, window, now)
    }

    pub fn record_transaction(&self, draft: &TransactionDraft) -> Result<String> {
        draft.validate()?;
        let user = self.current_user()?;
        let id = self
            .store
            .create(&paths::transactions(user), draft.to_create_document(Utc::now()))
            .inspect_err(|err| warn!(user, error = %err, "Failed to record transaction"))?;
        info!(user, id = %id, amount = %draft.amount, kind = %draft.kind, "Recorded transaction");
        Ok(id)
    }

    /// Full replacement of a record present in the latest snapshot.
    pub fn edit_transaction(&self, id: &str, draft: &TransactionDraft) -> Result<()> {
        draft.validate()?;
        let user = self.current_user()?;
        let existing = self
            .find(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        let body = draft.to_update_document(Some(existing), Utc::now());
        self.store
            .update(&paths::transaction(user, id), body)
            .inspect_err(|err| warn!(user, id, error = %err, "Failed to update transaction"))?;
        info!(user, id, "Updated transaction");
        Ok(())
    }

    pub fn delete_transaction(&self, id: &str) -> Result<()> {
        let user = self.current_user()?;
        self.store
            .delete(&paths::transaction(user, id))
            .inspect_err(|err| warn!(user, id, error = %err, "Failed to delete transaction"))?;
        info!(user, id, "Deleted transaction");
        Ok(())
    }

    /// Negative ceilings never reach the store. The held budget only
    /// changes once the write succeeded.
    pub fn set_budget(&mut self, ceiling: Decimal) -> Result<()> {
        let ceiling = validate_ceiling(ceiling)?;
        let user = self.current_user()?.to_string();
        let budget = Budget {
            monthly_ceiling: ceiling,
            updated_at: Some(Utc::now()),
        };
        self.store
            .update(&paths::budget(&user), serde_json::json!(budget))
            .inspect_err(|err| warn!(user = %user, error = %err, "Failed to save budget"))?;
        info!(user = %user, ceiling = %ceiling, "Budget set");
        self.budget = Some(budget);
        Ok(())
    }

    pub fn reload_budget(&mut self) -> Result<()> {
        let user = self.current_user()?.to_string();
        let raw = self.store.get_once(&paths::budget(&user))?;
        self.budget = raw.and_then(|v| match serde_json::from_value::<Budget>(v) {
            Ok(b) => Some(b),
            Err(err) => {
                warn!(user = %user, error = %err, "Unreadable budget record, treating as unset");
                None
            }
        });
        Ok(())
    }
}

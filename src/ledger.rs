// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger aggregation. Everything here is a pure function of the current
//! transaction set and the clock, so recomputing from scratch on every
//! snapshot gives the same answer no matter how updates arrived.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, TransactionType};

pub const RECENT_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
    pub expense: Decimal,
    pub income: Decimal,
    pub investment: Decimal,
}

impl TypeTotals {
    pub fn get(&self, kind: TransactionType) -> Decimal {
        match kind {
            TransactionType::Expense => self.expense,
            TransactionType::Income => self.income,
            TransactionType::Investment => self.investment,
        }
    }

    fn add(&mut self, kind: TransactionType, amount: Decimal) {
        match kind {
            TransactionType::Expense => self.expense += amount,
            TransactionType::Income => self.income += amount,
            TransactionType::Investment => self.investment += amount,
        }
    }

    pub fn sum(&self) -> Decimal {
        self.expense + self.income + self.investment
    }

    /// income - expense - investment
    pub fn balance(&self) -> Decimal {
        self.income - self.expense - self.investment
    }
}

pub fn totals_by_type(transactions: &[Transaction]) -> TypeTotals {
    let mut totals = TypeTotals::default();
    for tx in transactions {
        totals.add(tx.kind, tx.amount);
    }
    totals
}

pub fn balance(transactions: &[Transaction]) -> Decimal {
    totals_by_type(transactions).balance()
}

/// Same calendar month and year as `now`, seen from `now`'s timezone.
/// Undated records are never in any window.
pub fn in_current_month<Tz: TimeZone>(tx: &Transaction, now: &DateTime<Tz>) -> bool {
    match tx.occurred_at {
        Some(at) => {
            let local = at.with_timezone(&now.timezone());
            local.year() == now.year() && local.month() == now.month()
        }
        None => false,
    }
}

pub fn in_last_n_days<Tz: TimeZone>(tx: &Transaction, now: &DateTime<Tz>, days: i64) -> bool {
    let cutoff = now.with_timezone(&Utc) - Duration::days(days);
    tx.occurred_at.is_some_and(|at| at >= cutoff)
}

pub fn month_to_date<Tz: TimeZone>(
    transactions: &[Transaction],
    kind: TransactionType,
    now: &DateTime<Tz>,
) -> Decimal {
    transactions
        .iter()
        .filter(|tx| tx.kind == kind && in_current_month(tx, now))
        .map(|tx| tx.amount)
        .sum()
}

pub fn within_last_n_days<'a, Tz: TimeZone>(
    transactions: &'a [Transaction],
    days: i64,
    now: &DateTime<Tz>,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|tx| in_last_n_days(tx, now, days))
        .collect()
}

pub fn total_within_last_n_days<Tz: TimeZone>(
    transactions: &[Transaction],
    kind: TransactionType,
    days: i64,
    now: &DateTime<Tz>,
) -> Decimal {
    within_last_n_days(transactions, days, now)
        .into_iter()
        .filter(|tx| tx.kind == kind)
        .map(|tx| tx.amount)
        .sum()
}

/// Most recent first; undated records go last, ties keep input order.
pub fn newest_first(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    sorted
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub totals_by_type: TypeTotals,
    pub balance: Decimal,
    pub month_to_date: TypeTotals,
    pub recent_expense: Decimal,
    pub transaction_count: usize,
    pub undated_count: usize,
}

impl LedgerSummary {
    pub fn compute<Tz: TimeZone>(transactions: &[Transaction], now: &DateTime<Tz>) -> Self {
        let totals_by_type = totals_by_type(transactions);
        let mut month = TypeTotals::default();
        for tx in transactions.iter().filter(|tx| in_current_month(tx, now)) {
            month.add(tx.kind, tx.amount);
        }
        LedgerSummary {
            totals_by_type,
            balance: totals_by_type.balance(),
            month_to_date: month,
            recent_expense: total_within_last_n_days(
                transactions,
                TransactionType::Expense,
                RECENT_DAYS,
                now,
            ),
            transaction_count: transactions.len(),
            undated_count: transactions.iter().filter(|t| t.occurred_at.is_none()).count(),
        }
    }
}

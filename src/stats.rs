// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::ledger::{RECENT_DAYS, in_current_month, in_last_n_days};
use crate::models::{Transaction, TransactionType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TimeWindow {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "month")]
    CurrentMonth,
    #[serde(rename = "week")]
    Last7Days,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::All => "all",
            TimeWindow::CurrentMonth => "month",
            TimeWindow::Last7Days => "week",
        }
    }

    pub fn contains<Tz: TimeZone>(&self, tx: &Transaction, now: &DateTime<Tz>) -> bool {
        match self {
            TimeWindow::All => true,
            TimeWindow::CurrentMonth => in_current_month(tx, now),
            TimeWindow::Last7Days => in_last_n_days(tx, now, RECENT_DAYS),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TimeWindow::All),
            "month" | "current-month" => Ok(TimeWindow::CurrentMonth),
            "week" | "last-7-days" => Ok(TimeWindow::Last7Days),
            other => Err(format!("Unknown time window: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsProjection {
    pub window: TimeWindow,
    pub by_category: Vec<CategoryTotal>,
    pub total: Decimal,
}

/// Spending breakdown for `window`. Only expenses are counted.
pub fn project<Tz: TimeZone>(
    transactions: &[Transaction],
    window: TimeWindow,
    now: &DateTime<Tz>,
) -> StatsProjection {
    let mut groups: HashMap<&str, Decimal> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.kind == TransactionType::Expense && window.contains(tx, now))
    {
        *groups.entry(tx.category_or_other()).or_insert(Decimal::ZERO) += tx.amount;
    }

    let total: Decimal = groups.values().copied().sum();
    let mut by_category: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            total: amount,
            percentage: percentage_of(amount, total),
        })
        .collect();
    by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    StatsProjection {
        window,
        by_category,
        total,
    }
}

fn percentage_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    part / total * Decimal::ONE_HUNDRED
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::{FixedOffset, TimeZone, Utc};
use common::{at, expense, tx};
use pocketledger::ledger::{self, LedgerSummary};
use pocketledger::models::TransactionType::{Expense, Income, Investment};
use rust_decimal::Decimal;

fn sample() -> Vec<pocketledger::models::Transaction> {
    vec![
        tx("1", 2000, Income, "salary", Some(at(2025, 6, 1))),
        expense("2", 40, "food", Some(at(2025, 6, 10))),
        expense("3", 15, "transport", Some(at(2025, 5, 30))),
        tx("4", 300, Investment, "funds", Some(at(2025, 6, 12))),
        expense("5", 25, "food", None),
        expense("6", 60, "leisure", Some(at(2024, 6, 11))),
        tx("7", 100, Income, "freelance", Some(at(2025, 6, 14))),
    ]
}

#[test]
fn type_totals_do_not_double_count() {
    let txs = sample();
    let totals = ledger::totals_by_type(&txs);
    assert_eq!(totals.expense, Decimal::from(140));
    assert_eq!(totals.income, Decimal::from(2100));
    assert_eq!(totals.investment, Decimal::from(300));

    let all: Decimal = txs.iter().map(|t| t.amount).sum();
    assert_eq!(totals.sum(), all);
}

#[test]
fn balance_is_income_minus_spending_and_order_free() {
    let mut txs = sample();
    let expected = Decimal::from(2100 - 140 - 300);
    assert_eq!(ledger::balance(&txs), expected);

    txs.reverse();
    assert_eq!(ledger::balance(&txs), expected);
    txs.rotate_left(3);
    assert_eq!(ledger::balance(&txs), expected);
}

#[test]
fn summary_is_idempotent() {
    let txs = sample();
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap();
    let first = LedgerSummary::compute(&txs, &now);
    let second = LedgerSummary::compute(&txs, &now);
    assert_eq!(first, second);
    assert_eq!(first.transaction_count, 7);
    assert_eq!(first.undated_count, 1);
}

#[test]
fn month_to_date_needs_same_month_and_year() {
    let txs = sample();
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap();
    // 40 in June 2025; May, last June and the undated record are out.
    assert_eq!(ledger::month_to_date(&txs, Expense, &now), Decimal::from(40));
    assert_eq!(ledger::month_to_date(&txs, Income, &now), Decimal::from(2100));
    assert_eq!(ledger::month_to_date(&txs, Investment, &now), Decimal::from(300));
}

#[test]
fn undated_records_count_in_totals_only() {
    let txs = vec![expense("a", 10, "food", None)];
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap();
    let summary = LedgerSummary::compute(&txs, &now);
    assert_eq!(summary.totals_by_type.expense, Decimal::from(10));
    assert_eq!(summary.month_to_date.expense, Decimal::ZERO);
    assert_eq!(summary.recent_expense, Decimal::ZERO);
    assert!(ledger::within_last_n_days(&txs, 3650, &now).is_empty());
}

#[test]
fn last_n_days_cutoff_is_inclusive() {
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let txs = vec![
        expense("edge", 5, "food", Some(at(2025, 6, 8))),
        expense("old", 7, "food", Some(at(2025, 6, 7))),
        tx("pay", 50, Income, "salary", Some(at(2025, 6, 14))),
    ];
    let recent = ledger::within_last_n_days(&txs, 7, &now);
    let ids: Vec<&str> = recent.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["edge", "pay"]);
    assert_eq!(
        ledger::total_within_last_n_days(&txs, Expense, 7, &now),
        Decimal::from(5)
    );
}

#[test]
fn month_boundary_follows_the_clock_timezone() {
    let late = Utc.with_ymd_and_hms(2025, 6, 30, 23, 30, 0).unwrap();
    let txs = vec![expense("x", 12, "food", Some(late))];

    let utc_now = Utc.with_ymd_and_hms(2025, 7, 1, 7, 0, 0).unwrap();
    assert_eq!(ledger::month_to_date(&txs, Expense, &utc_now), Decimal::ZERO);

    let madrid = FixedOffset::east_opt(2 * 3600).unwrap();
    let local_now = madrid.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap();
    assert_eq!(ledger::month_to_date(&txs, Expense, &local_now), Decimal::from(12));
}

#[test]
fn newest_first_puts_undated_last() {
    let txs = sample();
    let ordered: Vec<&str> = ledger::newest_first(&txs)
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(ordered, vec!["7", "4", "2", "1", "3", "6", "5"]);
}

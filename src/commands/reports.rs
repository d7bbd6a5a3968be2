// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TransactionType;
use crate::stats::{StatsProjection, TimeWindow};
use crate::store::Store;
use crate::tracker::Tracker;
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};
use chrono::Local;

pub fn summary<S: Store>(tracker: &Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let summary = tracker.summary(&Local::now());
    if maybe_print_json(json_flag, jsonl_flag, &summary)? {
        return Ok(());
    }
    let data = TransactionType::ALL
        .iter()
        .map(|k| {
            vec![
                k.to_string(),
                fmt_money(&summary.totals_by_type.get(*k)),
                fmt_money(&summary.month_to_date.get(*k)),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Type", "Total", "This month"], data)
    );
    println!("Balance: {}", fmt_money(&summary.balance));
    println!("Spent in the last 7 days: {}", fmt_money(&summary.recent_expense));
    if summary.undated_count > 0 {
        println!(
            "{} of {} transactions have no usable date and are left out of time-based figures",
            summary.undated_count, summary.transaction_count
        );
    }
    Ok(())
}

pub fn projection<S: Store>(tracker: &Tracker<S>, sub: &clap::ArgMatches) -> Result<StatsProjection> {
    let window: TimeWindow = sub
        .get_one::<String>("window")
        .unwrap()
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    Ok(tracker.stats(window, &Local::now()))
}

pub fn stats<S: Store>(tracker: &Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let projection = projection(tracker, sub)?;
    if jsonl_flag {
        maybe_print_json(false, true, &projection.by_category)?;
        return Ok(());
    }
    if maybe_print_json(json_flag, false, &projection)? {
        return Ok(());
    }
    if projection.by_category.is_empty() {
        println!("No spending to show for '{}'", projection.window);
        return Ok(());
    }
    let data = projection
        .by_category
        .iter()
        .map(|c| vec![c.category.clone(), fmt_money(&c.total), fmt_percent(&c.percentage)])
        .collect();
    println!("{}", pretty_table(&["Category", "Spent", "Share"], data));
    println!("Total ({}): {}", projection.window, fmt_money(&projection.total));
    Ok(())
}

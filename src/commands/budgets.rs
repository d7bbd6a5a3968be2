// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::BudgetStatus;
use crate::store::Store;
use crate::tracker::Tracker;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use chrono::Local;

pub fn handle<S: Store>(tracker: &mut Tracker<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(tracker, sub)?,
        Some(("status", sub)) => status(tracker, sub)?,
        _ => {}
    }
    Ok(())
}

fn set<S: Store>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    tracker.set_budget(amount).context("Could not save budget")?;
    println!("Monthly budget set to {}", fmt_money(&amount));
    Ok(())
}

fn status<S: Store>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let status = tracker.budget_status(&Local::now());
    if maybe_print_json(json_flag, jsonl_flag, &status)? {
        return Ok(());
    }
    match status {
        BudgetStatus::NotConfigured { spent, .. } => {
            println!(
                "No monthly budget set. Spent this month: {}. Use `budget set --amount <N>`.",
                fmt_money(&spent)
            );
        }
        BudgetStatus::Tracking(p) => {
            let data = vec![vec![
                fmt_money(&p.ceiling),
                fmt_money(&p.spent),
                fmt_money(&p.remaining),
                format!("{}%", p.percent_display()),
                p.band.to_string(),
            ]];
            println!(
                "{}",
                pretty_table(&["Budget", "Spent", "Remaining", "Used", "Status"], data)
            );
            println!("{}", progress_bar(p.display_percent, 30));
            println!("{}", p.message);
        }
    }
    Ok(())
}

fn progress_bar(percent: rust_decimal::Decimal, width: usize) -> String {
    use rust_decimal::prelude::ToPrimitive;
    let filled = (percent * rust_decimal::Decimal::from(width) / rust_decimal::Decimal::ONE_HUNDRED)
        .floor()
        .to_usize()
        .unwrap_or(0)
        .min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

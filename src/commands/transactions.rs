// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{TransactionDraft, TransactionType};
use crate::store::Store;
use crate::tracker::Tracker;
use crate::utils::{
    fmt_date, fmt_money, maybe_print_json, parse_decimal, parse_occurred_at, parse_type,
    pretty_table,
};
use anyhow::{Context, Result, bail};
use chrono::Local;
use serde::Serialize;

pub fn handle<S: Store>(tracker: &mut Tracker<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(tracker, sub)?,
        Some(("edit", sub)) => edit(tracker, sub)?,
        Some(("rm", sub)) => rm(tracker, sub)?,
        Some(("list", sub)) => list(tracker, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn draft_from_args(sub: &clap::ArgMatches) -> Result<TransactionDraft> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let description = sub.get_one::<String>("description").unwrap();
    let kind = parse_type(sub.get_one::<String>("type").unwrap())?;
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| kind.default_category().to_string());
    let mut draft = TransactionDraft::new(amount, description, &category, kind);
    if let Some(d) = sub.get_one::<String>("date") {
        draft = draft.occurred_at(parse_occurred_at(d)?);
    }
    Ok(draft)
}

fn add<S: Store>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from_args(sub)?;
    let id = tracker
        .record_transaction(&draft)
        .context("Could not record transaction")?;
    println!(
        "Recorded {} {} '{}' in {} (id: {})",
        draft.kind,
        fmt_money(&draft.amount),
        draft.description.trim(),
        draft.category,
        id
    );
    Ok(())
}

fn edit<S: Store>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    let draft = draft_from_args(sub)?;
    tracker
        .edit_transaction(id, &draft)
        .context("Could not update transaction")?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn rm<S: Store>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap().trim();
    if tracker.find(id).is_none() {
        bail!("Transaction '{}' not found", id);
    }
    tracker
        .delete_transaction(id)
        .context("Could not delete transaction")?;
    println!("Removed transaction {}", id);
    Ok(())
}

fn list<S: Store>(tracker: &mut Tracker<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(tracker, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.kind.to_string(),
                    r.description.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Description", "Category", "Amount", "ID"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub category: String,
    pub amount: String,
}

pub fn query_rows<S: Store>(tracker: &Tracker<S>, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let kind = sub
        .get_one::<String>("type")
        .map(|s| parse_type(s))
        .transpose()?;
    let limit = sub.get_one::<usize>("limit").copied();
    let tz = Local::now().timezone();
    Ok(tracker
        .list(kind, limit)
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: fmt_date(t.occurred_at, &tz),
            kind: t.kind,
            description: t.description.clone(),
            category: t.category_or_other().to_string(),
            amount: fmt_money(&t.amount),
        })
        .collect())
}

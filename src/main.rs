// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pocketledger::{cli, commands, db, tracker::Tracker};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_override = matches.get_one::<String>("db").map(PathBuf::from);
    let store = db::open_or_init(db_override.as_deref())?;
    let mut tracker = Tracker::new(store);
    let user = matches.get_one::<String>("user").unwrap();
    tracker.switch_user(user.trim())?;

    match matches.subcommand() {
        Some(("tx", sub)) => commands::transactions::handle(&mut tracker, sub)?,
        Some(("categories", sub)) => commands::categories::handle(sub)?,
        Some(("summary", sub)) => commands::reports::summary(&tracker, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut tracker, sub)?,
        Some(("stats", sub)) => commands::reports::stats(&tracker, sub)?,
        Some(("notify", sub)) => commands::notify::handle(&tracker, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn type_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .help("expense | income | investment")
}

fn draft_args(cmd: Command, category_required: bool) -> Command {
    cmd.arg(Arg::new("amount").long("amount").required(true))
        .arg(Arg::new("description").long("description").short('d').required(true))
        .arg(
            Arg::new("category")
                .long("category")
                .required(category_required)
                .help("Defaults to the first category of the type"),
        )
        .arg(type_arg().default_value("expense"))
        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to now"))
}

pub fn build_cli() -> Command {
    Command::new("pocketledger")
        .version(crate_version!())
        .about("Personal expense ledger with monthly budget tracking and spending statistics")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("Database file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .default_value("local")
                .help("User whose ledger to use"),
        )
        .subcommand(
            Command::new("tx")
                .about("Record, edit, remove, and list transactions")
                .subcommand(draft_args(Command::new("add"), false))
                .subcommand(draft_args(
                    Command::new("edit").arg(Arg::new("id").long("id").required(true)),
                    true,
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
                .subcommand(json_flags(
                    Command::new("list").arg(type_arg()).arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize)),
                    ),
                )),
        )
        .subcommand(
            Command::new("categories")
                .about("List the categories available per transaction type")
                .arg(type_arg()),
        )
        .subcommand(json_flags(
            Command::new("summary").about("Totals by type, balance, and month-to-date figures"),
        ))
        .subcommand(
            Command::new("budget")
                .about("Monthly budget ceiling and consumption")
                .subcommand(Command::new("set").arg(Arg::new("amount").long("amount").required(true)))
                .subcommand(json_flags(Command::new("status"))),
        )
        .subcommand(json_flags(
            Command::new("stats")
                .about("Spending by category")
                .arg(
                    Arg::new("window")
                        .long("window")
                        .default_value("all")
                        .help("all | month | week"),
                ),
        ))
        .subcommand(
            Command::new("notify")
                .about("Daily reminder preferences")
                .subcommand(Command::new("status"))
                .subcommand(Command::new("on").arg(Arg::new("at").long("at").help("HH:MM")))
                .subcommand(Command::new("off"))
                .subcommand(Command::new("test"))
                .subcommand(
                    Command::new("time").arg(Arg::new("at").long("at").required(true).help("HH:MM")),
                ),
        )
}

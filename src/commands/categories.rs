// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TransactionType;
use crate::utils::{parse_type, pretty_table};
use anyhow::Result;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let kinds = match m.get_one::<String>("type") {
        Some(t) => vec![parse_type(t)?],
        None => TransactionType::ALL.to_vec(),
    };
    let mut data = Vec::new();
    for kind in kinds {
        data.push(vec![kind.to_string(), kind.categories().join(", ")]);
    }
    println!("{}", pretty_table(&["Type", "Categories"], data));
    Ok(())
}

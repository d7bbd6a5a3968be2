// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::notifications::{NotificationController, NotificationPlatform, NotificationState, Permission};
use crate::store::Store;
use crate::tracker::Tracker;
use anyhow::{Context, Result, bail};

/// A terminal can always print, so permission is always granted.
pub struct ConsolePlatform;

impl NotificationPlatform for ConsolePlatform {
    fn query_permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, title: &str, body: &str, _tag: &str) {
        println!("🔔 {}: {}", title, body);
    }
}

pub fn handle<S: Store>(tracker: &Tracker<S>, m: &clap::ArgMatches) -> Result<()> {
    let user = tracker.user().context("No user selected")?;
    let store = tracker.store();
    let platform = ConsolePlatform;
    let mut ctl = NotificationController::load(store, &platform, user)
        .context("Could not load notification settings")?;
    match m.subcommand() {
        Some(("on", sub)) => {
            if let Some(at) = sub.get_one::<String>("at") {
                ctl.set_reminder_time(store, &platform, at)?;
            }
            ctl.enable(store, &platform)?;
            println!("Daily reminder enabled at {}", ctl.reminder_time());
        }
        Some(("off", _)) => {
            ctl.disable(store, &platform)?;
            println!("Daily reminder disabled");
        }
        Some(("time", sub)) => {
            if ctl.state() != NotificationState::Enabled {
                bail!("Reminders are off; use `notify on --at HH:MM` to pick a time");
            }
            let at = sub.get_one::<String>("at").unwrap();
            ctl.set_reminder_time(store, &platform, at)?;
            println!("Reminder time updated: {}", ctl.reminder_time());
        }
        Some(("test", _)) => ctl.send_test_notification(&platform)?,
        _ => {
            println!("Reminders: {} ({})", ctl.state(), ctl.reminder_time());
        }
    }
    Ok(())
}

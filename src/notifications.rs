// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! # Reminder preferences
//!
//! `NotificationState::on` is the pure transition table. `NotificationController`
//! runs the resulting effects against the store and the platform permission
//! API, and only commits a transition once its write has gone through.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::error::{CoreError, Result, ValidationError};
use crate::models::NotificationSetting;
use crate::store::{Store, paths};

pub const BLOCKED_MESSAGE: &str =
    "Notifications are blocked at the platform level; allow them in your system or browser settings";
pub const DENIED_MESSAGE: &str = "Notification permission was not granted";

pub const CONFIRMATION_TAG: &str = "reminder-confirmation";
pub const DAILY_REMINDER_TAG: &str = "daily-reminder";

static REMINDER_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("static pattern"));

pub fn parse_reminder_time(raw: &str) -> std::result::Result<String, ValidationError> {
    let t = raw.trim();
    if REMINDER_TIME.is_match(t) {
        Ok(t.to_string())
    } else {
        Err(ValidationError::ReminderTime(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet (never asked, or the prompt was dismissed).
    Default,
}

/// Platform notification API.
pub trait NotificationPlatform {
    fn query_permission(&self) -> Permission;

    /// Prompt the user. `Default` means no answer yet; it will arrive later
    /// through `NotificationController::permission_changed`.
    fn request_permission(&self) -> Permission;

    fn show(&self, title: &str, body: &str, tag: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationState {
    Disabled,
    PendingPermission,
    Enabled,
    Blocked,
}

impl fmt::Display for NotificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationState::Disabled => "disabled",
            NotificationState::PendingPermission => "pending permission",
            NotificationState::Enabled => "enabled",
            NotificationState::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    UserToggleOn { permission: Permission },
    UserToggleOff,
    PermissionGranted,
    PermissionDenied,
    ChangeReminderTime(String),
    PlatformRevokedPermission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    RequestPermission,
    Persist { enabled: bool },
    ShowConfirmation,
    Refuse(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: NotificationState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: NotificationState, effects: Vec<Effect>) -> Self {
        Transition { next, effects }
    }

    fn stay(state: NotificationState) -> Self {
        Transition {
            next: state,
            effects: Vec::new(),
        }
    }
}

impl NotificationState {
    /// Reconcile the stored preference with what the platform says now.
    pub fn initial(setting: &NotificationSetting, permission: Permission) -> Self {
        match (setting.enabled, permission) {
            (true, Permission::Granted) => NotificationState::Enabled,
            (true, Permission::Denied) => NotificationState::Blocked,
            _ => NotificationState::Disabled,
        }
    }

    pub fn on(self, event: &Event) -> Transition {
        use NotificationState::*;
        let enable = || {
            Transition::to(
                Enabled,
                vec![Effect::Persist { enabled: true }, Effect::ShowConfirmation],
            )
        };
        match (self, event) {
            (Disabled | Blocked, Event::UserToggleOn { permission }) => match permission {
                Permission::Granted => enable(),
                Permission::Denied => Transition::to(Blocked, vec![Effect::Refuse(BLOCKED_MESSAGE)]),
                Permission::Default => {
                    Transition::to(PendingPermission, vec![Effect::RequestPermission])
                }
            },
            (PendingPermission, Event::PermissionGranted) => enable(),
            (PendingPermission, Event::PermissionDenied) => {
                Transition::to(Disabled, vec![Effect::Refuse(DENIED_MESSAGE)])
            }
            (PendingPermission, Event::UserToggleOff) => Transition::stay(Disabled),
            (Enabled, Event::UserToggleOff) => {
                Transition::to(Disabled, vec![Effect::Persist { enabled: false }])
            }
            (Enabled, Event::ChangeReminderTime(_)) => {
                Transition::to(Enabled, vec![Effect::Persist { enabled: true }])
            }
            (_, Event::PlatformRevokedPermission) => Transition::stay(Blocked),
            (state, _) => Transition::stay(state),
        }
    }
}

/// Per-user reminder preferences, driven by user actions and platform callbacks.
#[derive(Debug, Clone)]
pub struct NotificationController {
    user: String,
    state: NotificationState,
    setting: NotificationSetting,
}

impl NotificationController {
    pub fn new(user: &str, setting: NotificationSetting, permission: Permission) -> Self {
        let state = NotificationState::initial(&setting, permission);
        NotificationController {
            user: user.to_string(),
            state,
            setting,
        }
    }

    pub fn load<S: Store, P: NotificationPlatform>(store: &S, platform: &P, user: &str) -> Result<Self> {
        let setting = match store.get_once(&paths::notifications(user))? {
            Some(raw) => serde_json::from_value(raw).unwrap_or_else(|err| {
                warn!(user, error = %err, "Unreadable notification setting, using defaults");
                NotificationSetting::default()
            }),
            None => NotificationSetting::default(),
        };
        let controller = Self::new(user, setting, platform.query_permission());
        info!(user, state = %controller.state, "Loaded notification preferences");
        Ok(controller)
    }

    pub fn state(&self) -> NotificationState {
        self.state
    }

    pub fn setting(&self) -> &NotificationSetting {
        &self.setting
    }

    pub fn reminder_time(&self) -> &str {
        &self.setting.reminder_time
    }

    /// Flip the switch: on from `Disabled`/`Blocked`, off otherwise.
    pub fn toggle<S: Store, P: NotificationPlatform>(&mut self, store: &S, platform: &P) -> Result<NotificationState> {
        match self.state {
            NotificationState::Enabled | NotificationState::PendingPermission => {
                self.disable(store, platform)
            }
            NotificationState::Disabled | NotificationState::Blocked => self.enable(store, platform),
        }
    }

    pub fn enable<S: Store, P: NotificationPlatform>(&mut self, store: &S, platform: &P) -> Result<NotificationState> {
        let permission = platform.query_permission();
        self.apply(store, platform, Event::UserToggleOn { permission })?;
        Ok(self.state)
    }

    pub fn disable<S: Store, P: NotificationPlatform>(&mut self, store: &S, platform: &P) -> Result<NotificationState> {
        self.apply(store, platform, Event::UserToggleOff)?;
        Ok(self.state)
    }

    /// Outside `Enabled` the new time is only kept locally until the next enable.
    pub fn set_reminder_time<S: Store, P: NotificationPlatform>(
        &mut self,
        store: &S,
        platform: &P,
        raw: &str,
    ) -> Result<()> {
        let time = parse_reminder_time(raw)?;
        let previous = std::mem::replace(&mut self.setting.reminder_time, time.clone());
        if let Err(err) = self.apply(store, platform, Event::ChangeReminderTime(time)) {
            self.setting.reminder_time = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Platform callback for a permission change.
    pub fn permission_changed<S: Store, P: NotificationPlatform>(
        &mut self,
        store: &S,
        platform: &P,
        permission: Permission,
    ) -> Result<NotificationState> {
        let event = match (self.state, permission) {
            (NotificationState::PendingPermission, Permission::Granted) => Event::PermissionGranted,
            (NotificationState::PendingPermission, Permission::Denied) => Event::PermissionDenied,
            (_, Permission::Denied) => Event::PlatformRevokedPermission,
            _ => return Ok(self.state),
        };
        self.apply(store, platform, event)?;
        Ok(self.state)
    }

    pub fn send_test_notification<P: NotificationPlatform>(&self, platform: &P) -> Result<()> {
        match (self.state, platform.query_permission()) {
            (NotificationState::Enabled, Permission::Granted) => {}
            (NotificationState::Enabled | NotificationState::Blocked, _) => {
                return Err(CoreError::PermissionDenied(BLOCKED_MESSAGE.to_string()));
            }
            _ => return Err(CoreError::NotificationsDisabled),
        }
        platform.show(
            "Daily reminder",
            "Don't forget to log today's expenses!",
            DAILY_REMINDER_TAG,
        );
        Ok(())
    }

    fn apply<S: Store, P: NotificationPlatform>(&mut self, store: &S, platform: &P, event: Event) -> Result<()> {
        let prior = self.state;
        let Transition { next, effects } = prior.on(&event);

        // Writes first: the transition only sticks if the store took it.
        for effect in &effects {
            if let Effect::Persist { enabled } = *effect {
                let record = NotificationSetting {
                    enabled,
                    reminder_time: self.setting.reminder_time.clone(),
                    updated_at: Some(Utc::now()),
                };
                let body = serde_json::json!(record);
                if let Err(err) = store.update(&paths::notifications(&self.user), body) {
                    warn!(user = %self.user, error = %err, "Failed to save notification setting");
                    if prior == NotificationState::PendingPermission {
                        self.state = NotificationState::Disabled;
                    }
                    return Err(err.into());
                }
                self.setting = record;
            }
        }

        if next != prior {
            info!(user = %self.user, from = %prior, to = %next, "Notification state changed");
        }
        self.state = next;

        for effect in effects {
            match effect {
                Effect::Persist { .. } => {}
                Effect::ShowConfirmation => platform.show(
                    "Pocketledger",
                    &format!(
                        "Reminder set! You'll be nudged every day at {} to log your expenses.",
                        self.setting.reminder_time
                    ),
                    CONFIRMATION_TAG,
                ),
                Effect::RequestPermission => match platform.request_permission() {
                    Permission::Granted => self.apply(store, platform, Event::PermissionGranted)?,
                    Permission::Denied => self.apply(store, platform, Event::PermissionDenied)?,
                    Permission::Default => {}
                },
                Effect::Refuse(message) => {
                    return Err(CoreError::PermissionDenied(message.to_string()));
                }
            }
        }
        Ok(())
    }
}

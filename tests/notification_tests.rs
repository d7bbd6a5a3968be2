// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::RecordingStore;
use pocketledger::CoreError;
use pocketledger::models::NotificationSetting;
use pocketledger::notifications::{
    BLOCKED_MESSAGE, CONFIRMATION_TAG, DAILY_REMINDER_TAG, Effect, Event, NotificationController,
    NotificationPlatform, NotificationState, Permission,
};
use pocketledger::store::{Store, paths};
use serde_json::json;
use std::cell::{Cell, RefCell};

struct FakePlatform {
    permission: Cell<Permission>,
    answer: Permission,
    requests: Cell<usize>,
    shown: RefCell<Vec<String>>,
}

impl FakePlatform {
    fn new(permission: Permission, answer: Permission) -> Self {
        FakePlatform {
            permission: Cell::new(permission),
            answer,
            requests: Cell::new(0),
            shown: RefCell::new(Vec::new()),
        }
    }
}

impl NotificationPlatform for FakePlatform {
    fn query_permission(&self) -> Permission {
        self.permission.get()
    }

    fn request_permission(&self) -> Permission {
        self.requests.set(self.requests.get() + 1);
        if self.answer != Permission::Default {
            self.permission.set(self.answer);
        }
        self.answer
    }

    fn show(&self, _title: &str, _body: &str, tag: &str) {
        self.shown.borrow_mut().push(tag.to_string());
    }
}

const USER: &str = "u1";

fn settings_path() -> String {
    paths::notifications(USER)
}

#[test]
fn default_permission_waits_for_an_explicit_grant() {
    let t = NotificationState::Disabled.on(&Event::UserToggleOn {
        permission: Permission::Default,
    });
    assert_eq!(t.next, NotificationState::PendingPermission);
    assert_eq!(t.effects, vec![Effect::RequestPermission]);

    let t = t.next.on(&Event::PermissionGranted);
    assert_eq!(t.next, NotificationState::Enabled);
    assert_eq!(
        t.effects,
        vec![Effect::Persist { enabled: true }, Effect::ShowConfirmation]
    );
}

#[test]
fn enabled_is_persisted_once_and_only_after_the_grant() {
    let store = RecordingStore::new();
    let platform = FakePlatform::new(Permission::Default, Permission::Default);
    let mut ctl = NotificationController::load(&store, &platform, USER).unwrap();
    assert_eq!(ctl.state(), NotificationState::Disabled);

    let state = ctl.enable(&store, &platform).unwrap();
    assert_eq!(state, NotificationState::PendingPermission);
    assert_eq!(platform.requests.get(), 1);
    assert!(store.writes_to(&settings_path()).is_empty());
    assert!(platform.shown.borrow().is_empty());

    platform.permission.set(Permission::Granted);
    let state = ctl
        .permission_changed(&store, &platform, Permission::Granted)
        .unwrap();
    assert_eq!(state, NotificationState::Enabled);

    let writes = store.writes_to(&settings_path());
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0]["enabled"], json!(true));
    assert_eq!(writes[0]["reminderTime"], json!("20:00"));
    assert_eq!(*platform.shown.borrow(), vec![CONFIRMATION_TAG.to_string()]);
}

#[test]
fn synchronous_grant_enables_in_one_step() {
    let store = RecordingStore::new();
    let platform = FakePlatform::new(Permission::Default, Permission::Granted);
    let mut ctl = NotificationController::load(&store, &platform, USER).unwrap();

    assert_eq!(ctl.toggle(&store, &platform).unwrap(), NotificationState::Enabled);
    assert_eq!(store.writes_to(&settings_path()).len(), 1);
    assert_eq!(platform.shown.borrow().len(), 1);
    assert!(ctl.setting().enabled);
}

#[test]
fn denied_platform_blocks_without_writing() {
    let store = RecordingStore::new();
    let platform = FakePlatform::new(Permission::Denied, Permission::Denied);
    let mut ctl = NotificationController::load(&store, &platform, USER).unwrap();

    let err = ctl.enable(&store, &platform).unwrap_err();
    assert_eq!(err, CoreError::PermissionDenied(BLOCKED_MESSAGE.to_string()));
    assert_eq!(ctl.state(), NotificationState::Blocked);
    assert_eq!(platform.requests.get(), 0);
    assert!(store.writes_to(&settings_path()).is_empty());
}

#[test]
fn refused_prompt_returns_to_disabled() {
    let store = RecordingStore::new();
    let platform = FakePlatform::new(Permission::Default, Permission::Denied);
    let mut ctl = NotificationController::load(&store, &platform, USER).unwrap();

    assert!(ctl.enable(&store, &platform).is_err());
    assert_eq!(ctl.state(), NotificationState::Disabled);
    assert!(store.writes_to(&settings_path()).is_empty());
}

#[test]
fn turning_off_persists_disabled() {
    let store = RecordingStore::new();
    let platform = FakePlatform::new(Permission::Granted, Permission::Granted);
    let mut ctl = NotificationController::load(&store, &platform, USER).unwrap();
    ctl.enable(&store, &platform).unwrap();

    assert_eq!(ctl.toggle(&store, &platform).unwrap(), NotificationState::Disabled);
    let writes = store.writes_to(&settings_path());
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[1]["enabled"], json!(false));
}

#[test]
fn reminder_time_only_persists_while_enabled() {
    let store = RecordingStore::new();
    let platform = FakePlatform::new(Permission::Granted, Permission::Granted);
    let mut ctl = NotificationController::load(&store, &platform, USER).unwrap();

    ctl.set_reminder_time(&store, &platform, "07:15").unwrap();
    assert_eq!(ctl.reminder_time(), "07:15");
    assert!(store.writes_to(&settings_path()).is_empty());

    ctl.enable(&store, &platform).unwrap();
    ctl.set_reminder_time(&store, &platform, "21:45").unwrap();
    assert_eq!(ctl.state(), NotificationState::Enabled);
    let writes = store.writes_to(&settings_path());
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0]["reminderTime"], json!("07:15"));
    assert_eq!(writes[1]["reminderTime"], json!("21:45"));

    let err = ctl.set_reminder_time(&store, &platform, "9pm").unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(ctl.reminder_time(), "21:45");
    assert_eq!(store.writes_to(&settings_path()).len(), 2);
}

#[test]
fn load_reconciles_with_platform_permission() {
    let store = RecordingStore::new();
    store
        .update(&settings_path(), json!({"enabled": true, "time": "08:00"}))
        .unwrap();

    let granted = FakePlatform::new(Permission::Granted, Permission::Granted);
    let ctl = NotificationController::load(&store, &granted, USER).unwrap();
    assert_eq!(ctl.state(), NotificationState::Enabled);
    assert_eq!(ctl.reminder_time(), "08:00");

    let revoked = FakePlatform::new(Permission::Denied, Permission::Denied);
    let ctl = NotificationController::load(&store, &revoked, USER).unwrap();
    assert_eq!(ctl.state(), NotificationState::Blocked);

    let fresh = NotificationController::load(&store, &granted, "someone-else").unwrap();
    assert_eq!(fresh.state(), NotificationState::Disabled);
    assert_eq!(fresh.setting(), &NotificationSetting::default());
}

#[test]
fn failed_save_after_grant_leaves_reminders_off() {
    let store = RecordingStore::new();
    let platform = FakePlatform::new(Permission::Default, Permission::Granted);
    let mut ctl = NotificationController::load(&store, &platform, USER).unwrap();
    store.fail_writes.set(true);

    let err = ctl.enable(&store, &platform).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(ctl.state(), NotificationState::Disabled);
    assert!(platform.shown.borrow().is_empty());

    // Permission is granted now, so a retry goes straight through.
    store.fail_writes.set(false);
    assert_eq!(ctl.enable(&store, &platform).unwrap(), NotificationState::Enabled);
    assert_eq!(platform.requests.get(), 1);
}

#[test]
fn revocation_blocks_and_stops_test_notifications() {
    let store = RecordingStore::new();
    let platform = FakePlatform::new(Permission::Granted, Permission::Granted);
    let mut ctl = NotificationController::load(&store, &platform, USER).unwrap();
    ctl.enable(&store, &platform).unwrap();

    ctl.send_test_notification(&platform).unwrap();
    assert_eq!(platform.shown.borrow().last().unwrap(), DAILY_REMINDER_TAG);

    platform.permission.set(Permission::Denied);
    let state = ctl
        .permission_changed(&store, &platform, Permission::Denied)
        .unwrap();
    assert_eq!(state, NotificationState::Blocked);
    assert!(matches!(
        ctl.send_test_notification(&platform),
        Err(CoreError::PermissionDenied(_))
    ));
}

#[test]
fn test_notification_needs_reminders_turned_on() {
    let store = RecordingStore::new();
    let platform = FakePlatform::new(Permission::Granted, Permission::Granted);
    let mut ctl = NotificationController::load(&store, &platform, USER).unwrap();

    assert_eq!(
        ctl.send_test_notification(&platform),
        Err(CoreError::NotificationsDisabled)
    );
    assert!(platform.shown.borrow().is_empty());

    ctl.enable(&store, &platform).unwrap();
    platform.permission.set(Permission::Denied);
    assert!(matches!(
        ctl.send_test_notification(&platform),
        Err(CoreError::PermissionDenied(_))
    ));
}

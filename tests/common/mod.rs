// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use pocketledger::StoreError;
use pocketledger::db::SqliteStore;
use pocketledger::models::{Transaction, TransactionType};
use pocketledger::store::{Store, StoreResult, Subscription};
use rust_decimal::Decimal;
use serde_json::Value;
use std::cell::{Cell, RefCell};

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn tx(
    id: &str,
    amount: i64,
    kind: TransactionType,
    category: &str,
    when: Option<DateTime<Utc>>,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount: Decimal::from(amount),
        description: format!("tx {}", id),
        category: Some(category.to_string()),
        kind,
        occurred_at: when,
        created_at: None,
        updated_at: None,
    }
}

pub fn expense(id: &str, amount: i64, category: &str, when: Option<DateTime<Utc>>) -> Transaction {
    tx(id, amount, TransactionType::Expense, category, when)
}

/// SQLite store that remembers every write and can be told to fail them.
pub struct RecordingStore {
    pub inner: SqliteStore,
    pub writes: RefCell<Vec<(String, Value)>>,
    pub fail_writes: Cell<bool>,
}

impl RecordingStore {
    pub fn new() -> Self {
        RecordingStore {
            inner: SqliteStore::open_in_memory().unwrap(),
            writes: RefCell::new(Vec::new()),
            fail_writes: Cell::new(false),
        }
    }

    pub fn writes_to(&self, path: &str) -> Vec<Value> {
        self.writes
            .borrow()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn check(&self, path: &str, record: &Value) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("network down".into()));
        }
        self.writes
            .borrow_mut()
            .push((path.to_string(), record.clone()));
        Ok(())
    }
}

impl Store for RecordingStore {
    fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        self.inner.subscribe(collection)
    }

    fn create(&self, collection: &str, record: Value) -> StoreResult<String> {
        self.check(collection, &record)?;
        self.inner.create(collection, record)
    }

    fn update(&self, document: &str, record: Value) -> StoreResult<()> {
        self.check(document, &record)?;
        self.inner.update(document, record)
    }

    fn delete(&self, document: &str) -> StoreResult<()> {
        self.check(document, &Value::Null)?;
        self.inner.delete(document)
    }

    fn get_once(&self, document: &str) -> StoreResult<Option<Value>> {
        self.inner.get_once(document)
    }
}

// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! # Store contract
//!
//! The ledger never owns canonical data. A `Store` hands out full-collection
//! snapshots through subscriptions and accepts whole-document writes. Any
//! backend (a managed document database, the bundled SQLite store, a test
//! double) plugs in here.

use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use tracing::warn;

use crate::error::StoreError;
use crate::models::Transaction;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Document and collection locations, always scoped under one user.
pub mod paths {
    pub fn transactions(user: &str) -> String {
        format!("users/{}/expenses", user)
    }

    pub fn transaction(user: &str, id: &str) -> String {
        format!("users/{}/expenses/{}", user, id)
    }

    pub fn budget(user: &str) -> String {
        format!("users/{}/settings/budget", user)
    }

    pub fn notifications(user: &str) -> String {
        format!("users/{}/settings/notifications", user)
    }

    /// Split `a/b/c/id` into (`a/b/c`, `id`).
    pub fn split(document: &str) -> Option<(&str, &str)> {
        let (collection, id) = document.rsplit_once('/')?;
        if collection.is_empty() || id.is_empty() {
            return None;
        }
        Some((collection, id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Full point-in-time contents of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<Document>,
}

impl Snapshot {
    /// Decode every document as a transaction. Bodies that are not
    /// transactions at all are skipped and logged.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.documents
            .iter()
            .filter_map(|doc| match Transaction::from_document(&doc.id, &doc.data) {
                Ok(tx) => Some(tx),
                Err(err) => {
                    warn!(collection = %self.collection, id = %doc.id, error = %err, "Skipping undecodable transaction");
                    None
                }
            })
            .collect()
    }
}

/// Live feed of snapshots for one collection. Dropping it cancels the feed.
pub struct Subscription {
    collection: String,
    receiver: Receiver<Snapshot>,
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub fn new(collection: &str, receiver: Receiver<Snapshot>, active: Arc<AtomicBool>) -> Self {
        Subscription {
            collection: collection.to_string(),
            receiver,
            active,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Drain everything delivered so far and keep only the newest snapshot.
    pub fn latest(&self) -> Option<Snapshot> {
        let mut newest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => newest = Some(snapshot),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        newest
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("collection", &self.collection)
            .field("active", &self.is_active())
            .finish()
    }
}

/// External document store. All methods are fire-and-forget from the
/// ledger's point of view: derived state only changes when a snapshot
/// arrives.
pub trait Store {
    /// Subscribe to a collection. The current contents are delivered
    /// immediately, then again after every change.
    fn subscribe(&self, collection: &str) -> StoreResult<Subscription>;

    /// Create a document with a store-assigned id and return that id.
    fn create(&self, collection: &str, record: Value) -> StoreResult<String>;

    /// Replace (or create) the document at `document` in full.
    fn update(&self, document: &str, record: Value) -> StoreResult<()>;

    fn delete(&self, document: &str) -> StoreResult<()>;

    fn get_once(&self, document: &str) -> StoreResult<Option<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc;

    #[test]
    fn split_document_path() {
        assert_eq!(
            paths::split("users/u1/expenses/abc"),
            Some(("users/u1/expenses", "abc"))
        );
        assert_eq!(paths::split("abc"), None);
        assert_eq!(paths::split("users/"), None);
    }

    #[test]
    fn latest_keeps_only_newest_and_drop_deactivates() {
        let (tx, rx) = mpsc::channel();
        let active = Arc::new(AtomicBool::new(true));
        let sub = Subscription::new("users/u/expenses", rx, active.clone());
        for n in 0..3 {
            tx.send(Snapshot {
                collection: "users/u/expenses".into(),
                documents: vec![Document {
                    id: n.to_string(),
                    data: json!({"amount": n, "description": "d"}),
                }],
            })
            .unwrap();
        }
        let newest = sub.latest().unwrap();
        assert_eq!(newest.documents[0].id, "2");
        assert!(sub.latest().is_none());
        sub.cancel();
        assert!(!active.load(Ordering::SeqCst));
    }
}

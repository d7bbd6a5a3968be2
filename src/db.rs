// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{Document, Snapshot, Store, StoreResult, Subscription, paths};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pocketledger", "pocketledger"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("pocketledger.sqlite"))
}

pub fn open_or_init(path: Option<&Path>) -> Result<SqliteStore> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    SqliteStore::from_connection(conn).with_context(|| format!("Init schema at {}", path.display()))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS documents(
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        data TEXT NOT NULL,
        written_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY(collection, id)
    );
    CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
    "#,
    )
}

fn unavailable(err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

struct Listener {
    collection: String,
    sender: Sender<Snapshot>,
    active: Arc<AtomicBool>,
}

/// Document store on a single SQLite table. Subscribers in the same process
/// get a fresh snapshot after every write to their collection.
pub struct SqliteStore {
    conn: Connection,
    listeners: RefCell<Vec<Listener>>,
}

impl SqliteStore {
    pub fn from_connection(conn: Connection) -> rusqlite::Result<Self> {
        init_schema(&conn)?;
        Ok(SqliteStore {
            conn,
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.active.load(Ordering::SeqCst))
            .count()
    }

    fn snapshot(&self, collection: &str) -> StoreResult<Snapshot> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, data FROM documents WHERE collection=?1 ORDER BY rowid")
            .map_err(unavailable)?;
        let rows = stmt
            .query_map(params![collection], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })
            .map_err(unavailable)?;
        let mut documents = Vec::new();
        for row in rows {
            let (id, raw) = row.map_err(unavailable)?;
            let data: Value = serde_json::from_str(&raw).map_err(unavailable)?;
            documents.push(Document { id, data });
        }
        Ok(Snapshot {
            collection: collection.to_string(),
            documents,
        })
    }

    fn publish(&self, collection: &str) -> StoreResult<()> {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|l| l.active.load(Ordering::SeqCst));
        if !listeners.iter().any(|l| l.collection == collection) {
            return Ok(());
        }
        let snapshot = self.snapshot(collection)?;
        listeners.retain(|l| l.collection != collection || l.sender.send(snapshot.clone()).is_ok());
        debug!(collection, documents = snapshot.documents.len(), "Published snapshot");
        Ok(())
    }
}

impl Store for SqliteStore {
    fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        let (sender, receiver) = mpsc::channel();
        let active = Arc::new(AtomicBool::new(true));
        sender
            .send(self.snapshot(collection)?)
            .map_err(unavailable)?;
        self.listeners.borrow_mut().push(Listener {
            collection: collection.to_string(),
            sender,
            active: active.clone(),
        });
        info!(collection, "Subscribed");
        Ok(Subscription::new(collection, receiver, active))
    }

    fn create(&self, collection: &str, record: Value) -> StoreResult<String> {
        let id: String = self
            .conn
            .query_row(
                "INSERT INTO documents(collection, id, data) VALUES (?1, lower(hex(randomblob(10))), ?2)
                 RETURNING id",
                params![collection, record.to_string()],
                |r| r.get(0),
            )
            .map_err(unavailable)?;
        self.publish(collection)?;
        Ok(id)
    }

    fn update(&self, document: &str, record: Value) -> StoreResult<()> {
        let (collection, id) = paths::split(document)
            .ok_or_else(|| unavailable(format!("Invalid document path '{}'", document)))?;
        self.conn
            .execute(
                "INSERT INTO documents(collection, id, data) VALUES (?1, ?2, ?3)
                 ON CONFLICT(collection, id) DO UPDATE SET data=excluded.data, written_at=datetime('now')",
                params![collection, id, record.to_string()],
            )
            .map_err(unavailable)?;
        self.publish(collection)
    }

    fn delete(&self, document: &str) -> StoreResult<()> {
        let (collection, id) = paths::split(document)
            .ok_or_else(|| unavailable(format!("Invalid document path '{}'", document)))?;
        self.conn
            .execute(
                "DELETE FROM documents WHERE collection=?1 AND id=?2",
                params![collection, id],
            )
            .map_err(unavailable)?;
        self.publish(collection)
    }

    fn get_once(&self, document: &str) -> StoreResult<Option<Value>> {
        let (collection, id) = paths::split(document)
            .ok_or_else(|| unavailable(format!("Invalid document path '{}'", document)))?;
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM documents WHERE collection=?1 AND id=?2",
                params![collection, id],
                |r| r.get(0),
            )
            .optional()
            .map_err(unavailable)?;
        raw.map(|s| serde_json::from_str(&s).map_err(unavailable))
            .transpose()
    }
}

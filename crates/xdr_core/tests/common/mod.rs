#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::{json, Value};

use xdr_core::db;
use xdr_core::error::AppError;
use xdr_core::store::{Collection, EntityStore, ListQuery, Record, SqliteStore};

/// Wraps a store, counting calls and optionally failing them.
pub struct RecordingStore<S> {
    inner: S,
    pub lists: RefCell<Vec<ListQuery>>,
    pub writes: Cell<usize>,
    pub fail_lists: Cell<bool>,
    pub fail_writes: Cell<bool>,
}

impl<S: EntityStore> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            lists: RefCell::new(Vec::new()),
            writes: Cell::new(0),
            fail_lists: Cell::new(false),
            fail_writes: Cell::new(false),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn list_count(&self) -> usize {
        self.lists.borrow().len()
    }

    pub fn last_list(&self) -> Option<ListQuery> {
        self.lists.borrow().last().cloned()
    }

    pub fn reset(&self) {
        self.lists.borrow_mut().clear();
        self.writes.set(0);
    }

    fn offline() -> AppError {
        AppError::new("STORE_UNAVAILABLE", "Store unreachable").with_retryable(true)
    }
}

impl<S: EntityStore> EntityStore for RecordingStore<S> {
    fn list(&self, query: &ListQuery) -> Result<Vec<Record>, AppError> {
        self.lists.borrow_mut().push(query.clone());
        if self.fail_lists.get() {
            return Err(Self::offline());
        }
        self.inner.list(query)
    }

    fn insert(&self, collection: Collection, fields: Record) -> Result<Record, AppError> {
        self.writes.set(self.writes.get() + 1);
        if self.fail_writes.get() {
            return Err(Self::offline());
        }
        self.inner.insert(collection, fields)
    }

    fn update(&self, collection: Collection, id: &str, fields: Record) -> Result<(), AppError> {
        self.writes.set(self.writes.get() + 1);
        if self.fail_writes.get() {
            return Err(Self::offline());
        }
        self.inner.update(collection, id, fields)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), AppError> {
        self.writes.set(self.writes.get() + 1);
        if self.fail_writes.get() {
            return Err(Self::offline());
        }
        self.inner.delete(collection, id)
    }
}

pub fn memory_store(owner: &str) -> SqliteStore {
    let mut conn = db::open_in_memory().expect("open");
    db::migrate(&mut conn).expect("migrate");
    SqliteStore::new(conn, owner)
}

pub fn recording_store(owner: &str) -> Rc<RecordingStore<SqliteStore>> {
    Rc::new(RecordingStore::new(memory_store(owner)))
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Inserts an alert created `hour` hours into 2026-01-01 and returns its id.
pub fn insert_alert(store: &impl EntityStore, severity: &str, status: &str, hour: u32) -> String {
    let stored = store
        .insert(
            Collection::Alerts,
            record(json!({
                "rule_name": format!("rule-{hour}"),
                "severity": severity,
                "status": status,
                "created_at": format!("2026-01-01T{hour:02}:00:00Z")
            })),
        )
        .expect("insert alert");
    stored["id"].as_str().expect("id").to_string()
}

pub fn insert_rule(store: &impl EntityStore, title: &str, status: &str, hour: u32) -> String {
    let stored = store
        .insert(
            Collection::DetectionRules,
            record(json!({
                "title": title,
                "severity": "high",
                "status": status,
                "created_at": format!("2026-01-01T{hour:02}:00:00Z")
            })),
        )
        .expect("insert rule");
    stored["id"].as_str().expect("id").to_string()
}

//! Entity store client: a generic list/insert/update/delete surface over the three
//! collections the dashboard works with.
//!
//! Records cross this boundary as open JSON objects; typed decoding happens at the caller via
//! [`decode_records`]. The store is the authority for ownership, ids, defaults and
//! timestamps. Callers never patch a local copy after a write; they list again.

pub mod sqlite;

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::JsonMap;
use crate::error::AppError;

pub use sqlite::SqliteStore;

pub type Record = JsonMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Alerts,
    Incidents,
    DetectionRules,
}

impl Collection {
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Alerts => "alerts",
            Collection::Incidents => "incidents",
            Collection::DetectionRules => "detection_rules",
        }
    }
}

/// Single-field equality predicate. Filters do not compose.
#[derive(Debug, Clone, PartialEq)]
pub struct EqFilter {
    pub field: String,
    pub value: Value,
}

impl EqFilter {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    /// `created_at` descending; every dashboard list uses this ordering.
    pub fn newest_first() -> Self {
        Self {
            field: "created_at".to_string(),
            descending: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub collection: Collection,
    pub filter: Option<EqFilter>,
    pub order: OrderBy,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            filter: None,
            order: OrderBy::newest_first(),
            limit: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<EqFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order = OrderBy {
            field: field.into(),
            descending,
        };
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

pub trait EntityStore {
    fn list(&self, query: &ListQuery) -> Result<Vec<Record>, AppError>;

    /// Inserts `fields` and returns the stored record with store-assigned defaults applied.
    fn insert(&self, collection: Collection, fields: Record) -> Result<Record, AppError>;

    fn update(&self, collection: Collection, id: &str, fields: Record) -> Result<(), AppError>;

    fn delete(&self, collection: Collection, id: &str) -> Result<(), AppError>;
}

impl<S: EntityStore + ?Sized> EntityStore for &S {
    fn list(&self, query: &ListQuery) -> Result<Vec<Record>, AppError> {
        (**self).list(query)
    }

    fn insert(&self, collection: Collection, fields: Record) -> Result<Record, AppError> {
        (**self).insert(collection, fields)
    }

    fn update(&self, collection: Collection, id: &str, fields: Record) -> Result<(), AppError> {
        (**self).update(collection, id, fields)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), AppError> {
        (**self).delete(collection, id)
    }
}

impl<S: EntityStore + ?Sized> EntityStore for Rc<S> {
    fn list(&self, query: &ListQuery) -> Result<Vec<Record>, AppError> {
        (**self).list(query)
    }

    fn insert(&self, collection: Collection, fields: Record) -> Result<Record, AppError> {
        (**self).insert(collection, fields)
    }

    fn update(&self, collection: Collection, id: &str, fields: Record) -> Result<(), AppError> {
        (**self).update(collection, id, fields)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), AppError> {
        (**self).delete(collection, id)
    }
}

pub fn decode_record<T: DeserializeOwned>(record: Record) -> Result<T, AppError> {
    let id = record
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("<none>")
        .to_string();
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        AppError::new("STORE_DECODE_FAILED", "Failed to decode store record")
            .with_details(format!("id={id}; err={e}"))
    })
}

pub fn decode_records<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>, AppError> {
    records.into_iter().map(decode_record).collect()
}

/// Lists and decodes in one step.
pub fn list_as<T: DeserializeOwned>(
    store: &impl EntityStore,
    query: &ListQuery,
) -> Result<Vec<T>, AppError> {
    decode_records(store.list(query)?)
}

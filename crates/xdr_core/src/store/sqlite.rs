use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::{Collection, EntityStore, ListQuery, Record};
use crate::clock::{normalize_rfc3339_utc, now_rfc3339_utc, Clock, SystemClock};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    /// JSON text holding a list or a map.
    Json,
    /// 0/1 integer.
    Bool,
    /// RFC3339 text, stored in the canonical UTC form.
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
struct Column {
    name: &'static str,
    kind: ColumnKind,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Text,
    }
}

const fn json(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Json,
    }
}

const fn boolean(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Bool,
    }
}

const fn timestamp(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Timestamp,
    }
}

const ALERT_COLUMNS: &[Column] = &[
    text("id"),
    text("user_id"),
    text("rule_id"),
    text("rule_name"),
    text("severity"),
    text("status"),
    text("event_id"),
    text("incident_id"),
    text("description"),
    json("matched_fields"),
    text("host_id"),
    text("user_id_alert"),
    boolean("false_positive"),
    text("assigned_to"),
    timestamp("created_at"),
    timestamp("updated_at"),
];

const INCIDENT_COLUMNS: &[Column] = &[
    text("id"),
    text("user_id"),
    text("title"),
    text("severity"),
    text("status"),
    json("alert_ids"),
    text("entity_type"),
    text("entity_id"),
    json("attack_chain"),
    text("assigned_to"),
    timestamp("created_at"),
    timestamp("updated_at"),
];

const RULE_COLUMNS: &[Column] = &[
    text("id"),
    text("user_id"),
    text("title"),
    text("description"),
    text("severity"),
    text("status"),
    json("detection"),
    json("fields"),
    json("false_positives"),
    json("tags"),
    json("rule_references"),
    timestamp("created_at"),
    timestamp("updated_at"),
];

/// Columns the store owns; callers can never write them.
const STORE_OWNED: &[&str] = &["id", "user_id"];

fn columns(collection: Collection) -> &'static [Column] {
    match collection {
        Collection::Alerts => ALERT_COLUMNS,
        Collection::Incidents => INCIDENT_COLUMNS,
        Collection::DetectionRules => RULE_COLUMNS,
    }
}

fn column(collection: Collection, field: &str) -> Result<Column, AppError> {
    columns(collection)
        .iter()
        .find(|c| c.name == field)
        .copied()
        .ok_or_else(|| {
            AppError::new("STORE_UNKNOWN_FIELD", "Unknown field for collection").with_details(
                format!("collection={}; field={field}", collection.table_name()),
            )
        })
}

fn select_list(collection: Collection) -> String {
    columns(collection)
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_sql_value(col: Column, value: &Value) -> Result<SqlValue, AppError> {
    let invalid = || {
        AppError::new("STORE_INVALID_VALUE", "Value does not fit field type")
            .with_details(format!("field={}; value={value}", col.name))
    };
    match (col.kind, value) {
        (_, Value::Null) => Ok(SqlValue::Null),
        (ColumnKind::Text, Value::String(s)) => Ok(SqlValue::Text(s.clone())),
        (ColumnKind::Text, _) => Err(invalid()),
        (ColumnKind::Bool, Value::Bool(b)) => Ok(SqlValue::Integer(i64::from(*b))),
        (ColumnKind::Bool, _) => Err(invalid()),
        (ColumnKind::Timestamp, Value::String(s)) => normalize_rfc3339_utc(s)
            .map(SqlValue::Text)
            .map_err(|e| {
                AppError::new("STORE_INVALID_VALUE", "Timestamp is not RFC3339").with_details(
                    format!("field={}; {}", col.name, e.details.unwrap_or_default()),
                )
            }),
        (ColumnKind::Timestamp, _) => Err(invalid()),
        (ColumnKind::Json, Value::Array(_) | Value::Object(_)) => {
            serde_json::to_string(value).map(SqlValue::Text).map_err(|e| {
                AppError::new("STORE_ENCODE_FAILED", "Failed to encode JSON field")
                    .with_details(format!("field={}; err={e}", col.name))
            })
        }
        (ColumnKind::Json, _) => Err(invalid()),
    }
}

fn from_sql_value(col: Column, value: SqlValue) -> Result<Value, AppError> {
    match (col.kind, value) {
        (_, SqlValue::Null) => Ok(Value::Null),
        (ColumnKind::Text | ColumnKind::Timestamp, SqlValue::Text(s)) => Ok(Value::String(s)),
        (ColumnKind::Bool, SqlValue::Integer(i)) => Ok(Value::Bool(i != 0)),
        (ColumnKind::Json, SqlValue::Text(s)) => serde_json::from_str(&s).map_err(|e| {
            AppError::new("STORE_DECODE_FAILED", "Failed to decode JSON field")
                .with_details(format!("field={}; err={e}", col.name))
        }),
        (_, other) => Err(
            AppError::new("STORE_DECODE_FAILED", "Unexpected column storage type")
                .with_details(format!("field={}; value={other:?}", col.name)),
        ),
    }
}

/// Entity store backed by a local SQLite workspace.
///
/// Every operation is scoped to `owner`: lists return only the owner's rows, inserts stamp
/// the owner, and updates/deletes of rows the owner does not hold fail as not found.
pub struct SqliteStore {
    conn: Connection,
    owner: String,
    clock: Box<dyn Clock>,
}

impl SqliteStore {
    pub fn new(conn: Connection, owner: impl Into<String>) -> Self {
        Self::with_clock(conn, owner, Box::new(SystemClock))
    }

    pub fn with_clock(conn: Connection, owner: impl Into<String>, clock: Box<dyn Clock>) -> Self {
        Self {
            conn,
            owner: owner.into(),
            clock,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn get_by_id(&self, collection: Collection, id: &str) -> Result<Record, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1 AND user_id = ?2",
            select_list(collection),
            collection.table_name()
        );
        let params = [
            SqlValue::Text(id.to_string()),
            SqlValue::Text(self.owner.clone()),
        ];
        let mut rows = self.query_records(collection, &sql, &params)?;
        rows.pop().ok_or_else(|| {
            AppError::new("STORE_NOT_FOUND", "Record not found")
                .with_details(format!("collection={}; id={id}", collection.table_name()))
        })
    }

    fn query_records(
        &self,
        collection: Collection,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Record>, AppError> {
        let cols = columns(collection);
        let mut stmt = self.conn.prepare(sql).map_err(|e| {
            AppError::new("STORE_QUERY_FAILED", "Failed to prepare list query")
                .with_details(e.to_string())
        })?;

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let mut raw = Vec::with_capacity(cols.len());
                for i in 0..cols.len() {
                    raw.push(row.get::<_, SqlValue>(i)?);
                }
                Ok(raw)
            })
            .map_err(|e| {
                AppError::new("STORE_QUERY_FAILED", "Failed to run list query")
                    .with_details(e.to_string())
            })?;

        let mut out = Vec::new();
        for r in rows {
            let raw = r.map_err(|e| {
                AppError::new("STORE_QUERY_FAILED", "Failed to read record row")
                    .with_details(e.to_string())
            })?;
            let mut record = Record::new();
            for (col, value) in cols.iter().zip(raw) {
                record.insert(col.name.to_string(), from_sql_value(*col, value)?);
            }
            out.push(record);
        }
        Ok(out)
    }

    fn writable_column(collection: Collection, field: &str) -> Result<Column, AppError> {
        if STORE_OWNED.contains(&field) {
            return Err(
                AppError::new("STORE_READONLY_FIELD", "Field is assigned by the store")
                    .with_details(format!("field={field}")),
            );
        }
        column(collection, field)
    }
}

impl EntityStore for SqliteStore {
    fn list(&self, query: &ListQuery) -> Result<Vec<Record>, AppError> {
        let collection = query.collection;
        let mut sql = format!(
            "SELECT {} FROM {} WHERE user_id = ?1",
            select_list(collection),
            collection.table_name()
        );
        let mut params = vec![SqlValue::Text(self.owner.clone())];

        if let Some(filter) = &query.filter {
            let col = column(collection, &filter.field)?;
            params.push(to_sql_value(col, &filter.value)?);
            sql.push_str(&format!(" AND {} = ?{}", col.name, params.len()));
        }

        let order_col = column(collection, &query.order.field)?;
        let dir = if query.order.descending { "DESC" } else { "ASC" };
        // rowid breaks ties so records stamped in the same instant keep insertion order.
        sql.push_str(&format!(" ORDER BY {} {dir}, rowid {dir}", order_col.name));

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let records = self.query_records(collection, &sql, &params)?;
        debug!(
            collection = collection.table_name(),
            filter = ?query.filter,
            limit = ?query.limit,
            rows = records.len(),
            "listed records"
        );
        Ok(records)
    }

    fn insert(&self, collection: Collection, fields: Record) -> Result<Record, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339_utc(self.clock.as_ref())?;

        let mut names = vec!["id", "user_id"];
        let mut params = vec![SqlValue::Text(id.clone()), SqlValue::Text(self.owner.clone())];

        // A caller-supplied created_at also seeds updated_at when that is absent.
        let stamp = fields
            .get("created_at")
            .map(|value| to_sql_value(column(collection, "created_at")?, value))
            .transpose()?
            .unwrap_or(SqlValue::Text(now));
        for name in ["created_at", "updated_at"] {
            if !fields.contains_key(name) {
                names.push(name);
                params.push(stamp.clone());
            }
        }

        for (field, value) in &fields {
            let col = Self::writable_column(collection, field)?;
            names.push(col.name);
            params.push(to_sql_value(col, value)?);
        }

        let placeholders = (1..=params.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            collection.table_name(),
            names.join(", ")
        );

        self.conn
            .execute(&sql, params_from_iter(params.iter()))
            .map_err(|e| {
                AppError::new("STORE_WRITE_FAILED", "Failed to insert record")
                    .with_details(format!("collection={}; err={e}", collection.table_name()))
            })?;

        debug!(collection = collection.table_name(), %id, "inserted record");
        self.get_by_id(collection, &id)
    }

    fn update(&self, collection: Collection, id: &str, fields: Record) -> Result<(), AppError> {
        if fields.is_empty() {
            return Err(AppError::new("STORE_EMPTY_UPDATE", "Update has no fields")
                .with_details(format!("id={id}")));
        }

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for (field, value) in &fields {
            let col = Self::writable_column(collection, field)?;
            params.push(to_sql_value(col, value)?);
            assignments.push(format!("{} = ?{}", col.name, params.len()));
        }
        params.push(SqlValue::Text(id.to_string()));
        let id_idx = params.len();
        params.push(SqlValue::Text(self.owner.clone()));
        let owner_idx = params.len();

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{id_idx} AND user_id = ?{owner_idx}",
            collection.table_name(),
            assignments.join(", ")
        );
        let changed = self
            .conn
            .execute(&sql, params_from_iter(params.iter()))
            .map_err(|e| {
                AppError::new("STORE_WRITE_FAILED", "Failed to update record")
                    .with_details(format!("collection={}; err={e}", collection.table_name()))
            })?;
        if changed == 0 {
            return Err(AppError::new("STORE_NOT_FOUND", "Record not found")
                .with_details(format!("collection={}; id={id}", collection.table_name())));
        }

        debug!(collection = collection.table_name(), id, "updated record");
        Ok(())
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), AppError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = ?1 AND user_id = ?2",
            collection.table_name()
        );
        let changed = self
            .conn
            .execute(&sql, [id, self.owner.as_str()])
            .map_err(|e| {
                AppError::new("STORE_WRITE_FAILED", "Failed to delete record")
                    .with_details(format!("collection={}; err={e}", collection.table_name()))
            })?;
        if changed == 0 {
            return Err(AppError::new("STORE_NOT_FOUND", "Record not found")
                .with_details(format!("collection={}; id={id}", collection.table_name())));
        }

        debug!(collection = collection.table_name(), id, "deleted record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::EqFilter;
    use serde_json::json;

    fn store(owner: &str) -> SqliteStore {
        let mut conn = db::open_in_memory().expect("open");
        db::migrate(&mut conn).expect("migrate");
        SqliteStore::new(conn, owner)
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn insert_applies_store_defaults() {
        let s = store("u1");
        let rule = s
            .insert(
                Collection::DetectionRules,
                record(json!({"title": "Mimikatz", "severity": "critical"})),
            )
            .expect("insert");

        assert_eq!(rule["user_id"], json!("u1"));
        assert_eq!(rule["status"], json!("active"));
        assert_eq!(rule["detection"], json!({}));
        assert_eq!(rule["rule_references"], json!([]));
        assert_eq!(rule["description"], Value::Null);
        assert_eq!(rule["created_at"], rule["updated_at"]);
        assert!(rule["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[test]
    fn unknown_and_store_owned_fields_are_rejected() {
        let s = store("u1");
        let err = s
            .insert(
                Collection::Incidents,
                record(json!({"title": "x", "severity": "low", "priority": 1})),
            )
            .unwrap_err();
        assert_eq!(err.code, "STORE_UNKNOWN_FIELD");

        let err = s
            .insert(
                Collection::Incidents,
                record(json!({"title": "x", "severity": "low", "user_id": "u2"})),
            )
            .unwrap_err();
        assert_eq!(err.code, "STORE_READONLY_FIELD");

        let q = ListQuery::new(Collection::Alerts).with_filter(Some(EqFilter::new("nope", "x")));
        assert_eq!(s.list(&q).unwrap_err().code, "STORE_UNKNOWN_FIELD");
    }

    #[test]
    fn schema_rejects_values_outside_closed_sets() {
        let s = store("u1");
        let err = s
            .insert(
                Collection::Incidents,
                record(json!({"title": "x", "severity": "urgent"})),
            )
            .unwrap_err();
        assert_eq!(err.code, "STORE_WRITE_FAILED");
    }

    #[test]
    fn rows_are_scoped_to_owner() {
        let mut conn = db::open_in_memory().expect("open");
        db::migrate(&mut conn).expect("migrate");
        let a = SqliteStore::new(conn, "alice");
        let inc = a
            .insert(
                Collection::Incidents,
                record(json!({"title": "Alice's", "severity": "high"})),
            )
            .unwrap();
        let id = inc["id"].as_str().unwrap().to_string();

        // Reuse the same database under a different owner.
        let b = SqliteStore::new(a.conn, "bob");
        assert!(b.list(&ListQuery::new(Collection::Incidents)).unwrap().is_empty());
        let err = b
            .update(
                Collection::Incidents,
                &id,
                record(json!({"status": "closed"})),
            )
            .unwrap_err();
        assert_eq!(err.code, "STORE_NOT_FOUND");
        assert_eq!(
            b.delete(Collection::Incidents, &id).unwrap_err().code,
            "STORE_NOT_FOUND"
        );
    }

    #[test]
    fn bool_and_json_columns_round_trip_through_sqlite() {
        let s = store("u1");
        let alert = s
            .insert(
                Collection::Alerts,
                record(json!({
                    "rule_name": "Beaconing",
                    "severity": "medium",
                    "matched_fields": {"dst_port": 4444, "proc": "rundll32.exe"},
                    "false_positive": true
                })),
            )
            .unwrap();
        assert_eq!(alert["status"], json!("new"));
        assert_eq!(alert["false_positive"], json!(true));
        assert_eq!(alert["matched_fields"]["dst_port"], json!(4444));

        let q = ListQuery::new(Collection::Alerts)
            .with_filter(Some(EqFilter::new("false_positive", true)));
        assert_eq!(s.list(&q).unwrap().len(), 1);
    }

    #[test]
    fn empty_update_is_an_error() {
        let s = store("u1");
        let err = s
            .update(Collection::Alerts, "missing", Record::new())
            .unwrap_err();
        assert_eq!(err.code, "STORE_EMPTY_UPDATE");
    }

    fn titles(s: &SqliteStore) -> Vec<String> {
        s.list(&ListQuery::new(Collection::Incidents))
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn caller_timestamps_are_stored_in_utc_and_sort_by_instant() {
        let s = store("u1");
        for (title, created_at) in [
            ("0800Z via +02:00", "2026-01-01T10:00:00+02:00"),
            ("0900Z", "2026-01-01T09:00:00Z"),
            ("0900Z and a half", "2026-01-01T09:00:00.5Z"),
        ] {
            s.insert(
                Collection::Incidents,
                record(json!({"title": title, "severity": "low", "created_at": created_at})),
            )
            .unwrap();
        }

        assert_eq!(titles(&s), vec!["0900Z and a half", "0900Z", "0800Z via +02:00"]);

        let oldest = s.list(&ListQuery::new(Collection::Incidents)).unwrap()[2].clone();
        assert_eq!(oldest["created_at"], json!("2026-01-01T08:00:00.000000Z"));
        assert_eq!(oldest["updated_at"], oldest["created_at"]);
    }

    #[test]
    fn unparsable_timestamps_are_rejected() {
        let s = store("u1");
        let err = s
            .insert(
                Collection::Incidents,
                record(json!({"title": "x", "severity": "low", "created_at": "yesterday"})),
            )
            .unwrap_err();
        assert_eq!(err.code, "STORE_INVALID_VALUE");
        assert!(titles(&s).is_empty());

        let inc = s
            .insert(
                Collection::Incidents,
                record(json!({"title": "x", "severity": "low"})),
            )
            .unwrap();
        let err = s
            .update(
                Collection::Incidents,
                inc["id"].as_str().unwrap(),
                record(json!({"updated_at": 1767225600})),
            )
            .unwrap_err();
        assert_eq!(err.code, "STORE_INVALID_VALUE");
    }
}

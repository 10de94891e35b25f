//! Local SQLite workspaces standing in for the hosted entity store.

use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::error::AppError;
use crate::store::SqliteStore;

const TABLES: [&str; 3] = ["alerts", "incidents", "detection_rules"];

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct WorkspaceMetadata {
    pub db_path: String,
    pub is_empty: bool,
}

fn validate_db_path(path: &Path) -> Result<(), AppError> {
    if path.as_os_str().is_empty() {
        return Err(AppError::new(
            "WORKSPACE_INVALID_PATH",
            "Workspace DB path is empty",
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            "WORKSPACE_INVALID_PATH",
            "Workspace DB path must be a file (not a directory)",
        )
        .with_details(path.display().to_string()));
    }
    Ok(())
}

fn is_empty_conn(conn: &Connection) -> Result<bool, AppError> {
    for table in TABLES {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .map_err(|e| {
                AppError::new(
                    "DB_QUERY_FAILED",
                    "Failed to count records for workspace emptiness check",
                )
                .with_details(format!("table={table}; err={e}"))
            })?;
        if count > 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Opens `db_path` and applies pending migrations. Open failures are reported as `open_code`.
fn open_and_migrate(db_path: &Path, open_code: &str) -> Result<Connection, AppError> {
    let mut conn = crate::db::open(db_path).map_err(|e| {
        let details = e.details.clone().unwrap_or_else(|| e.to_string());
        AppError::new(open_code, "Failed to open workspace database").with_details(details)
    })?;

    crate::db::migrate(&mut conn).map_err(|e| {
        let details = e.details.clone().unwrap_or_else(|| e.to_string());
        AppError::new(
            "WORKSPACE_MIGRATION_FAILED",
            "Failed to migrate workspace database",
        )
        .with_details(details)
    })?;

    Ok(conn)
}

pub fn open_workspace_connection(db_path: &Path) -> Result<Connection, AppError> {
    validate_db_path(db_path)?;

    if !db_path.is_file() {
        return Err(AppError::new(
            "WORKSPACE_DB_NOT_FOUND",
            "Workspace database file not found",
        )
        .with_details(db_path.display().to_string()));
    }

    let conn = open_and_migrate(db_path, "WORKSPACE_OPEN_FAILED")?;
    info!(path = %db_path.display(), "opened workspace");
    Ok(conn)
}

pub fn create_workspace_connection(db_path: &Path) -> Result<Connection, AppError> {
    validate_db_path(db_path)?;

    if db_path.exists() {
        return Err(AppError::new(
            "WORKSPACE_CREATE_FAILED",
            "Workspace DB file already exists",
        )
        .with_details(db_path.display().to_string()));
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::new(
                "WORKSPACE_CREATE_FAILED",
                "Failed to create workspace directory",
            )
            .with_details(format!("path={}; err={}", parent.display(), e))
        })?;
    }

    // SQLite creates the file on first open.
    let conn = open_and_migrate(db_path, "WORKSPACE_CREATE_FAILED")?;
    info!(path = %db_path.display(), "created workspace");
    Ok(conn)
}

/// Opens the workspace at `db_path`, creating it first when the file does not exist yet.
pub fn open_or_create_workspace_connection(db_path: &Path) -> Result<Connection, AppError> {
    if db_path.exists() {
        open_workspace_connection(db_path)
    } else {
        create_workspace_connection(db_path)
    }
}

/// Entity store over the workspace at `db_path`, scoped to `owner`.
pub fn open_workspace_store(db_path: &Path, owner: &str) -> Result<SqliteStore, AppError> {
    let conn = open_or_create_workspace_connection(db_path)?;
    Ok(SqliteStore::new(conn, owner))
}

pub fn open_workspace(db_path: &Path) -> Result<WorkspaceMetadata, AppError> {
    let conn = open_workspace_connection(db_path)?;
    metadata(db_path, &conn)
}

pub fn create_workspace(db_path: &Path) -> Result<WorkspaceMetadata, AppError> {
    let conn = create_workspace_connection(db_path)?;
    metadata(db_path, &conn)
}

fn metadata(db_path: &Path, conn: &Connection) -> Result<WorkspaceMetadata, AppError> {
    Ok(WorkspaceMetadata {
        db_path: db_path.to_string_lossy().to_string(),
        is_empty: is_empty_conn(conn)?,
    })
}

pub fn db_is_empty(db_path: &Path) -> Result<bool, AppError> {
    let conn = open_workspace_connection(db_path)?;
    is_empty_conn(&conn)
}

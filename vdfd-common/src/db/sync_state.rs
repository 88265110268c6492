//! Per-record sync state columns shared by the leads and routes tables

use crate::store::SyncState;
use crate::Result;
use sqlx::{Row, SqlitePool};

/// Tables carrying `sync_state` / `sync_error` columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncedTable {
    Leads,
    Routes,
}

impl SyncedTable {
    fn name(&self) -> &'static str {
        match self {
            SyncedTable::Leads => "leads",
            SyncedTable::Routes => "routes",
        }
    }
}

/// Record the outcome of the latest remote push
///
/// Returns false when no row has that id (deleted in the meantime).
pub async fn set_sync_state(
    db: &SqlitePool,
    table: SyncedTable,
    id: &str,
    state: &SyncState,
) -> Result<bool> {
    let sql = format!(
        "UPDATE {} SET sync_state = ?, sync_error = ? WHERE id = ?",
        table.name()
    );
    let result = sqlx::query(&sql)
        .bind(state.as_str())
        .bind(state.error())
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_sync_state(
    db: &SqlitePool,
    table: SyncedTable,
    id: &str,
) -> Result<Option<SyncState>> {
    let sql = format!(
        "SELECT sync_state, sync_error FROM {} WHERE id = ?",
        table.name()
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(db).await?;

    Ok(row.map(|row| {
        SyncState::from_parts(
            &row.get::<String, _>("sync_state"),
            row.get::<Option<String>, _>("sync_error"),
        )
    }))
}

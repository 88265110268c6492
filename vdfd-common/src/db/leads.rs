//! Lead table queries
//!
//! The full record is stored as JSON in `body`; `user_id`, `created_at`,
//! `status` and `priority_rating` are duplicated into indexed columns for
//! lookups.

use crate::models::Lead;
use crate::Result;
use sqlx::{Row, SqlitePool};

/// Insert or replace a lead
///
/// Every write resets the row to `pending` until the next remote push
/// records its outcome.
pub async fn upsert_lead(db: &SqlitePool, lead: &Lead) -> Result<()> {
    let body = serde_json::to_string(lead)?;

    sqlx::query(
        r#"
        INSERT INTO leads (id, user_id, created_at, updated_at, status, priority_rating,
                           distress_score, body, sync_state, sync_error)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending', NULL)
        ON CONFLICT(id) DO UPDATE SET
            user_id = excluded.user_id,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at,
            status = excluded.status,
            priority_rating = excluded.priority_rating,
            distress_score = excluded.distress_score,
            body = excluded.body,
            sync_state = 'pending',
            sync_error = NULL
        "#,
    )
    .bind(&lead.id)
    .bind(&lead.user_id)
    .bind(lead.created_at)
    .bind(lead.updated_at)
    .bind(lead.status.as_str())
    .bind(lead.priority_rating.value() as i64)
    .bind(lead.distress_score as i64)
    .bind(body)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn get_lead(db: &SqlitePool, id: &str) -> Result<Option<Lead>> {
    let body: Option<String> = sqlx::query_scalar("SELECT body FROM leads WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;

    body.map(|b| serde_json::from_str::<Lead>(&b).map_err(Into::into))
        .transpose()
}

/// All leads owned by `user_id`, newest first
pub async fn list_leads_for_user(db: &SqlitePool, user_id: &str) -> Result<Vec<Lead>> {
    let rows = sqlx::query(
        "SELECT body FROM leads WHERE user_id = ? ORDER BY created_at DESC, id ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    decode_rows(rows)
}

/// Leads owned by `user_id` whose latest write has not reached the remote
pub async fn list_unsynced_leads(db: &SqlitePool, user_id: &str) -> Result<Vec<Lead>> {
    let rows = sqlx::query(
        r#"
        SELECT body FROM leads
        WHERE user_id = ? AND sync_state != 'synced'
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    decode_rows(rows)
}

/// Delete a lead; returns whether a row existed
pub async fn delete_lead(db: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM leads WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn decode_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<Lead>> {
    rows.iter()
        .map(|row| {
            let body: String = row.get("body");
            serde_json::from_str::<Lead>(&body).map_err(Into::into)
        })
        .collect()
}

//! Route table queries

use crate::models::Route;
use crate::Result;
use sqlx::{Row, SqlitePool};

/// Insert or replace a route, resetting its sync state to `pending`
pub async fn upsert_route(db: &SqlitePool, route: &Route) -> Result<()> {
    let body = serde_json::to_string(route)?;

    sqlx::query(
        r#"
        INSERT INTO routes (id, user_id, created_at, updated_at, name, body, sync_state, sync_error)
        VALUES (?, ?, ?, ?, ?, ?, 'pending', NULL)
        ON CONFLICT(id) DO UPDATE SET
            user_id = excluded.user_id,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at,
            name = excluded.name,
            body = excluded.body,
            sync_state = 'pending',
            sync_error = NULL
        "#,
    )
    .bind(&route.id)
    .bind(&route.user_id)
    .bind(route.created_at)
    .bind(route.updated_at)
    .bind(&route.name)
    .bind(body)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn get_route(db: &SqlitePool, id: &str) -> Result<Option<Route>> {
    let body: Option<String> = sqlx::query_scalar("SELECT body FROM routes WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;

    body.map(|b| serde_json::from_str::<Route>(&b).map_err(Into::into))
        .transpose()
}

/// All routes owned by `user_id`, newest first
pub async fn list_routes_for_user(db: &SqlitePool, user_id: &str) -> Result<Vec<Route>> {
    let rows = sqlx::query(
        "SELECT body FROM routes WHERE user_id = ? ORDER BY created_at DESC, id ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    decode_rows(rows)
}

pub async fn list_unsynced_routes(db: &SqlitePool, user_id: &str) -> Result<Vec<Route>> {
    let rows = sqlx::query(
        r#"
        SELECT body FROM routes
        WHERE user_id = ? AND sync_state != 'synced'
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    decode_rows(rows)
}

pub async fn delete_route(db: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM routes WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn decode_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<Route>> {
    rows.iter()
        .map(|row| {
            let body: String = row.get("body");
            serde_json::from_str::<Route>(&body).map_err(Into::into)
        })
        .collect()
}

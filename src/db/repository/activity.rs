use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;
pub const MAX_ACTIVITY_LIMIT: i64 = 500;

/// Clamp a requested feed size to `1..=MAX_ACTIVITY_LIMIT`.
pub fn clamp_activity_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT)
}

/// Append an entry to the activity feed. Callers pass their open
/// transaction so the entry commits with the change it describes.
pub fn log_activity(
    conn: &Connection,
    action: ActivityAction,
    entity_type: EntityType,
    entity_id: Option<i64>,
    description: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO activity_log (action, entity_type, entity_id, description)
         VALUES (?1, ?2, ?3, ?4)",
        params![action, entity_type, entity_id, description],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Newest entries first.
pub fn list_activity(conn: &Connection, limit: i64) -> Result<Vec<ActivityLogItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT log_id, action, entity_type, entity_id, description, created_at
         FROM activity_log
         ORDER BY created_at DESC, log_id DESC
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![clamp_activity_limit(Some(limit))], |row| {
            Ok(ActivityLogItem {
                log_id: row.get(0)?,
                action: row.get(1)?,
                entity_type: row.get(2)?,
                entity_id: row.get(3)?,
                description: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

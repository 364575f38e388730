use std::time::Instant;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;

use crate::db::DatabaseError;
use crate::lab::sql_guard::{self, SqlGuardError};
use crate::models::SqlQueryResult;

pub const DEFAULT_SQL_ROW_CAP: usize = 1000;

impl From<SqlGuardError> for DatabaseError {
    fn from(err: SqlGuardError) -> Self {
        DatabaseError::invalid(err.to_string())
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(hex::encode(b)),
    }
}

/// Run a console query. The text guard runs first, then SQLite itself
/// must report the prepared statement as read-only. At most `row_cap`
/// rows are returned.
///
/// `conn` should be opened with `open_read_only`.
pub fn run_read_only_query(
    conn: &Connection,
    query: &str,
    row_cap: usize,
) -> Result<SqlQueryResult, DatabaseError> {
    let statement = sql_guard::validate(query)?;
    let started = Instant::now();

    let mut stmt = conn
        .prepare(statement)
        .map_err(|e| DatabaseError::invalid(format!("Query failed: {e}")))?;
    if !stmt.readonly() {
        return Err(SqlGuardError::NotSelect.into());
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
    let width = columns.len();
    let mut rows = stmt
        .query([])
        .map_err(|e| DatabaseError::invalid(format!("Query failed: {e}")))?;

    let mut out = Vec::new();
    let mut truncated = false;
    while let Some(row) = rows
        .next()
        .map_err(|e| DatabaseError::invalid(format!("Query failed: {e}")))?
    {
        if out.len() == row_cap {
            truncated = true;
            break;
        }
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(json_value(row.get_ref(i)?));
        }
        out.push(values);
    }

    let time_ms = started.elapsed().as_secs_f64() * 1000.0;
    tracing::info!(rows = out.len(), truncated, time_ms, "SQL console query");
    Ok(SqlQueryResult {
        columns,
        row_count: out.len(),
        rows: out,
        time_ms,
        truncated,
    })
}

use chrono::Utc;
use rusqlite::{params, Connection};

use super::OptionalExt;

/// One scrape run outcome, newest first in `latest`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEntry {
    pub id: i64,
    pub update_time: String,
    pub status: String,
}

/// Record a run outcome stamped with the current time.
pub fn record(conn: &Connection, status: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO update_history (update_time, status) VALUES (?1, ?2)",
        params![Utc::now().to_rfc3339(), status],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn latest(conn: &Connection) -> rusqlite::Result<Option<UpdateEntry>> {
    conn.query_row(
        "SELECT id, update_time, status FROM update_history ORDER BY id DESC LIMIT 1",
        [],
        |row| {
            Ok(UpdateEntry {
                id: row.get(0)?,
                update_time: row.get(1)?,
                status: row.get(2)?,
            })
        },
    )
    .optional()
}

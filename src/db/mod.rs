pub mod breaches;
pub mod locations;
pub mod migrations;
pub mod products;
pub mod sites;
pub mod sponsors;
pub mod terms;
pub mod third_parties;
pub mod trials;
pub mod update_history;

use std::path::Path;

use rusqlite::Connection;

/// Open or create the SQLite database at the given path.
///
/// Sets WAL journal mode and enables foreign keys.
/// Creates parent directories if needed.
pub fn open_or_create(path: &Path) -> rusqlite::Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                Some(format!("Cannot create directory {}: {}", parent.display(), e)),
            )
        })?;
    }

    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Returns the default database path: `~/.local/share/ctis-scraper/ctis.db`
pub fn default_db_path() -> std::path::PathBuf {
    let data_dir = dirs::data_local_dir().expect("Could not determine local data directory");
    data_dir.join("ctis-scraper").join("ctis.db")
}

/// Delete all scraped trial data, keeping `locations` (accumulated
/// geocoordinates survive a fresh run) and `update_history`.
///
/// Junction rows and serious breaches go with their parents via
/// ON DELETE CASCADE.
pub fn clear_trial_data(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        DELETE FROM trials;
        DELETE FROM sites;
        DELETE FROM sponsors;
        DELETE FROM third_parties;
        DELETE FROM duties;
        DELETE FROM products;
        DELETE FROM substances;
        DELETE FROM administration_routes;
        DELETE FROM therapeutic_areas;
        DELETE FROM conditions;
        DELETE FROM impacted_areas;
        DELETE FROM breach_categories;
        ",
    )
}

/// Extension trait to convert rusqlite::Error to Option for query_row.
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Create an in-memory database with migrations applied, for testing.
#[cfg(test)]
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.pragma_update(None, "foreign_keys", "ON").expect("enable foreign keys");
    migrations::migrate(&conn).expect("run migrations");
    conn
}

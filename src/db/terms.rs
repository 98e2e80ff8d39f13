//! Name-keyed catalogs: medical conditions and therapeutic areas.

use rusqlite::{params, Connection};

use super::OptionalExt;

pub fn find_or_create_condition(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    find_or_create_named(conn, "conditions", name)
}

pub fn find_or_create_therapeutic_area(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    find_or_create_named(conn, "therapeutic_areas", name)
}

/// Shared find-or-create over an (id, name) catalog table.
pub(crate) fn find_or_create_named(
    conn: &Connection,
    table: &str,
    name: &str,
) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE name = ?1"),
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        &format!("INSERT INTO {table} (name) VALUES (?1)"),
        params![name],
    )?;
    Ok(conn.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn test_condition_names_deduplicate() {
        let conn = test_db();
        let id1 = find_or_create_condition(&conn, "Severe asthma").unwrap();
        let id2 = find_or_create_condition(&conn, "Severe asthma").unwrap();
        let id3 = find_or_create_condition(&conn, "Mild asthma").unwrap();
        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_catalogs_are_independent() {
        let conn = test_db();
        find_or_create_condition(&conn, "Asthma").unwrap();
        find_or_create_therapeutic_area(&conn, "Respiratory").unwrap();

        let conditions: i64 = conn
            .query_row("SELECT COUNT(*) FROM conditions", [], |row| row.get(0))
            .unwrap();
        let areas: i64 = conn
            .query_row("SELECT COUNT(*) FROM therapeutic_areas", [], |row| row.get(0))
            .unwrap();
        assert_eq!(conditions, 1);
        assert_eq!(areas, 1);
    }
}

use rusqlite::{params, Connection};

use super::OptionalExt;

#[derive(Debug, Clone, PartialEq)]
pub struct Sponsor {
    pub id: i64,
    pub name: Option<String>,
    pub sponsor_type: Option<String>,
    pub is_primary: bool,
    pub org_id: String,
}

/// Find a sponsor by (org_id, is_primary) or create it. The same
/// organisation appears as a separate row in its primary and
/// co-sponsor capacities; name and type are creation-time defaults.
pub fn find_or_create(
    conn: &Connection,
    name: Option<&str>,
    sponsor_type: Option<&str>,
    is_primary: bool,
    org_id: &str,
) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM sponsors WHERE org_id = ?1 AND is_primary = ?2",
            params![org_id, is_primary],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO sponsors (name, type, is_primary, org_id) VALUES (?1, ?2, ?3, ?4)",
        params![name, sponsor_type, is_primary, org_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Sponsor>> {
    conn.query_row(
        "SELECT id, name, type, is_primary, org_id FROM sponsors WHERE id = ?1",
        params![id],
        |row| {
            Ok(Sponsor {
                id: row.get(0)?,
                name: row.get(1)?,
                sponsor_type: row.get(2)?,
                is_primary: row.get(3)?,
                org_id: row.get(4)?,
            })
        },
    )
    .optional()
}

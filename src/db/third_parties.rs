use rusqlite::{params, Connection};

use super::OptionalExt;

/// Contracted organisations (CROs, labs, couriers) attached to a
/// sponsor, plus the duty catalog they link to.
#[derive(Debug, Clone, PartialEq)]
pub struct NewThirdParty {
    pub name: Option<String>,
    pub tp_type: Option<String>,
    pub is_commercial: bool,
    pub org_id: Option<String>,
}

/// Find a third party by its full column tuple or create it. Third
/// parties have no single reliable key upstream, so any difference
/// makes a new row.
pub fn find_or_create(
    conn: &Connection,
    tp: &NewThirdParty,
    location_id: i64,
) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM third_parties
             WHERE name IS ?1 AND type IS ?2 AND is_commercial = ?3 AND org_id IS ?4
               AND location_id = ?5",
            params![tp.name, tp.tp_type, tp.is_commercial, tp.org_id, location_id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO third_parties (name, type, is_commercial, org_id, location_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![tp.name, tp.tp_type, tp.is_commercial, tp.org_id, location_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Find a duty by (code, name) or create it. Unknown codes arrive with
/// a NULL name and still get a row, so nothing is dropped.
pub fn find_or_create_duty(
    conn: &Connection,
    code: i64,
    name: Option<&str>,
) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM duties WHERE code = ?1 AND name IS ?2",
            params![code, name],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO duties (code, name) VALUES (?1, ?2)",
        params![code, name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn link_duty(conn: &Connection, third_party_id: i64, duty_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO third_party_duties (third_party_id, duty_id) VALUES (?1, ?2)",
        params![third_party_id, duty_id],
    )?;
    Ok(())
}

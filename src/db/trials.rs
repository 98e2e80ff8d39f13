use rusqlite::{params, Connection};

use super::OptionalExt;

/// Scalar columns of one trial, as derived from the feed. Dates are ISO
/// `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub title: Option<String>,
    pub short_title: Option<String>,
    pub ct_number: String,
    pub is_transitioned: Option<bool>,
    pub eudract_number: Option<String>,
    pub nct_number: Option<String>,
    pub status: Option<String>,
    pub public_status_code: Option<i64>,
    pub phase: Option<String>,
    pub age_group: Option<String>,
    pub gender: Option<String>,
    pub trial_region: Option<i64>,
    pub estimated_recruitment_start_date: Option<String>,
    pub decision_date: Option<String>,
    pub estimated_end_date: Option<String>,
    pub start_date_eu: Option<String>,
    pub end_date_eu: Option<String>,
    pub estimated_recruitment: Option<i64>,
    pub last_updated_in_ctis: String,
    pub ctis_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredTrial {
    pub id: i64,
    pub record: Trial,
}

const TRIAL_COLUMNS: &str = "title, short_title, ct_number, is_transitioned, eudract_number, \
     nct_number, status, public_status_code, phase, age_group, gender, trial_region, \
     estimated_recruitment_start_date, decision_date, estimated_end_date, start_date_eu, \
     end_date_eu, estimated_recruitment, last_updated_in_ctis, ctis_url";

/// Insert a new trial row. Returns the rowid.
pub fn insert(conn: &Connection, trial: &Trial) -> rusqlite::Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO trials ({TRIAL_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
        ),
        params![
            trial.title,
            trial.short_title,
            trial.ct_number,
            trial.is_transitioned,
            trial.eudract_number,
            trial.nct_number,
            trial.status,
            trial.public_status_code,
            trial.phase,
            trial.age_group,
            trial.gender,
            trial.trial_region,
            trial.estimated_recruitment_start_date,
            trial.decision_date,
            trial.estimated_end_date,
            trial.start_date_eu,
            trial.end_date_eu,
            trial.estimated_recruitment,
            trial.last_updated_in_ctis,
            trial.ctis_url,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite the scalar columns of an existing trial, keeping its rowid
/// (and therefore every junction row pointing at it valid).
pub fn update(conn: &Connection, id: i64, trial: &Trial) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE trials SET title = ?1, short_title = ?2, ct_number = ?3, is_transitioned = ?4,
             eudract_number = ?5, nct_number = ?6, status = ?7, public_status_code = ?8,
             phase = ?9, age_group = ?10, gender = ?11, trial_region = ?12,
             estimated_recruitment_start_date = ?13, decision_date = ?14,
             estimated_end_date = ?15, start_date_eu = ?16, end_date_eu = ?17,
             estimated_recruitment = ?18, last_updated_in_ctis = ?19, ctis_url = ?20
         WHERE id = ?21",
        params![
            trial.title,
            trial.short_title,
            trial.ct_number,
            trial.is_transitioned,
            trial.eudract_number,
            trial.nct_number,
            trial.status,
            trial.public_status_code,
            trial.phase,
            trial.age_group,
            trial.gender,
            trial.trial_region,
            trial.estimated_recruitment_start_date,
            trial.decision_date,
            trial.estimated_end_date,
            trial.start_date_eu,
            trial.end_date_eu,
            trial.estimated_recruitment,
            trial.last_updated_in_ctis,
            trial.ctis_url,
            id,
        ],
    )?;
    Ok(())
}

/// Look up a trial by its CT number (the stable public identifier).
pub fn find_by_ct_number(
    conn: &Connection,
    ct_number: &str,
) -> rusqlite::Result<Option<StoredTrial>> {
    conn.query_row(
        &format!("SELECT id, {TRIAL_COLUMNS} FROM trials WHERE ct_number = ?1"),
        params![ct_number],
        row_to_stored_trial,
    )
    .optional()
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM trials", [], |row| row.get(0))
}

fn row_to_stored_trial(row: &rusqlite::Row) -> rusqlite::Result<StoredTrial> {
    Ok(StoredTrial {
        id: row.get(0)?,
        record: Trial {
            title: row.get(1)?,
            short_title: row.get(2)?,
            ct_number: row.get(3)?,
            is_transitioned: row.get(4)?,
            eudract_number: row.get(5)?,
            nct_number: row.get(6)?,
            status: row.get(7)?,
            public_status_code: row.get(8)?,
            phase: row.get(9)?,
            age_group: row.get(10)?,
            gender: row.get(11)?,
            trial_region: row.get(12)?,
            estimated_recruitment_start_date: row.get(13)?,
            decision_date: row.get(14)?,
            estimated_end_date: row.get(15)?,
            start_date_eu: row.get(16)?,
            end_date_eu: row.get(17)?,
            estimated_recruitment: row.get(18)?,
            last_updated_in_ctis: row.get(19)?,
            ctis_url: row.get(20)?,
        },
    })
}

// --- Junction rows ---
//
// Composite primary keys make repeat links no-ops via INSERT OR IGNORE.

pub fn link_sponsor(conn: &Connection, trial_id: i64, sponsor_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO trial_sponsors (trial_id, sponsor_id) VALUES (?1, ?2)",
        params![trial_id, sponsor_id],
    )?;
    Ok(())
}

pub fn link_third_party(
    conn: &Connection,
    trial_id: i64,
    third_party_id: i64,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO trial_third_parties (trial_id, third_party_id) VALUES (?1, ?2)",
        params![trial_id, third_party_id],
    )?;
    Ok(())
}

pub fn link_condition(conn: &Connection, trial_id: i64, condition_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO trial_conditions (trial_id, condition_id) VALUES (?1, ?2)",
        params![trial_id, condition_id],
    )?;
    Ok(())
}

pub fn link_site(conn: &Connection, trial_id: i64, site_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO trial_sites (trial_id, site_id) VALUES (?1, ?2)",
        params![trial_id, site_id],
    )?;
    Ok(())
}

pub fn link_therapeutic_area(
    conn: &Connection,
    trial_id: i64,
    therapeutic_area_id: i64,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO trial_therapeutic_areas (trial_id, therapeutic_area_id) VALUES (?1, ?2)",
        params![trial_id, therapeutic_area_id],
    )?;
    Ok(())
}

pub fn link_product(conn: &Connection, trial_id: i64, product_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO trial_products (trial_id, product_id) VALUES (?1, ?2)",
        params![trial_id, product_id],
    )?;
    Ok(())
}

/// Remove every junction row for a trial ahead of re-attachment. The
/// linked entities themselves stay (they may belong to other trials).
pub fn clear_links(conn: &Connection, trial_id: i64) -> rusqlite::Result<()> {
    for table in [
        "trial_sponsors",
        "trial_third_parties",
        "trial_conditions",
        "trial_sites",
        "trial_therapeutic_areas",
        "trial_products",
    ] {
        conn.execute(
            &format!("DELETE FROM {table} WHERE trial_id = ?1"),
            params![trial_id],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn sample_trial(ct_number: &str) -> Trial {
        Trial {
            title: Some("A phase III trial".into()),
            short_title: Some("SHORT".into()),
            ct_number: ct_number.to_string(),
            is_transitioned: Some(false),
            eudract_number: None,
            nct_number: Some("NCT01234567".into()),
            status: Some("Ongoing".into()),
            public_status_code: Some(4),
            phase: Some("Phase III".into()),
            age_group: Some("Adults".into()),
            gender: Some("All".into()),
            trial_region: Some(1),
            estimated_recruitment_start_date: Some("2023-05-01".into()),
            decision_date: Some("2023-04-12".into()),
            estimated_end_date: Some("2026-05-01".into()),
            start_date_eu: Some("2023-05-15".into()),
            end_date_eu: None,
            estimated_recruitment: Some(420),
            last_updated_in_ctis: "2024-02-01".into(),
            ctis_url: format!(
                "https://euclinicaltrials.eu/search-for-clinical-trials/?lang=en&EUCT={ct_number}"
            ),
        }
    }

    #[test]
    fn test_insert_and_find_round_trip() {
        let conn = test_db();
        let trial = sample_trial("2023-505898-30-00");
        let id = insert(&conn, &trial).unwrap();
        assert!(id > 0);

        let stored = find_by_ct_number(&conn, "2023-505898-30-00")
            .unwrap()
            .expect("trial should exist");
        assert_eq!(stored.id, id);
        assert_eq!(stored.record, trial);
    }

    #[test]
    fn test_find_missing_is_none() {
        let conn = test_db();
        assert!(find_by_ct_number(&conn, "2099-000000-00-00").unwrap().is_none());
    }

    #[test]
    fn test_update_keeps_rowid() {
        let conn = test_db();
        let mut trial = sample_trial("2023-505898-30-00");
        let id = insert(&conn, &trial).unwrap();

        trial.status = Some("Ended".into());
        trial.last_updated_in_ctis = "2024-06-01".into();
        update(&conn, id, &trial).unwrap();

        let stored = find_by_ct_number(&conn, "2023-505898-30-00").unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.record.status.as_deref(), Some("Ended"));
        assert_eq!(stored.record.last_updated_in_ctis, "2024-06-01");
        assert_eq!(count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_repeat_links_are_ignored() {
        let conn = test_db();
        let id = insert(&conn, &sample_trial("2023-505898-30-00")).unwrap();
        conn.execute(
            "INSERT INTO sponsors (name, is_primary, org_id) VALUES ('Acme', 1, 'ORG-1')",
            [],
        )
        .unwrap();

        link_sponsor(&conn, id, 1).unwrap();
        link_sponsor(&conn, id, 1).unwrap();

        let links: i64 = conn
            .query_row("SELECT COUNT(*) FROM trial_sponsors", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 1);
    }

    #[test]
    fn test_clear_links_empties_all_junctions() {
        let conn = test_db();
        let id = insert(&conn, &sample_trial("2023-505898-30-00")).unwrap();
        conn.execute(
            "INSERT INTO sponsors (name, is_primary, org_id) VALUES ('Acme', 1, 'ORG-1')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO conditions (name) VALUES ('Asthma')", [])
            .unwrap();
        link_sponsor(&conn, id, 1).unwrap();
        link_condition(&conn, id, 1).unwrap();

        clear_links(&conn, id).unwrap();

        let sponsors: i64 = conn
            .query_row("SELECT COUNT(*) FROM trial_sponsors", [], |row| row.get(0))
            .unwrap();
        let conditions: i64 = conn
            .query_row("SELECT COUNT(*) FROM trial_conditions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(sponsors, 0);
        assert_eq!(conditions, 0);
        // the entities themselves survive
        let sponsor_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM sponsors", [], |row| row.get(0))
            .unwrap();
        assert_eq!(sponsor_rows, 1);
    }
}

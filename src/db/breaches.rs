use rusqlite::{params, Connection};

use super::terms::find_or_create_named;

/// One serious breach report attached to a trial. Dates are ISO
/// `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewSeriousBreach {
    pub aware_date: Option<String>,
    pub breach_date: Option<String>,
    pub submission_date: Option<String>,
    pub updated_on: Option<String>,
    pub description: Option<String>,
    pub actions_taken: Option<String>,
    pub benefit_risk_balance_changed: bool,
}

/// Insert a breach for a trial. Returns the rowid.
pub fn insert(conn: &Connection, trial_id: i64, breach: &NewSeriousBreach) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO serious_breaches (aware_date, breach_date, submission_date, updated_on,
             description, actions_taken, benefit_risk_balance_changed, trial_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            breach.aware_date,
            breach.breach_date,
            breach.submission_date,
            breach.updated_on,
            breach.description,
            breach.actions_taken,
            breach.benefit_risk_balance_changed,
            trial_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Drop every breach belonging to a trial ahead of re-attachment.
/// Junction rows go with them via ON DELETE CASCADE. Returns how many
/// breaches were removed.
pub fn delete_for_trial(conn: &Connection, trial_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM serious_breaches WHERE trial_id = ?1",
        params![trial_id],
    )
}

pub fn count_for_trial(conn: &Connection, trial_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM serious_breaches WHERE trial_id = ?1",
        params![trial_id],
        |row| row.get(0),
    )
}

pub fn find_or_create_impacted_area(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    find_or_create_named(conn, "impacted_areas", name)
}

pub fn find_or_create_category(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    find_or_create_named(conn, "breach_categories", name)
}

pub fn link_impacted_area(conn: &Connection, breach_id: i64, area_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO serious_breach_impacted_areas (serious_breach_id, impacted_area_id)
         VALUES (?1, ?2)",
        params![breach_id, area_id],
    )?;
    Ok(())
}

pub fn link_category(conn: &Connection, breach_id: i64, category_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO serious_breach_categories (serious_breach_id, breach_category_id)
         VALUES (?1, ?2)",
        params![breach_id, category_id],
    )?;
    Ok(())
}

pub fn link_site(conn: &Connection, breach_id: i64, site_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO serious_breach_sites (serious_breach_id, site_id) VALUES (?1, ?2)",
        params![breach_id, site_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn trial_id(conn: &Connection) -> i64 {
        conn.execute(
            "INSERT INTO trials (ct_number, last_updated_in_ctis, ctis_url)
             VALUES ('2023-505898-30-00', '2024-02-01', 'https://example.invalid/t')",
            [],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn test_insert_and_count() {
        let conn = test_db();
        let trial = trial_id(&conn);

        let breach = NewSeriousBreach {
            aware_date: Some("2023-11-02".into()),
            breach_date: Some("2023-10-28".into()),
            description: Some("Dosing deviation at two sites".into()),
            benefit_risk_balance_changed: true,
            ..Default::default()
        };
        let id = insert(&conn, trial, &breach).unwrap();
        assert!(id > 0);
        assert_eq!(count_for_trial(&conn, trial).unwrap(), 1);
    }

    #[test]
    fn test_delete_for_trial_cascades_junctions() {
        let conn = test_db();
        let trial = trial_id(&conn);
        let breach = insert(&conn, trial, &NewSeriousBreach::default()).unwrap();

        let area = find_or_create_impacted_area(&conn, "Subject safety").unwrap();
        let category = find_or_create_category(&conn, "Trial conduct").unwrap();
        link_impacted_area(&conn, breach, area).unwrap();
        link_category(&conn, breach, category).unwrap();

        let removed = delete_for_trial(&conn, trial).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(count_for_trial(&conn, trial).unwrap(), 0);

        let area_links: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM serious_breach_impacted_areas",
                [],
                |row| row.get(0),
            )
            .unwrap();
        let category_links: i64 = conn
            .query_row("SELECT COUNT(*) FROM serious_breach_categories", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(area_links, 0);
        assert_eq!(category_links, 0);

        // the catalogs themselves survive
        let areas: i64 = conn
            .query_row("SELECT COUNT(*) FROM impacted_areas", [], |row| row.get(0))
            .unwrap();
        assert_eq!(areas, 1);
    }

    #[test]
    fn test_catalog_names_deduplicate() {
        let conn = test_db();
        let a = find_or_create_impacted_area(&conn, "Data integrity").unwrap();
        let b = find_or_create_impacted_area(&conn, "Data integrity").unwrap();
        assert_eq!(a, b);

        let c = find_or_create_category(&conn, "Reporting").unwrap();
        let d = find_or_create_category(&conn, "Reporting").unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn test_repeat_site_links_are_ignored() {
        let conn = test_db();
        let trial = trial_id(&conn);
        let breach = insert(&conn, trial, &NewSeriousBreach::default()).unwrap();
        conn.execute(
            "INSERT INTO locations (address) VALUES ('Main St 1')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO sites (name, location_id) VALUES ('Site A', 1)",
            [],
        )
        .unwrap();

        link_site(&conn, breach, 1).unwrap();
        link_site(&conn, breach, 1).unwrap();

        let links: i64 = conn
            .query_row("SELECT COUNT(*) FROM serious_breach_sites", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(links, 1);
    }
}

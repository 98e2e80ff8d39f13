use rusqlite::{params, Connection};

use super::OptionalExt;

#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub id: i64,
    pub name: Option<String>,
    pub site_type: Option<String>,
    pub commercial: Option<bool>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub org_id: Option<String>,
    pub location_id: i64,
}

/// Descriptive values used only when the site is first created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSite {
    pub name: Option<String>,
    pub site_type: Option<String>,
    pub commercial: Option<bool>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub org_id: Option<String>,
}

/// Find a site by (org_id, location) or create it. An organisation
/// running sites at two addresses gets two rows; the descriptive
/// columns are never updated on a match.
pub fn find_or_create(conn: &Connection, site: &NewSite, location_id: i64) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM sites WHERE org_id IS ?1 AND location_id = ?2",
            params![site.org_id, location_id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO sites (name, type, commercial, phone, email, org_id, location_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            site.name,
            site.site_type,
            site.commercial,
            site.phone,
            site.email,
            site.org_id,
            location_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// First site registered under an org key, if any. Serious breach
/// reports reference sites this way.
pub fn find_by_org_id(conn: &Connection, org_id: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM sites WHERE org_id = ?1 ORDER BY id LIMIT 1",
        params![org_id],
        |row| row.get(0),
    )
    .optional()
}

pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Site>> {
    conn.query_row(
        "SELECT id, name, type, commercial, phone, email, org_id, location_id
         FROM sites WHERE id = ?1",
        params![id],
        |row| {
            Ok(Site {
                id: row.get(0)?,
                name: row.get(1)?,
                site_type: row.get(2)?,
                commercial: row.get(3)?,
                phone: row.get(4)?,
                email: row.get(5)?,
                org_id: row.get(6)?,
                location_id: row.get(7)?,
            })
        },
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{locations, test_db};

    fn test_location(conn: &Connection, address: &str) -> i64 {
        locations::find_or_create(
            conn,
            &locations::NewLocation {
                address: address.into(),
                city: Some("Lund".into()),
                postcode: None,
                country: Some("Sweden".into()),
                country_iso2: Some("SE".into()),
                country_iso3: Some("SWE".into()),
                location_one_line: format!("{address}, Lund, Sweden"),
            },
        )
        .unwrap()
    }

    fn hospital() -> NewSite {
        NewSite {
            name: Some("Lund University Hospital".into()),
            site_type: Some("Hospital".into()),
            commercial: Some(false),
            phone: Some("+4600000000".into()),
            email: None,
            org_id: Some("ORG-99".into()),
        }
    }

    #[test]
    fn test_same_org_and_location_is_one_site() {
        let conn = test_db();
        let loc = test_location(&conn, "Getingevägen 4");
        let id1 = find_or_create(&conn, &hospital(), loc).unwrap();

        // descriptive fields differ but key matches: still the same row
        let mut renamed = hospital();
        renamed.name = Some("LUH".into());
        let id2 = find_or_create(&conn, &renamed, loc).unwrap();

        assert_eq!(id1, id2);
        let site = get(&conn, id1).unwrap().unwrap();
        assert_eq!(site.name.as_deref(), Some("Lund University Hospital"));
    }

    #[test]
    fn test_same_org_different_location_is_two_sites() {
        let conn = test_db();
        let loc_a = test_location(&conn, "Getingevägen 4");
        let loc_b = test_location(&conn, "Entrégatan 7");
        let id1 = find_or_create(&conn, &hospital(), loc_a).unwrap();
        let id2 = find_or_create(&conn, &hospital(), loc_b).unwrap();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_find_by_org_id_returns_first() {
        let conn = test_db();
        let loc_a = test_location(&conn, "Getingevägen 4");
        let loc_b = test_location(&conn, "Entrégatan 7");
        let first = find_or_create(&conn, &hospital(), loc_a).unwrap();
        find_or_create(&conn, &hospital(), loc_b).unwrap();

        assert_eq!(find_by_org_id(&conn, "ORG-99").unwrap(), Some(first));
        assert_eq!(find_by_org_id(&conn, "ORG-404").unwrap(), None);
    }
}

use rusqlite::{params, Connection};

use super::OptionalExt;

/// One postal address, shared by sites and third parties across trials.
///
/// `geocodeable` is tri-state: NULL = never sent to the geocoder,
/// 0 = sent and no match, 1 = coordinates present.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: i64,
    pub address: String,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub country_iso2: Option<String>,
    pub country_iso3: Option<String>,
    pub location_one_line: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geocodeable: Option<bool>,
}

/// Creation-time values for a location; coordinates start empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub address: String,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub country_iso2: Option<String>,
    pub country_iso3: Option<String>,
    pub location_one_line: String,
}

/// Find a location by its natural key (address, city, postcode,
/// country) or create it. Matching is NULL-safe, so two sites with the
/// same address and no postcode share one row.
///
/// A found row keeps whatever coordinates it already has; re-scrapes
/// never reset geocoding state.
pub fn find_or_create(conn: &Connection, loc: &NewLocation) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM locations
             WHERE address = ?1 AND city IS ?2 AND postcode IS ?3 AND country IS ?4",
            params![loc.address, loc.city, loc.postcode, loc.country],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO locations (address, city, postcode, country, country_iso2, country_iso3, location_one_line)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            loc.address,
            loc.city,
            loc.postcode,
            loc.country,
            loc.country_iso2,
            loc.country_iso3,
            loc.location_one_line,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Location>> {
    conn.query_row(
        "SELECT id, address, city, postcode, country, country_iso2, country_iso3,
                location_one_line, latitude, longitude, geocodeable
         FROM locations WHERE id = ?1",
        params![id],
        row_to_location,
    )
    .optional()
}

/// Locations never offered to the geocoder, oldest first.
pub fn list_pending_geocode(
    conn: &Connection,
    limit: Option<u32>,
) -> rusqlite::Result<Vec<Location>> {
    let mut sql = String::from(
        "SELECT id, address, city, postcode, country, country_iso2, country_iso3,
                location_one_line, latitude, longitude, geocodeable
         FROM locations WHERE latitude IS NULL AND geocodeable IS NULL ORDER BY id",
    );
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_location)?;
    rows.collect()
}

/// Store geocoder output and mark the location resolved.
pub fn set_coordinates(
    conn: &Connection,
    id: i64,
    latitude: f64,
    longitude: f64,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE locations SET latitude = ?1, longitude = ?2, geocodeable = 1 WHERE id = ?3",
        params![latitude, longitude, id],
    )?;
    Ok(())
}

/// Record that the geocoder had no match, so the row is not retried.
pub fn mark_ungeocodeable(conn: &Connection, id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE locations SET geocodeable = 0 WHERE id = ?1",
        params![id],
    )?;
    Ok(())
}

fn row_to_location(row: &rusqlite::Row) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        address: row.get(1)?,
        city: row.get(2)?,
        postcode: row.get(3)?,
        country: row.get(4)?,
        country_iso2: row.get(5)?,
        country_iso3: row.get(6)?,
        location_one_line: row.get(7)?,
        latitude: row.get(8)?,
        longitude: row.get(9)?,
        geocodeable: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn lund_location() -> NewLocation {
        NewLocation {
            address: "Getingevägen 4".into(),
            city: Some("Lund".into()),
            postcode: Some("222 41".into()),
            country: Some("Sweden".into()),
            country_iso2: Some("SE".into()),
            country_iso3: Some("SWE".into()),
            location_one_line: "Getingevägen 4, Lund, Sweden".into(),
        }
    }

    #[test]
    fn test_find_or_create_deduplicates() {
        let conn = test_db();
        let id1 = find_or_create(&conn, &lund_location()).unwrap();
        let id2 = find_or_create(&conn, &lund_location()).unwrap();
        assert_eq!(id1, id2);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_null_fields_match_null_safely() {
        let conn = test_db();
        let loc = NewLocation {
            address: "Main St 1".into(),
            city: None,
            postcode: None,
            country: Some("Ireland".into()),
            country_iso2: Some("IE".into()),
            country_iso3: Some("IRL".into()),
            location_one_line: "Main St 1, , Ireland".into(),
        };
        let id1 = find_or_create(&conn, &loc).unwrap();
        let id2 = find_or_create(&conn, &loc).unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_differing_city_creates_new_row() {
        let conn = test_db();
        let id1 = find_or_create(&conn, &lund_location()).unwrap();
        let mut other = lund_location();
        other.city = Some("Malmö".into());
        let id2 = find_or_create(&conn, &other).unwrap();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_rescrape_keeps_coordinates() {
        let conn = test_db();
        let id = find_or_create(&conn, &lund_location()).unwrap();
        set_coordinates(&conn, id, 55.7068, 13.1870).unwrap();

        // same address arriving again must not reset geocoding state
        let again = find_or_create(&conn, &lund_location()).unwrap();
        assert_eq!(again, id);

        let loc = get(&conn, id).unwrap().unwrap();
        assert_eq!(loc.latitude, Some(55.7068));
        assert_eq!(loc.longitude, Some(13.1870));
        assert_eq!(loc.geocodeable, Some(true));
    }

    #[test]
    fn test_pending_geocode_excludes_tried_rows() {
        let conn = test_db();
        let id1 = find_or_create(&conn, &lund_location()).unwrap();
        let mut second = lund_location();
        second.city = Some("Malmö".into());
        let id2 = find_or_create(&conn, &second).unwrap();
        let mut third = lund_location();
        third.city = Some("Uppsala".into());
        let id3 = find_or_create(&conn, &third).unwrap();

        set_coordinates(&conn, id1, 55.7, 13.2).unwrap();
        mark_ungeocodeable(&conn, id2).unwrap();

        let pending = list_pending_geocode(&conn, None).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id3);
        assert_eq!(pending[0].geocodeable, None);
    }

    #[test]
    fn test_pending_geocode_respects_limit() {
        let conn = test_db();
        for i in 0..5 {
            let mut loc = lund_location();
            loc.address = format!("Street {i}");
            find_or_create(&conn, &loc).unwrap();
        }
        let pending = list_pending_geocode(&conn, Some(2)).unwrap();
        assert_eq!(pending.len(), 2);
    }
}

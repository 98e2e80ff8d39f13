use rusqlite::Connection;

/// Run all pending migrations on the database.
///
/// Uses `PRAGMA user_version` to track which migrations have been applied.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        migrate_v0_to_v1(conn)?;
    }

    if version < 2 {
        migrate_v1_to_v2(conn)?;
    }

    Ok(())
}

fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    // Tri-state geocoder flag: NULL = never tried, 0 = no match, 1 = geocoded.
    conn.execute_batch(
        "
        ALTER TABLE locations ADD COLUMN geocodeable INTEGER;

        PRAGMA user_version = 2;
        ",
    )?;
    Ok(())
}

fn migrate_v0_to_v1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE trials (
            id                                  INTEGER PRIMARY KEY,
            title                               TEXT,
            short_title                         TEXT,
            ct_number                           TEXT NOT NULL UNIQUE,
            is_transitioned                     INTEGER,
            eudract_number                      TEXT,
            nct_number                          TEXT,
            status                              TEXT,
            public_status_code                  INTEGER,
            phase                               TEXT,
            age_group                           TEXT,
            gender                              TEXT,
            trial_region                        INTEGER,
            estimated_recruitment_start_date    TEXT,
            decision_date                       TEXT,
            estimated_end_date                  TEXT,
            start_date_eu                       TEXT,
            end_date_eu                         TEXT,
            estimated_recruitment               INTEGER,
            last_updated_in_ctis                TEXT NOT NULL,
            ctis_url                            TEXT NOT NULL
        );

        CREATE TABLE locations (
            id                  INTEGER PRIMARY KEY,
            address             TEXT NOT NULL,
            city                TEXT,
            postcode            TEXT,
            country             TEXT,
            country_iso2        TEXT,
            country_iso3        TEXT,
            location_one_line   TEXT,
            latitude            REAL,
            longitude           REAL
        );

        CREATE TABLE sites (
            id          INTEGER PRIMARY KEY,
            name        TEXT,
            type        TEXT,
            commercial  INTEGER,
            phone       TEXT,
            email       TEXT,
            org_id      TEXT,
            location_id INTEGER NOT NULL REFERENCES locations
        );

        CREATE TABLE sponsors (
            id          INTEGER PRIMARY KEY,
            name        TEXT,
            type        TEXT,
            is_primary  INTEGER NOT NULL,
            org_id      TEXT NOT NULL
        );

        CREATE TABLE third_parties (
            id              INTEGER PRIMARY KEY,
            name            TEXT,
            type            TEXT,
            is_commercial   INTEGER NOT NULL DEFAULT 0,
            org_id          TEXT,
            location_id     INTEGER NOT NULL REFERENCES locations
        );

        CREATE TABLE duties (
            id      INTEGER PRIMARY KEY,
            code    INTEGER NOT NULL,
            name    TEXT
        );

        CREATE TABLE therapeutic_areas (
            id      INTEGER PRIMARY KEY,
            name    TEXT NOT NULL
        );

        CREATE TABLE conditions (
            id      INTEGER PRIMARY KEY,
            name    TEXT NOT NULL
        );

        CREATE TABLE impacted_areas (
            id      INTEGER PRIMARY KEY,
            name    TEXT NOT NULL
        );

        CREATE TABLE breach_categories (
            id      INTEGER PRIMARY KEY,
            name    TEXT NOT NULL
        );

        CREATE TABLE administration_routes (
            id      INTEGER PRIMARY KEY,
            name    TEXT NOT NULL
        );

        CREATE TABLE products (
            id                              INTEGER PRIMARY KEY,
            name                            TEXT,
            active_substance                TEXT,
            name_org                        TEXT,
            pharmaceutical_form_display     TEXT,
            is_paediatric_formulation       INTEGER,
            role_in_trial_code              INTEGER,
            orphan_drug                     INTEGER,
            ev_code                         TEXT,
            eu_mp_number                    TEXT,
            sponsor_product_code            TEXT
        );

        CREATE TABLE substances (
            id                      INTEGER PRIMARY KEY,
            name                    TEXT,
            ev_code                 TEXT,
            substance_origin        TEXT,
            act_substance_origin    TEXT,
            product_pk              TEXT,
            substance_pk            TEXT
        );

        CREATE TABLE serious_breaches (
            id                              INTEGER PRIMARY KEY,
            aware_date                      TEXT,
            breach_date                     TEXT,
            submission_date                 TEXT,
            updated_on                      TEXT,
            description                     TEXT,
            actions_taken                   TEXT,
            benefit_risk_balance_changed    INTEGER NOT NULL DEFAULT 0,
            trial_id                        INTEGER NOT NULL REFERENCES trials ON DELETE CASCADE
        );

        CREATE TABLE update_history (
            id          INTEGER PRIMARY KEY,
            update_time TEXT NOT NULL,
            status      TEXT NOT NULL
        );

        CREATE TABLE trial_sponsors (
            trial_id    INTEGER NOT NULL REFERENCES trials ON DELETE CASCADE,
            sponsor_id  INTEGER NOT NULL REFERENCES sponsors ON DELETE CASCADE,
            PRIMARY KEY (trial_id, sponsor_id)
        );

        CREATE TABLE trial_third_parties (
            trial_id        INTEGER NOT NULL REFERENCES trials ON DELETE CASCADE,
            third_party_id  INTEGER NOT NULL REFERENCES third_parties ON DELETE CASCADE,
            PRIMARY KEY (trial_id, third_party_id)
        );

        CREATE TABLE trial_conditions (
            trial_id        INTEGER NOT NULL REFERENCES trials ON DELETE CASCADE,
            condition_id    INTEGER NOT NULL REFERENCES conditions ON DELETE CASCADE,
            PRIMARY KEY (trial_id, condition_id)
        );

        CREATE TABLE trial_sites (
            trial_id    INTEGER NOT NULL REFERENCES trials ON DELETE CASCADE,
            site_id     INTEGER NOT NULL REFERENCES sites ON DELETE CASCADE,
            PRIMARY KEY (trial_id, site_id)
        );

        CREATE TABLE trial_therapeutic_areas (
            trial_id            INTEGER NOT NULL REFERENCES trials ON DELETE CASCADE,
            therapeutic_area_id INTEGER NOT NULL REFERENCES therapeutic_areas ON DELETE CASCADE,
            PRIMARY KEY (trial_id, therapeutic_area_id)
        );

        CREATE TABLE trial_products (
            trial_id    INTEGER NOT NULL REFERENCES trials ON DELETE CASCADE,
            product_id  INTEGER NOT NULL REFERENCES products ON DELETE CASCADE,
            PRIMARY KEY (trial_id, product_id)
        );

        CREATE TABLE product_substances (
            product_id      INTEGER NOT NULL REFERENCES products ON DELETE CASCADE,
            substance_id    INTEGER NOT NULL REFERENCES substances ON DELETE CASCADE,
            PRIMARY KEY (product_id, substance_id)
        );

        CREATE TABLE product_administration_routes (
            product_id              INTEGER NOT NULL REFERENCES products ON DELETE CASCADE,
            administration_route_id INTEGER NOT NULL REFERENCES administration_routes ON DELETE CASCADE,
            PRIMARY KEY (product_id, administration_route_id)
        );

        CREATE TABLE third_party_duties (
            third_party_id  INTEGER NOT NULL REFERENCES third_parties ON DELETE CASCADE,
            duty_id         INTEGER NOT NULL REFERENCES duties ON DELETE CASCADE,
            PRIMARY KEY (third_party_id, duty_id)
        );

        CREATE TABLE serious_breach_impacted_areas (
            serious_breach_id   INTEGER NOT NULL REFERENCES serious_breaches ON DELETE CASCADE,
            impacted_area_id    INTEGER NOT NULL REFERENCES impacted_areas ON DELETE CASCADE,
            PRIMARY KEY (serious_breach_id, impacted_area_id)
        );

        CREATE TABLE serious_breach_categories (
            serious_breach_id   INTEGER NOT NULL REFERENCES serious_breaches ON DELETE CASCADE,
            breach_category_id  INTEGER NOT NULL REFERENCES breach_categories ON DELETE CASCADE,
            PRIMARY KEY (serious_breach_id, breach_category_id)
        );

        CREATE TABLE serious_breach_sites (
            serious_breach_id   INTEGER NOT NULL REFERENCES serious_breaches ON DELETE CASCADE,
            site_id             INTEGER NOT NULL REFERENCES sites ON DELETE CASCADE,
            PRIMARY KEY (serious_breach_id, site_id)
        );

        CREATE INDEX idx_trials_title ON trials(title);
        CREATE INDEX idx_sponsors_name ON sponsors(name);
        CREATE INDEX idx_sponsors_org ON sponsors(org_id);
        CREATE INDEX idx_sites_name ON sites(name);
        CREATE INDEX idx_sites_org ON sites(org_id);
        CREATE INDEX idx_products_name ON products(name);
        CREATE INDEX idx_substances_name ON substances(name);
        CREATE INDEX idx_conditions_name ON conditions(name);
        CREATE INDEX idx_breaches_trial ON serious_breaches(trial_id);

        PRAGMA user_version = 1;
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_from_zero() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();

        migrate(&conn).expect("migration should succeed");

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 2);

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "trials",
            "locations",
            "sites",
            "sponsors",
            "third_parties",
            "duties",
            "therapeutic_areas",
            "conditions",
            "impacted_areas",
            "breach_categories",
            "administration_routes",
            "products",
            "substances",
            "serious_breaches",
            "update_history",
            "trial_sponsors",
            "trial_third_parties",
            "trial_conditions",
            "trial_sites",
            "trial_therapeutic_areas",
            "trial_products",
            "product_substances",
            "product_administration_routes",
            "third_party_duties",
            "serious_breach_impacted_areas",
            "serious_breach_categories",
            "serious_breach_sites",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(indexes.contains(&"idx_trials_title".to_string()));
        assert!(indexes.contains(&"idx_sponsors_org".to_string()));
        assert!(indexes.contains(&"idx_sites_org".to_string()));
        assert!(indexes.contains(&"idx_breaches_trial".to_string()));
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();

        migrate(&conn).expect("first migration should succeed");
        migrate(&conn).expect("second migration should succeed");

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn test_migrate_from_v1() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();

        // Apply only v1, as an existing pre-geocodeable database would have
        migrate_v0_to_v1(&conn).expect("v1 migration should succeed");
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);

        migrate(&conn).expect("v2 migration should succeed");

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 2);

        // geocodeable column should now exist and accept the tri-state values
        conn.execute(
            "INSERT INTO locations (address, city) VALUES ('Main St 1', 'Lund')",
            [],
        )
        .unwrap();
        conn.execute("UPDATE locations SET geocodeable = 0 WHERE id = 1", [])
            .unwrap();
        let flag: Option<bool> = conn
            .query_row("SELECT geocodeable FROM locations WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(flag, Some(false));
    }
}

use rusqlite::{params, Connection};

use super::OptionalExt;

/// Investigational products, their active substances, and the
/// administration-route catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: Option<String>,
    pub active_substance: Option<String>,
    pub name_org: Option<String>,
    pub pharmaceutical_form_display: Option<String>,
    pub is_paediatric_formulation: Option<bool>,
    pub role_in_trial_code: Option<i64>,
    pub orphan_drug: Option<bool>,
    pub ev_code: Option<String>,
    pub eu_mp_number: Option<String>,
    pub sponsor_product_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubstance {
    pub name: Option<String>,
    pub ev_code: Option<String>,
    pub substance_origin: Option<String>,
    pub act_substance_origin: Option<String>,
    pub product_pk: Option<String>,
    pub substance_pk: Option<String>,
}

/// Find a product by its full column tuple or create it. The product
/// dictionary has no stable key exposed here, so the whole tuple is
/// the identity; trials sharing a formulation share the row.
pub fn find_or_create(conn: &Connection, product: &NewProduct) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM products
             WHERE name IS ?1 AND active_substance IS ?2 AND name_org IS ?3
               AND pharmaceutical_form_display IS ?4 AND is_paediatric_formulation IS ?5
               AND role_in_trial_code IS ?6 AND orphan_drug IS ?7 AND ev_code IS ?8
               AND eu_mp_number IS ?9 AND sponsor_product_code IS ?10",
            params![
                product.name,
                product.active_substance,
                product.name_org,
                product.pharmaceutical_form_display,
                product.is_paediatric_formulation,
                product.role_in_trial_code,
                product.orphan_drug,
                product.ev_code,
                product.eu_mp_number,
                product.sponsor_product_code,
            ],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO products (name, active_substance, name_org, pharmaceutical_form_display,
             is_paediatric_formulation, role_in_trial_code, orphan_drug, ev_code, eu_mp_number,
             sponsor_product_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            product.name,
            product.active_substance,
            product.name_org,
            product.pharmaceutical_form_display,
            product.is_paediatric_formulation,
            product.role_in_trial_code,
            product.orphan_drug,
            product.ev_code,
            product.eu_mp_number,
            product.sponsor_product_code,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_or_create_substance(
    conn: &Connection,
    substance: &NewSubstance,
) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM substances
             WHERE name IS ?1 AND ev_code IS ?2 AND substance_origin IS ?3
               AND act_substance_origin IS ?4 AND product_pk IS ?5 AND substance_pk IS ?6",
            params![
                substance.name,
                substance.ev_code,
                substance.substance_origin,
                substance.act_substance_origin,
                substance.product_pk,
                substance.substance_pk,
            ],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO substances (name, ev_code, substance_origin, act_substance_origin,
             product_pk, substance_pk)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            substance.name,
            substance.ev_code,
            substance.substance_origin,
            substance.act_substance_origin,
            substance.product_pk,
            substance.substance_pk,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_or_create_route(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM administration_routes WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO administration_routes (name) VALUES (?1)",
        params![name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn link_substance(conn: &Connection, product_id: i64, substance_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO product_substances (product_id, substance_id) VALUES (?1, ?2)",
        params![product_id, substance_id],
    )?;
    Ok(())
}

pub fn link_route(conn: &Connection, product_id: i64, route_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO product_administration_routes (product_id, administration_route_id)
         VALUES (?1, ?2)",
        params![product_id, route_id],
    )?;
    Ok(())
}

//! Reconciliation of CTIS payloads into the relational schema.
//!
//! Each overview row is classified against the stored trial and applied
//! as an insert, an in-place update, or a skip. New and changed trials
//! run inside one transaction apiece.

use rusqlite::Connection;
use tracing::warn;

use crate::api::types::{
    FullTrial, OrganisationAddress, ProductEntry, SeriousBreachEntry, SponsorEntry,
    ThirdPartyEntry, TrialOverview,
};
use crate::countries;
use crate::dates;
use crate::db::{breaches, locations, products, sites, sponsors, terms, third_parties, trials};
use crate::decodings;
use crate::error::{IngestError, Result};

/// How an incoming overview relates to what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    New,
    Changed,
    Unchanged,
}

/// Classify an overview against the stored trial without touching the
/// full document. `Unchanged` means the retrieve call can be skipped.
pub fn disposition(conn: &Connection, overview: &TrialOverview) -> Result<Disposition> {
    let incoming = last_updated_iso(overview)?;
    match trials::find_by_ct_number(conn, ct_number(overview)?)? {
        None => Ok(Disposition::New),
        Some(stored) if stored.record.last_updated_in_ctis == incoming => {
            Ok(Disposition::Unchanged)
        }
        Some(_) => Ok(Disposition::Changed),
    }
}

/// Apply one trial to the database inside a transaction.
///
/// A new trial is inserted and its related entities attached. A changed
/// trial keeps its rowid: scalars are overwritten, junction rows and
/// serious breaches dropped, and everything re-attached from the fresh
/// payload. An unchanged trial is left alone.
pub fn upsert_trial(
    conn: &mut Connection,
    overview: &TrialOverview,
    full: &FullTrial,
) -> Result<Disposition> {
    let row = trial_row_from_payload(overview, full)?;

    let tx = conn.transaction()?;
    let disposition = match trials::find_by_ct_number(&tx, &row.ct_number)? {
        None => {
            let id = trials::insert(&tx, &row)?;
            attach_related(&tx, id, full)?;
            Disposition::New
        }
        Some(stored) if stored.record.last_updated_in_ctis == row.last_updated_in_ctis => {
            Disposition::Unchanged
        }
        Some(stored) => {
            trials::update(&tx, stored.id, &row)?;
            trials::clear_links(&tx, stored.id)?;
            breaches::delete_for_trial(&tx, stored.id)?;
            attach_related(&tx, stored.id, full)?;
            Disposition::Changed
        }
    };
    tx.commit()?;
    Ok(disposition)
}

/// Derive the scalar trial row from the overview and full document.
pub fn trial_row_from_payload(
    overview: &TrialOverview,
    full: &FullTrial,
) -> Result<trials::Trial> {
    let ct = ct_number(overview)?;
    let app = &full.authorized_application;
    let details = &app.authorized_part_i.trial_details;
    let duration = &details.trial_information.trial_duration;

    Ok(trials::Trial {
        title: overview.ct_title.clone(),
        short_title: details.clinical_trial_identifiers.short_title.clone(),
        ct_number: ct.to_string(),
        is_transitioned: app.eudra_ct.is_transitioned,
        eudract_number: app.eudra_ct.eudra_ct_code.clone(),
        nct_number: details
            .clinical_trial_identifiers
            .secondary_identifying_numbers
            .nct_number
            .number
            .clone(),
        status: full.ct_status.clone(),
        public_status_code: full.ct_public_status_code,
        phase: overview.trial_phase.clone(),
        age_group: overview.age_group.clone(),
        gender: overview.gender.clone(),
        trial_region: overview.trial_region,
        estimated_recruitment_start_date: iso_field(
            "estimatedRecruitmentStartDate",
            duration.estimated_recruitment_start_date.as_deref(),
        )?,
        decision_date: timestamp_field("decisionDate", full.decision_date.as_deref())?,
        estimated_end_date: iso_field("estimatedEndDate", duration.estimated_end_date.as_deref())?,
        start_date_eu: iso_field("startDateEU", full.start_date_eu.as_deref())?,
        end_date_eu: iso_field("endDateEU", full.end_date_eu.as_deref())?,
        estimated_recruitment: Some(overview.total_number_enrolled),
        last_updated_in_ctis: last_updated_iso(overview)?,
        ctis_url: format!(
            "https://euclinicaltrials.eu/search-for-clinical-trials/?lang=en&EUCT={ct}"
        ),
    })
}

fn ct_number(overview: &TrialOverview) -> Result<&str> {
    let ct = overview.ct_number.trim();
    if ct.is_empty() {
        return Err(IngestError::MissingField("ctNumber"));
    }
    Ok(ct)
}

/// `lastUpdated` in ISO form; it drives change detection, so its
/// absence makes the whole record unusable.
fn last_updated_iso(overview: &TrialOverview) -> Result<String> {
    let raw = overview
        .last_updated
        .as_deref()
        .ok_or(IngestError::MissingField("lastUpdated"))?;
    let date = dates::day_month_year(raw).ok_or_else(|| IngestError::InvalidDate {
        field: "lastUpdated",
        value: raw.to_string(),
    })?;
    Ok(date.to_string())
}

fn iso_field(field: &'static str, value: Option<&str>) -> Result<Option<String>> {
    value
        .map(|raw| {
            dates::iso_date(raw)
                .map(|date| date.to_string())
                .ok_or_else(|| IngestError::InvalidDate {
                    field,
                    value: raw.to_string(),
                })
        })
        .transpose()
}

fn timestamp_field(field: &'static str, value: Option<&str>) -> Result<Option<String>> {
    value
        .map(|raw| {
            dates::timestamp_date(raw)
                .map(|date| date.to_string())
                .ok_or_else(|| IngestError::InvalidDate {
                    field,
                    value: raw.to_string(),
                })
        })
        .transpose()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn attach_related(conn: &Connection, trial_id: i64, full: &FullTrial) -> Result<()> {
    let part_i = &full.authorized_application.authorized_part_i;

    // Sites come per member state in part II.
    for part in &full.authorized_application.authorized_parts_ii {
        for site in &part.trial_sites {
            attach_site(conn, trial_id, &site.organisation_address_info)?;
        }
    }

    for area in &part_i.therapeutic_areas {
        if let Some(name) = non_empty(area.name.as_deref()) {
            let area_id = terms::find_or_create_therapeutic_area(conn, name)?;
            trials::link_therapeutic_area(conn, trial_id, area_id)?;
        }
    }

    let conditions = &part_i
        .trial_details
        .trial_information
        .medical_condition
        .part_i_medical_conditions;
    for condition in conditions.iter() {
        if let Some(name) = non_empty(condition.medical_condition.as_deref()) {
            let condition_id = terms::find_or_create_condition(conn, name)?;
            trials::link_condition(conn, trial_id, condition_id)?;
        }
    }

    for sponsor in &part_i.sponsors {
        attach_sponsor(conn, trial_id, sponsor)?;
    }

    for product in &part_i.products {
        attach_product(conn, trial_id, product)?;
    }

    for breach in &full.events.serious_breaches {
        attach_breach(conn, trial_id, breach)?;
    }

    Ok(())
}

/// Resolve the shared location row for an address block. `None` when
/// the street line is missing; locations require one.
fn location_from_address(
    conn: &Connection,
    info: &OrganisationAddress,
) -> Result<Option<i64>> {
    let Some(address) = non_empty(info.address.address_line1.as_deref()) else {
        return Ok(None);
    };
    let city = info.address.city.clone();
    let country = info.address.country_name.clone();
    let (iso2, iso3) = match country.as_deref().and_then(countries::iso_codes) {
        Some((iso2, iso3)) => (Some(iso2.to_string()), Some(iso3.to_string())),
        None => (None, None),
    };
    let location = locations::NewLocation {
        address: address.to_string(),
        location_one_line: format!(
            "{address}, {}, {}",
            city.as_deref().unwrap_or(""),
            country.as_deref().unwrap_or("")
        ),
        city,
        postcode: info.address.postcode.clone(),
        country,
        country_iso2: iso2,
        country_iso3: iso3,
    };
    Ok(Some(locations::find_or_create(conn, &location)?))
}

fn attach_site(conn: &Connection, trial_id: i64, info: &OrganisationAddress) -> Result<()> {
    let Some(location_id) = location_from_address(conn, info)? else {
        warn!(
            trial_id,
            name = ?info.organisation.name,
            "site without street address skipped"
        );
        return Ok(());
    };
    let site = sites::NewSite {
        name: info.organisation.name.clone(),
        site_type: info.organisation.org_type.clone(),
        commercial: info.organisation.commercial,
        phone: info.phone.clone(),
        email: info.email.clone(),
        org_id: info.organisation.business_key.clone(),
    };
    let site_id = sites::find_or_create(conn, &site, location_id)?;
    trials::link_site(conn, trial_id, site_id)?;
    Ok(())
}

fn attach_sponsor(conn: &Connection, trial_id: i64, entry: &SponsorEntry) -> Result<()> {
    match non_empty(entry.organisation.business_key.as_deref()) {
        Some(org_id) => {
            let sponsor_id = sponsors::find_or_create(
                conn,
                entry.organisation.name.as_deref(),
                entry.organisation.org_type.as_deref(),
                entry.primary.unwrap_or(false),
                org_id,
            )?;
            trials::link_sponsor(conn, trial_id, sponsor_id)?;
        }
        None => warn!(
            trial_id,
            name = ?entry.organisation.name,
            "sponsor without business key skipped"
        ),
    }

    // Third parties ride under their sponsor in the payload but link to
    // the trial, so a skipped sponsor does not drop them.
    for third_party in &entry.third_parties {
        attach_third_party(conn, trial_id, third_party)?;
    }
    Ok(())
}

fn attach_third_party(conn: &Connection, trial_id: i64, entry: &ThirdPartyEntry) -> Result<()> {
    let info = &entry.organisation_address;
    let Some(location_id) = location_from_address(conn, info)? else {
        warn!(
            trial_id,
            name = ?info.organisation.name,
            "third party without street address skipped"
        );
        return Ok(());
    };
    let third_party = third_parties::NewThirdParty {
        name: info.organisation.name.clone(),
        tp_type: info.organisation.org_type.clone(),
        is_commercial: info.organisation.commercial.unwrap_or(false),
        org_id: info.organisation.business_key.clone(),
    };
    let third_party_id = third_parties::find_or_create(conn, &third_party, location_id)?;
    trials::link_third_party(conn, trial_id, third_party_id)?;

    for duty in &entry.sponsor_duties {
        let Some(code) = duty.code else { continue };
        let name = decodings::third_party_duty(code, duty.other_duty_description.as_deref());
        let duty_id = third_parties::find_or_create_duty(conn, code, name.as_deref())?;
        third_parties::link_duty(conn, third_party_id, duty_id)?;
    }
    Ok(())
}

fn attach_product(conn: &Connection, trial_id: i64, entry: &ProductEntry) -> Result<()> {
    let dictionary = &entry.product_dictionary_info;
    let product = products::NewProduct {
        name: entry.product_name.clone(),
        active_substance: dictionary.active_substance_name.clone(),
        name_org: dictionary.name_org.clone(),
        pharmaceutical_form_display: entry.pharmaceutical_form_display.clone(),
        is_paediatric_formulation: entry.is_paediatric_formulation,
        role_in_trial_code: entry.mp_role_in_trial,
        orphan_drug: entry.orphan_drug_edit,
        ev_code: entry.ev_code.clone(),
        eu_mp_number: dictionary.eu_mp_number.clone(),
        sponsor_product_code: dictionary.sponsor_product_code.clone(),
    };
    let product_id = products::find_or_create(conn, &product)?;
    trials::link_product(conn, trial_id, product_id)?;

    for substance in &dictionary.product_substances {
        let substance = products::NewSubstance {
            name: substance.act_subst_name.clone(),
            ev_code: substance.substance_ev_code.clone(),
            substance_origin: substance.substance_origin.clone(),
            act_substance_origin: substance.act_subst_origin.clone(),
            product_pk: substance.product_pk.clone(),
            substance_pk: substance.substance_pk.clone(),
        };
        let substance_id = products::find_or_create_substance(conn, &substance)?;
        products::link_substance(conn, product_id, substance_id)?;
    }

    for route in &entry.routes {
        let route = route.trim();
        if route.is_empty() {
            continue;
        }
        let route_id = products::find_or_create_route(conn, route)?;
        products::link_route(conn, product_id, route_id)?;
    }
    Ok(())
}

fn attach_breach(conn: &Connection, trial_id: i64, entry: &SeriousBreachEntry) -> Result<()> {
    let breach = breaches::NewSeriousBreach {
        aware_date: iso_field("awareDate", entry.aware_date.as_deref())?,
        breach_date: iso_field("breachDate", entry.breach_date.as_deref())?,
        submission_date: iso_field("submissionDate", entry.submission_date.as_deref())?,
        updated_on: iso_field("updatedOn", entry.updated_on.as_deref())?,
        description: entry.description.clone(),
        actions_taken: entry.actions_taken.clone(),
        benefit_risk_balance_changed: entry.is_benefit_risk_balance_changed.unwrap_or(false),
    };
    let breach_id = breaches::insert(conn, trial_id, &breach)?;

    for area in &entry.impacted_area_list {
        if let Some(area) = non_empty(Some(area.as_str())) {
            let area_id = breaches::find_or_create_impacted_area(conn, area)?;
            breaches::link_impacted_area(conn, breach_id, area_id)?;
        }
    }

    for category in &entry.categories {
        if let Some(name) = non_empty(category.name.as_deref()) {
            let category_id = breaches::find_or_create_category(conn, name)?;
            breaches::link_category(conn, breach_id, category_id)?;
        }
    }

    // Breach sites carry only the org key; resolve against sites already
    // in the database and skip the rest.
    for site in &entry.serious_breach_sites {
        let Some(org_id) = non_empty(site.organisation_address_info.business_key.as_deref())
        else {
            continue;
        };
        match sites::find_by_org_id(conn, org_id)? {
            Some(site_id) => breaches::link_site(conn, breach_id, site_id)?,
            None => warn!(trial_id, org_id, "breach site references unknown organisation"),
        }
    }
    Ok(())
}

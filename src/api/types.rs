//! Wire types for the CTIS public API and the Nominatim geocoder.
//!
//! The feed omits members freely and has drifted over the years, so the
//! decoder is deliberately tolerant: every branch that can be absent is
//! `Option` or defaulted, and unknown keys are ignored. Dates stay
//! strings here; parsing happens at ingest.

use serde::{Deserialize, Deserializer};

/// Identifier-ish fields (business keys, dictionary pks) arrive as
/// strings from some endpoints and bare numbers from others; store both
/// as strings.
fn opt_string_or_number<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    let raw = Option::<Raw>::deserialize(de)?;
    Ok(raw.map(|v| match v {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    }))
}

// --- Search (overview) endpoint ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<TrialOverview>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub next_page: bool,
    #[serde(default)]
    pub total_records: u64,
}

/// One row of the search results. Only a slice of the advertised
/// columns survives into the database; the rest ride along in the raw
/// JSON and are never decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialOverview {
    pub ct_number: String,
    #[serde(default)]
    pub ct_title: Option<String>,
    #[serde(default)]
    pub ct_status: Option<String>,
    #[serde(default)]
    pub trial_phase: Option<String>,
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub trial_region: Option<i64>,
    #[serde(default)]
    pub total_number_enrolled: i64,
    /// `DD/MM/YYYY`; drives change detection.
    #[serde(default)]
    pub last_updated: Option<String>,
}

// --- Full trial document (retrieve endpoint) ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullTrial {
    #[serde(default)]
    pub ct_status: Option<String>,
    #[serde(default)]
    pub ct_public_status_code: Option<i64>,
    /// Timestamp with optional fractional seconds.
    #[serde(default)]
    pub decision_date: Option<String>,
    #[serde(default, rename = "startDateEU")]
    pub start_date_eu: Option<String>,
    #[serde(default, rename = "endDateEU")]
    pub end_date_eu: Option<String>,
    #[serde(default)]
    pub authorized_application: AuthorizedApplication,
    #[serde(default)]
    pub events: Events,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedApplication {
    #[serde(default)]
    pub eudra_ct: EudraCt,
    #[serde(default)]
    pub authorized_part_i: AuthorizedPartI,
    #[serde(default, rename = "authorizedPartsII")]
    pub authorized_parts_ii: Vec<AuthorizedPartII>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EudraCt {
    #[serde(default)]
    pub is_transitioned: Option<bool>,
    #[serde(default)]
    pub eudra_ct_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedPartI {
    #[serde(default)]
    pub trial_details: TrialDetails,
    #[serde(default)]
    pub therapeutic_areas: Vec<TherapeuticAreaEntry>,
    #[serde(default)]
    pub sponsors: Vec<SponsorEntry>,
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialDetails {
    #[serde(default)]
    pub clinical_trial_identifiers: ClinicalTrialIdentifiers,
    #[serde(default)]
    pub trial_information: TrialInformation,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalTrialIdentifiers {
    #[serde(default)]
    pub short_title: Option<String>,
    #[serde(default)]
    pub secondary_identifying_numbers: SecondaryIdentifyingNumbers,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryIdentifyingNumbers {
    #[serde(default)]
    pub nct_number: NctNumber,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NctNumber {
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialInformation {
    #[serde(default)]
    pub trial_duration: TrialDuration,
    #[serde(default)]
    pub medical_condition: MedicalCondition,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialDuration {
    /// ISO date.
    #[serde(default)]
    pub estimated_recruitment_start_date: Option<String>,
    /// ISO date.
    #[serde(default)]
    pub estimated_end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalCondition {
    #[serde(default, rename = "partIMedicalConditions")]
    pub part_i_medical_conditions: Vec<PartIMedicalCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartIMedicalCondition {
    #[serde(default)]
    pub medical_condition: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapeuticAreaEntry {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorEntry {
    #[serde(default)]
    pub primary: Option<bool>,
    #[serde(default)]
    pub organisation: Organisation,
    #[serde(default)]
    pub third_parties: Vec<ThirdPartyEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub org_type: Option<String>,
    #[serde(default)]
    pub commercial: Option<bool>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub business_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
}

/// Organisation plus postal address; sites and third parties share the
/// shape under different keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationAddress {
    #[serde(default)]
    pub organisation: Organisation,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyEntry {
    #[serde(default)]
    pub organisation_address: OrganisationAddress,
    #[serde(default)]
    pub sponsor_duties: Vec<SponsorDuty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorDuty {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub other_duty_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEntry {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub pharmaceutical_form_display: Option<String>,
    #[serde(default)]
    pub is_paediatric_formulation: Option<bool>,
    #[serde(default)]
    pub mp_role_in_trial: Option<i64>,
    #[serde(default)]
    pub orphan_drug_edit: Option<bool>,
    #[serde(default)]
    pub ev_code: Option<String>,
    #[serde(default)]
    pub routes: Vec<String>,
    #[serde(default)]
    pub product_dictionary_info: ProductDictionaryInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDictionaryInfo {
    #[serde(default)]
    pub active_substance_name: Option<String>,
    #[serde(default)]
    pub name_org: Option<String>,
    #[serde(default)]
    pub eu_mp_number: Option<String>,
    #[serde(default)]
    pub sponsor_product_code: Option<String>,
    #[serde(default)]
    pub product_substances: Vec<ProductSubstance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSubstance {
    #[serde(default)]
    pub act_subst_name: Option<String>,
    #[serde(default)]
    pub substance_ev_code: Option<String>,
    #[serde(default)]
    pub substance_origin: Option<String>,
    #[serde(default)]
    pub act_subst_origin: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub product_pk: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub substance_pk: Option<String>,
}

/// One member state's part II section; only the site list matters here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedPartII {
    #[serde(default)]
    pub trial_sites: Vec<TrialSiteEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialSiteEntry {
    #[serde(default)]
    pub organisation_address_info: OrganisationAddress,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Events {
    #[serde(default)]
    pub serious_breaches: Vec<SeriousBreachEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriousBreachEntry {
    #[serde(default)]
    pub aware_date: Option<String>,
    #[serde(default)]
    pub breach_date: Option<String>,
    #[serde(default)]
    pub submission_date: Option<String>,
    #[serde(default)]
    pub updated_on: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actions_taken: Option<String>,
    #[serde(default)]
    pub is_benefit_risk_balance_changed: Option<bool>,
    #[serde(default)]
    pub impacted_area_list: Vec<String>,
    #[serde(default)]
    pub categories: Vec<BreachCategoryEntry>,
    #[serde(default)]
    pub serious_breach_sites: Vec<BreachSiteEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreachCategoryEntry {
    #[serde(default)]
    pub name: Option<String>,
}

/// Breach sites reference a site org key directly, without the nested
/// organisation object the other address blocks use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreachSiteEntry {
    #[serde(default)]
    pub organisation_address_info: BreachSiteInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreachSiteInfo {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub business_key: Option<String>,
}

// --- Nominatim ---

/// One geocoder hit; coordinates come back as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeHit {
    pub lat: String,
    pub lon: String,
}

//! Display names for the coded picklists CTIS returns.
//!
//! The API sends third-party duties as bare integer codes. The portal
//! renders them from a reference list that is not part of the payload,
//! so the mapping lives here. Codes we do not recognise keep their code
//! and get a NULL name in the database rather than failing the trial.

/// Code CTIS uses for the free-text "Other" duty.
const OTHER_DUTY_CODE: i64 = 13;

static THIRD_PARTY_DUTIES: &[(i64, &str)] = &[
    (1, "Regulatory compliance"),
    (2, "Trial registration and results posting"),
    (3, "Safety reporting to authorities"),
    (4, "Trial monitoring"),
    (5, "Data management"),
    (6, "Statistical analysis"),
    (7, "Medical expertise"),
    (8, "Investigational medicinal product supply"),
    (9, "Site management"),
    (10, "Pharmacovigilance"),
    (11, "Quality assurance and auditing"),
    (12, "Archiving"),
    (OTHER_DUTY_CODE, "Other"),
];

/// Resolve a duty code to its display name.
///
/// For the "Other" code the payload carries the actual duty as free
/// text, which wins over the generic label when present.
pub fn third_party_duty(code: i64, other_description: Option<&str>) -> Option<String> {
    if code == OTHER_DUTY_CODE {
        if let Some(text) = other_description.map(str::trim).filter(|t| !t.is_empty()) {
            return Some(text.to_string());
        }
    }
    THIRD_PARTY_DUTIES
        .iter()
        .find(|&&(c, _)| c == code)
        .map(|&(_, name)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_code() {
        assert_eq!(third_party_duty(4, None), Some("Trial monitoring".into()));
    }

    #[test]
    fn other_code_prefers_payload_text() {
        assert_eq!(
            third_party_duty(13, Some("Courier services")),
            Some("Courier services".into())
        );
    }

    #[test]
    fn other_code_without_text_keeps_generic_label() {
        assert_eq!(third_party_duty(13, None), Some("Other".into()));
        assert_eq!(third_party_duty(13, Some("  ")), Some("Other".into()));
    }

    #[test]
    fn free_text_is_ignored_for_specific_codes() {
        assert_eq!(
            third_party_duty(5, Some("should not show up")),
            Some("Data management".into())
        );
    }

    #[test]
    fn unknown_code_is_none() {
        assert_eq!(third_party_duty(999, None), None);
    }
}

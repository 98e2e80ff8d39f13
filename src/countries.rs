//! Country-name to ISO 3166 code mapping.
//!
//! CTIS address payloads carry free-text country names. EU/EEA member
//! states dominate, but third-country sites show up routinely, so the
//! table covers the names that actually occur in the feed plus the
//! spelling variants CTIS has used. Unknown names resolve to `None` and
//! end up as NULL ISO columns, same as any other unmappable value.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Lowercased name (or alias) -> (alpha-2, alpha-3).
static COUNTRIES: &[(&str, &str, &str)] = &[
    // EU member states
    ("austria", "AT", "AUT"),
    ("belgium", "BE", "BEL"),
    ("bulgaria", "BG", "BGR"),
    ("croatia", "HR", "HRV"),
    ("cyprus", "CY", "CYP"),
    ("czechia", "CZ", "CZE"),
    ("czech republic", "CZ", "CZE"),
    ("denmark", "DK", "DNK"),
    ("estonia", "EE", "EST"),
    ("finland", "FI", "FIN"),
    ("france", "FR", "FRA"),
    ("germany", "DE", "DEU"),
    ("greece", "GR", "GRC"),
    ("hungary", "HU", "HUN"),
    ("ireland", "IE", "IRL"),
    ("italy", "IT", "ITA"),
    ("latvia", "LV", "LVA"),
    ("lithuania", "LT", "LTU"),
    ("luxembourg", "LU", "LUX"),
    ("malta", "MT", "MLT"),
    ("netherlands", "NL", "NLD"),
    ("poland", "PL", "POL"),
    ("portugal", "PT", "PRT"),
    ("romania", "RO", "ROU"),
    ("slovakia", "SK", "SVK"),
    ("slovenia", "SI", "SVN"),
    ("spain", "ES", "ESP"),
    ("sweden", "SE", "SWE"),
    // EEA / EFTA
    ("iceland", "IS", "ISL"),
    ("liechtenstein", "LI", "LIE"),
    ("norway", "NO", "NOR"),
    ("switzerland", "CH", "CHE"),
    // Wider Europe
    ("united kingdom", "GB", "GBR"),
    ("united kingdom of great britain and northern ireland", "GB", "GBR"),
    ("great britain", "GB", "GBR"),
    ("albania", "AL", "ALB"),
    ("andorra", "AD", "AND"),
    ("armenia", "AM", "ARM"),
    ("belarus", "BY", "BLR"),
    ("bosnia and herzegovina", "BA", "BIH"),
    ("georgia", "GE", "GEO"),
    ("gibraltar", "GI", "GIB"),
    ("kosovo", "XK", "XKX"),
    ("moldova", "MD", "MDA"),
    ("moldova, republic of", "MD", "MDA"),
    ("monaco", "MC", "MCO"),
    ("montenegro", "ME", "MNE"),
    ("north macedonia", "MK", "MKD"),
    ("russia", "RU", "RUS"),
    ("russian federation", "RU", "RUS"),
    ("san marino", "SM", "SMR"),
    ("serbia", "RS", "SRB"),
    ("turkey", "TR", "TUR"),
    ("türkiye", "TR", "TUR"),
    ("ukraine", "UA", "UKR"),
    ("faroe islands", "FO", "FRO"),
    ("greenland", "GL", "GRL"),
    // Americas
    ("argentina", "AR", "ARG"),
    ("bolivia", "BO", "BOL"),
    ("bolivia, plurinational state of", "BO", "BOL"),
    ("brazil", "BR", "BRA"),
    ("canada", "CA", "CAN"),
    ("chile", "CL", "CHL"),
    ("colombia", "CO", "COL"),
    ("costa rica", "CR", "CRI"),
    ("cuba", "CU", "CUB"),
    ("dominican republic", "DO", "DOM"),
    ("ecuador", "EC", "ECU"),
    ("guatemala", "GT", "GTM"),
    ("mexico", "MX", "MEX"),
    ("panama", "PA", "PAN"),
    ("paraguay", "PY", "PRY"),
    ("peru", "PE", "PER"),
    ("puerto rico", "PR", "PRI"),
    ("united states", "US", "USA"),
    ("united states of america", "US", "USA"),
    ("usa", "US", "USA"),
    ("uruguay", "UY", "URY"),
    ("venezuela", "VE", "VEN"),
    // Asia-Pacific
    ("australia", "AU", "AUS"),
    ("bangladesh", "BD", "BGD"),
    ("china", "CN", "CHN"),
    ("hong kong", "HK", "HKG"),
    ("india", "IN", "IND"),
    ("indonesia", "ID", "IDN"),
    ("japan", "JP", "JPN"),
    ("kazakhstan", "KZ", "KAZ"),
    ("malaysia", "MY", "MYS"),
    ("new zealand", "NZ", "NZL"),
    ("pakistan", "PK", "PAK"),
    ("philippines", "PH", "PHL"),
    ("republic of korea", "KR", "KOR"),
    ("korea, republic of", "KR", "KOR"),
    ("south korea", "KR", "KOR"),
    ("singapore", "SG", "SGP"),
    ("taiwan", "TW", "TWN"),
    ("taiwan, province of china", "TW", "TWN"),
    ("thailand", "TH", "THA"),
    ("vietnam", "VN", "VNM"),
    ("viet nam", "VN", "VNM"),
    // Middle East and Africa
    ("egypt", "EG", "EGY"),
    ("ethiopia", "ET", "ETH"),
    ("ghana", "GH", "GHA"),
    ("iran", "IR", "IRN"),
    ("iran, islamic republic of", "IR", "IRN"),
    ("iraq", "IQ", "IRQ"),
    ("israel", "IL", "ISR"),
    ("jordan", "JO", "JOR"),
    ("kenya", "KE", "KEN"),
    ("kuwait", "KW", "KWT"),
    ("lebanon", "LB", "LBN"),
    ("morocco", "MA", "MAR"),
    ("nigeria", "NG", "NGA"),
    ("qatar", "QA", "QAT"),
    ("saudi arabia", "SA", "SAU"),
    ("senegal", "SN", "SEN"),
    ("south africa", "ZA", "ZAF"),
    ("tanzania", "TZ", "TZA"),
    ("tanzania, united republic of", "TZ", "TZA"),
    ("tunisia", "TN", "TUN"),
    ("uganda", "UG", "UGA"),
    ("united arab emirates", "AE", "ARE"),
];

fn table() -> &'static HashMap<&'static str, (&'static str, &'static str)> {
    static TABLE: OnceLock<HashMap<&'static str, (&'static str, &'static str)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        COUNTRIES
            .iter()
            .map(|&(name, a2, a3)| (name, (a2, a3)))
            .collect()
    })
}

/// Strip the decorations CTIS applies to country names: surrounding
/// whitespace, a leading "the " and a trailing " (the)".
fn normalize(name: &str) -> String {
    let name = name.trim().to_lowercase();
    let name = name.strip_suffix(" (the)").unwrap_or(name.as_str());
    let name = name.strip_prefix("the ").unwrap_or(name);
    name.to_string()
}

/// Resolve a country name to its (alpha-2, alpha-3) ISO 3166 codes.
pub fn iso_codes(name: &str) -> Option<(&'static str, &'static str)> {
    table().get(normalize(name).as_str()).copied()
}

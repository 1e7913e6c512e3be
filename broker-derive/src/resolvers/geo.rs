//! Geographic resolution: ZIP lookups, ZIP splitting, territory
//! normalization and congressional-district sentinels

use crate::models::fields::present;
use crate::snapshot::ReferenceSnapshot;
use once_cell::sync::Lazy;
use regex::Regex;

pub const US_COUNTRY_CODE: &str = "USA";
pub const US_COUNTRY_NAME: &str = "UNITED STATES";

/// District unknown, or the ZIP5 spans several districts
pub const CD_UNKNOWN: &str = "90";

/// States represented by a single at-large district
const AT_LARGE_STATES: &[&str] = &["AK", "DE", "MT", "ND", "SD", "VT", "WY"];
/// Territories with a non-voting delegate
const NON_VOTING_TERRITORIES: &[&str] = &["AS", "DC", "GU", "MP", "PR", "VI"];
/// Insular areas with no representation
const INSULAR_AREAS: &[&str] = &["FM", "MH", "PW", "UM"];

/// Three-letter territory country codes and the state slot they occupy
const TERRITORY_STATE_SLOTS: &[(&str, &str)] = &[
    ("ASM", "AS"),
    ("GUM", "GU"),
    ("MNP", "MP"),
    ("PRI", "PR"),
    ("VIR", "VI"),
    ("FSM", "FM"),
    ("MHL", "MH"),
    ("PLW", "PW"),
    ("XBK", "UM"),
    ("XHO", "UM"),
    ("XJV", "UM"),
    ("XJA", "UM"),
    ("XKR", "UM"),
    ("XPL", "UM"),
    ("XMW", "UM"),
    ("XWK", "UM"),
];

static ZIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{5})(?:-?(\d{4}))?$").expect("valid zip regex"));

/// State slot for a territory country code, `None` for anything else
pub fn territory_state(country_code: &str) -> Option<&'static str> {
    let code = country_code.trim().to_uppercase();
    TERRITORY_STATE_SLOTS
        .iter()
        .find(|(country, _)| *country == code)
        .map(|(_, state)| *state)
}

/// True for a state slot that a territory country code maps to
pub fn is_territory_state(state: &str) -> bool {
    let state = state.trim().to_uppercase();
    TERRITORY_STATE_SLOTS.iter().any(|(_, slot)| *slot == state)
}

/// True for `USA` in any case
pub fn is_usa(country_code: Option<&str>) -> bool {
    country_code
        .map(|c| c.trim().eq_ignore_ascii_case(US_COUNTRY_CODE))
        .unwrap_or(false)
}

/// Country name for a code; `USA` always maps to the canonical name
pub fn country_name(snapshot: &ReferenceSnapshot, code: &str) -> Option<String> {
    if is_usa(Some(code)) {
        Some(US_COUNTRY_NAME.to_string())
    } else {
        snapshot.country_name(code).map(str::to_string)
    }
}

// ============================================================================
// ZIP handling
// ============================================================================

/// A ZIP split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipParts {
    pub zip5: String,
    pub zip4: Option<String>,
}

/// Parse `12345`, `123456789` or `12345-6789`
pub fn parse_zip(value: &str) -> Option<ZipParts> {
    let caps = ZIP_RE.captures(value.trim())?;
    Some(ZipParts {
        zip5: caps.get(1)?.as_str().to_string(),
        zip4: caps.get(2).map(|m| m.as_str().to_string()),
    })
}

/// Split `source` into the zip5/zip4 slots
///
/// Returns false and leaves both slots untouched when the value does not
/// parse as a ZIP.
pub fn split_zip(source: &Option<String>, zip5: &mut Option<String>, zip4: &mut Option<String>) -> bool {
    match present(source).and_then(parse_zip) {
        Some(parts) => {
            *zip5 = Some(parts.zip5);
            *zip4 = parts.zip4;
            true
        }
        None => false,
    }
}

/// Geography resolved from a ZIP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipMatch {
    pub state: String,
    pub county: String,
    pub congressional_district: Option<String>,
    /// Distinct districts behind the ZIP5
    ///
    /// An exact ZIP+4 hit reports 1 instead: its single district is
    /// authoritative even when the ZIP5 spans several.
    pub cd_count: usize,
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve a ZIP5 (and optional ZIP+4) to state, county and district
///
/// A malformed ZIP resolves to nothing. A ZIP+4 that misses falls back to
/// the ZIP5 summary.
pub fn resolve_zip(snapshot: &ReferenceSnapshot, zip5: &str, zip4: Option<&str>) -> Option<ZipMatch> {
    let zip5 = zip5.trim();
    let zip4 = zip4.map(str::trim).filter(|z| !z.is_empty());
    if !is_digits(zip5, 5) || zip4.map(|z| !is_digits(z, 4)).unwrap_or(false) {
        return None;
    }

    if let Some(geo) = zip4.and_then(|z4| snapshot.zip9(zip5, z4)) {
        return Some(ZipMatch {
            state: geo.state.clone(),
            county: geo.county.clone(),
            congressional_district: geo.congressional_district.clone(),
            cd_count: 1,
        });
    }

    snapshot.zip5(zip5).map(|entry| ZipMatch {
        state: entry.geo.state.clone(),
        county: entry.geo.county.clone(),
        congressional_district: entry.geo.congressional_district.clone(),
        cd_count: entry.cd_count(),
    })
}

// ============================================================================
// Congressional district
// ============================================================================

/// Fixed district for states and territories that have no numbered districts
pub fn district_override(state: &str) -> Option<&'static str> {
    let state = state.trim().to_uppercase();
    let state = state.as_str();
    if AT_LARGE_STATES.contains(&state) {
        Some("00")
    } else if NON_VOTING_TERRITORIES.contains(&state) {
        Some("98")
    } else if INSULAR_AREAS.contains(&state) {
        Some("99")
    } else {
        None
    }
}

/// Pick the congressional district for a location
///
/// A submitted district is kept as-is. Otherwise the ZIP's district is used
/// when it is unambiguous, else [`CD_UNKNOWN`]; the state override then
/// replaces the derived value.
pub fn derive_congressional_district(
    current: Option<&str>,
    zip_cd: Option<&str>,
    cd_count: usize,
    state: Option<&str>,
) -> Option<String> {
    if let Some(current) = current.map(str::trim).filter(|c| !c.is_empty()) {
        return Some(current.to_string());
    }

    if let Some(fixed) = state.and_then(district_override) {
        return Some(fixed.to_string());
    }

    match zip_cd.map(str::trim).filter(|c| !c.is_empty()) {
        Some(cd) if cd_count == 1 => Some(cd.to_string()),
        _ => Some(CD_UNKNOWN.to_string()),
    }
}

// ============================================================================
// Territory normalization
// ============================================================================

/// Mutable view of one location's country and state slots
pub struct LocationFieldsMut<'a> {
    pub country_code: &'a mut Option<String>,
    pub country_name: &'a mut Option<String>,
    pub state_code: &'a mut Option<String>,
    pub state_name: &'a mut Option<String>,
}

/// Rewrite a US-territory country code to `USA` with the territory in the state slot
///
/// Afterwards a present country code with a blank name gets its name filled.
pub fn normalize_us_territory_country(snapshot: &ReferenceSnapshot, fields: LocationFieldsMut<'_>) {
    let LocationFieldsMut {
        country_code,
        country_name: name_slot,
        state_code,
        state_name,
    } = fields;

    let territory = present(country_code)
        .filter(|c| !is_usa(Some(*c)))
        .and_then(territory_state);

    if let Some(slot) = territory {
        *state_code = Some(slot.to_string());
        *state_name = snapshot.state_name(slot).map(str::to_string);
        *country_code = Some(US_COUNTRY_CODE.to_string());
        *name_slot = Some(US_COUNTRY_NAME.to_string());
    }

    if present(name_slot).is_none() {
        if let Some(code) = present(country_code) {
            *name_slot = country_name(snapshot, code);
        }
    }
}

//! Place-of-performance code grammar, location and scope
//!
//! A place-of-performance code is seven characters:
//!
//! | Code      | Variant                       |
//! |-----------|-------------------------------|
//! | `00FORGN` | `Foreign`                     |
//! | `00*****` | `MultiState` (no city)        |
//! | `00NNNNN` | `MultiState` with a city code |
//! | `XX*****` | `StateWide`                   |
//! | `XX**NNN` | `CountyWide`                  |
//! | `XXNNNNN` | `City`                        |
//! | `XXNNNNR` | `Rural`                       |

use super::geo::{derive_congressional_district, parse_zip, resolve_zip};
use crate::snapshot::ReferenceSnapshot;
use once_cell::sync::Lazy;
use regex::Regex;

pub const SCOPE_SINGLE_ZIP: &str = "Single ZIP Code";
pub const SCOPE_CITY_WIDE: &str = "City-wide";
pub const SCOPE_COUNTY_WIDE: &str = "County-wide";
pub const SCOPE_STATE_WIDE: &str = "State-wide";
pub const SCOPE_MULTI_STATE: &str = "Multi-state";
pub const SCOPE_FOREIGN: &str = "Foreign";

/// State name written for multi-state codes
pub const MULTI_STATE_NAME: &str = "Multi-state";

/// Place-of-performance code for foreign performance
pub const FOREIGN_CODE: &str = "00FORGN";

/// Literal ZIP value meaning "the whole city"
pub const CITY_WIDE_ZIP: &str = "CITY-WIDE";

static PLACE_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:00(?P<multi>FORGN|\*{5}|\d{5})|(?P<state>[A-Z]{2})(?P<tail>\*{5}|\*\*\d{3}|\d{4}[\dR]))$")
        .expect("valid place-of-performance regex")
});

/// Parsed place-of-performance code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceCode {
    Foreign,
    MultiState { city_code: Option<String> },
    StateWide { state: String },
    CountyWide { state: String, county: String },
    City { state: String, city_code: String },
    Rural { state: String, city_code: String },
}

impl PlaceCode {
    /// Parse a code, case-insensitively; `None` when it fits no pattern
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_uppercase();
        let caps = PLACE_CODE_RE.captures(&code)?;

        if let Some(multi) = caps.name("multi") {
            return Some(match multi.as_str() {
                "FORGN" => PlaceCode::Foreign,
                "*****" => PlaceCode::MultiState { city_code: None },
                digits => PlaceCode::MultiState {
                    city_code: Some(digits.to_string()),
                },
            });
        }

        let state = caps.name("state")?.as_str().to_string();
        let tail = caps.name("tail")?.as_str();
        Some(if tail == "*****" {
            PlaceCode::StateWide { state }
        } else if let Some(county) = tail.strip_prefix("**") {
            PlaceCode::CountyWide {
                state,
                county: county.to_string(),
            }
        } else if tail.ends_with('R') {
            PlaceCode::Rural {
                state,
                city_code: tail.to_string(),
            }
        } else {
            PlaceCode::City {
                state,
                city_code: tail.to_string(),
            }
        })
    }

    /// State prefix for state-scoped variants
    pub fn state(&self) -> Option<&str> {
        match self {
            PlaceCode::StateWide { state }
            | PlaceCode::CountyWide { state, .. }
            | PlaceCode::City { state, .. }
            | PlaceCode::Rural { state, .. } => Some(state),
            PlaceCode::Foreign | PlaceCode::MultiState { .. } => None,
        }
    }

    /// City code worth looking up (not rural, not all zeros)
    pub fn lookup_city_code(&self) -> Option<(&str, &str)> {
        match self {
            PlaceCode::City { state, city_code } if city_code != "00000" => {
                Some((state.as_str(), city_code.as_str()))
            }
            _ => None,
        }
    }
}

/// True when the ZIP slot holds the city-wide marker
pub fn is_city_wide(zip4a: Option<&str>) -> bool {
    zip4a
        .map(|z| z.trim().eq_ignore_ascii_case(CITY_WIDE_ZIP))
        .unwrap_or(false)
}

/// Geographic scope of a place of performance
///
/// `zip5_present` is whether a ZIP5 ended up on the record (split from the
/// ZIP slot or copied from the recipient).
pub fn derive_scope(place: Option<&PlaceCode>, zip4a: Option<&str>, zip5_present: bool) -> Option<&'static str> {
    Some(match place? {
        PlaceCode::Foreign => SCOPE_FOREIGN,
        PlaceCode::MultiState { .. } => SCOPE_MULTI_STATE,
        PlaceCode::StateWide { .. } => SCOPE_STATE_WIDE,
        PlaceCode::CountyWide { .. } => SCOPE_COUNTY_WIDE,
        PlaceCode::City { .. } | PlaceCode::Rural { .. } => {
            if is_city_wide(zip4a) {
                SCOPE_CITY_WIDE
            } else if zip5_present {
                SCOPE_SINGLE_ZIP
            } else {
                SCOPE_STATE_WIDE
            }
        }
    })
}

/// Location fields derived for a place of performance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PpopLocation {
    pub city_name: Option<String>,
    pub county_code: Option<String>,
    pub county_name: Option<String>,
    /// Set only when a ZIP resolved; otherwise the submitted district stands
    pub congressional_district: Option<String>,
}

/// Resolve city, county and district for a place of performance
///
/// A usable ZIP wins; the code fills whatever the ZIP could not.
pub fn resolve_ppop_location(
    snapshot: &ReferenceSnapshot,
    place: Option<&PlaceCode>,
    zip4a: Option<&str>,
    current_cd: Option<&str>,
) -> PpopLocation {
    let mut location = PpopLocation::default();

    let zip = zip4a
        .filter(|z| !is_city_wide(Some(*z)))
        .and_then(parse_zip);
    if let Some(parts) = zip {
        if let Some(hit) = resolve_zip(snapshot, &parts.zip5, parts.zip4.as_deref()) {
            location.county_name = snapshot
                .county_name(&hit.state, &hit.county)
                .map(str::to_string);
            location.city_name = snapshot.zip_city(&parts.zip5).map(str::to_string);
            location.congressional_district = derive_congressional_district(
                current_cd,
                hit.congressional_district.as_deref(),
                hit.cd_count,
                Some(hit.state.as_str()),
            );
            location.county_code = Some(hit.county);
        }
    }

    match place {
        Some(PlaceCode::CountyWide { state, county }) if location.county_code.is_none() => {
            location.county_name = snapshot.county_name(state, county).map(str::to_string);
            location.county_code = Some(county.clone());
        }
        Some(code) => {
            if let Some(city) = code
                .lookup_city_code()
                .and_then(|(state, city_code)| snapshot.city(state, city_code))
            {
                if location.city_name.is_none() {
                    location.city_name = Some(city.name.clone());
                }
                if location.county_code.is_none() {
                    location.county_code = city.county_number.clone();
                    location.county_name = city.county_name.clone();
                }
            }
        }
        None => {}
    }

    location
}

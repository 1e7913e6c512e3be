//! Recipient (legal entity) location for assistance records

use super::geo::{
    derive_congressional_district, is_territory_state, is_usa, normalize_us_territory_country,
    resolve_zip, LocationFieldsMut,
};
use super::ppop::PlaceCode;
use crate::models::fields::present;
use crate::models::{FabsRecord, RecordType};
use crate::snapshot::ReferenceSnapshot;

/// Where a record's recipient location comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegalEntityStrategy {
    /// Aggregate records: location follows the place-of-performance code
    PlaceBased,
    /// Individual awards: location follows the recipient ZIP
    ZipBased,
}

impl LegalEntityStrategy {
    pub fn for_record_type(record_type: Option<RecordType>) -> Self {
        match record_type {
            Some(RecordType::Aggregate) => LegalEntityStrategy::PlaceBased,
            _ => LegalEntityStrategy::ZipBased,
        }
    }
}

fn territory_fields(record: &mut FabsRecord) -> LocationFieldsMut<'_> {
    LocationFieldsMut {
        country_code: &mut record.legal_entity_country_code,
        country_name: &mut record.legal_entity_country_name,
        state_code: &mut record.legal_entity_state_code,
        state_name: &mut record.legal_entity_state_name,
    }
}

/// A domestic territory state that geography from `other_state` must not replace
fn holds_other_territory(record: &FabsRecord, other_state: &str) -> bool {
    is_usa(present(&record.legal_entity_country_code))
        && present(&record.legal_entity_state_code)
            .map(|state| is_territory_state(state) && !state.eq_ignore_ascii_case(other_state))
            .unwrap_or(false)
}

fn place_based(snapshot: &ReferenceSnapshot, record: &mut FabsRecord, place: Option<&PlaceCode>) {
    record.legal_entity_congressional = None;

    match place {
        Some(PlaceCode::CountyWide { state, county }) => {
            if holds_other_territory(record, state) {
                return;
            }
            record.legal_entity_state_code = Some(state.clone());
            record.legal_entity_county_code = Some(county.clone());
            record.legal_entity_county_name = snapshot.county_name(state, county).map(str::to_string);
            record.legal_entity_congressional = record.place_of_performance_congr.clone();
        }
        Some(PlaceCode::StateWide { state }) => {
            if !holds_other_territory(record, state) {
                record.legal_entity_state_code = Some(state.clone());
            }
        }
        _ => {}
    }
}

fn zip_based(snapshot: &ReferenceSnapshot, record: &mut FabsRecord) {
    let Some(zip5) = present(&record.legal_entity_zip5) else {
        return;
    };
    let Some(hit) = resolve_zip(snapshot, zip5, present(&record.legal_entity_zip_last4)) else {
        return;
    };
    if holds_other_territory(record, &hit.state) {
        return;
    }

    if let Some(city) = snapshot.zip_city(zip5) {
        record.legal_entity_city_name = Some(city.to_string());
    }
    record.legal_entity_county_name = snapshot
        .county_name(&hit.state, &hit.county)
        .map(str::to_string);
    record.legal_entity_congressional = derive_congressional_district(
        present(&record.legal_entity_congressional),
        hit.congressional_district.as_deref(),
        hit.cd_count,
        Some(hit.state.as_str()),
    );
    record.legal_entity_county_code = Some(hit.county);
    record.legal_entity_state_code = Some(hit.state);
}

/// Resolve the recipient's state, county and district
///
/// Runs after the place-of-performance steps: aggregate records read the
/// place-of-performance district.
pub fn resolve_legal_entity_location(
    snapshot: &ReferenceSnapshot,
    record: &mut FabsRecord,
    place: Option<&PlaceCode>,
) {
    normalize_us_territory_country(snapshot, territory_fields(record));

    match LegalEntityStrategy::for_record_type(record.record_type()) {
        LegalEntityStrategy::PlaceBased => place_based(snapshot, record, place),
        LegalEntityStrategy::ZipBased => zip_based(snapshot, record),
    }

    // Foreign recipients keep their submitted state text as-is
    let country = present(&record.legal_entity_country_code);
    if country.is_none() || is_usa(country) {
        if present(&record.legal_entity_state_code).is_none() {
            record.legal_entity_state_code = present(&record.legal_entity_state_name)
                .and_then(|name| snapshot.state_by_name(name))
                .map(str::to_string);
        }
        if let Some(name) = present(&record.legal_entity_state_code).and_then(|s| snapshot.state_name(s)) {
            record.legal_entity_state_name = Some(name.to_string());
        }
    }
}

/// Look up the recipient city code from city name and state
///
/// Left alone unless both are present; a miss clears it.
pub fn resolve_legal_entity_city_code(snapshot: &ReferenceSnapshot, record: &mut FabsRecord) {
    if let (Some(city), Some(state)) = (
        present(&record.legal_entity_city_name),
        present(&record.legal_entity_state_code),
    ) {
        record.legal_entity_city_code = snapshot.city_code_by_name(state, city).map(str::to_string);
    }
}

//! Place of performance for PII-redacted records
//!
//! Individual recipients do not report a separate place of performance; it
//! is taken from the recipient's own location.

use super::geo::is_usa;
use super::ppop::FOREIGN_CODE;
use crate::models::fields::present;
use crate::models::FabsRecord;

/// City code used when a domestic recipient has none
const STATEWIDE_CITY_CODE: &str = "00000";

/// Copy recipient location into the place-of-performance slots
pub fn copy_recipient_location(record: &mut FabsRecord) {
    record.place_of_perform_country_c = record.legal_entity_country_code.clone();
    record.place_of_perform_country_n = record.legal_entity_country_name.clone();

    if is_usa(present(&record.legal_entity_country_code)) {
        record.place_of_performance_city = record.legal_entity_city_name.clone();
        record.place_of_perform_county_co = record.legal_entity_county_code.clone();
        record.place_of_perform_county_na = record.legal_entity_county_name.clone();
        record.place_of_perfor_state_code = record.legal_entity_state_code.clone();
        record.place_of_perform_state_nam = record.legal_entity_state_name.clone();
        record.place_of_performance_zip5 = record.legal_entity_zip5.clone();
        record.place_of_performance_congr = record.legal_entity_congressional.clone();

        if let Some(state) = present(&record.legal_entity_state_code) {
            let city_code = present(&record.legal_entity_city_code).unwrap_or(STATEWIDE_CITY_CODE);
            record.place_of_performance_code = Some(format!("{}{}", state, city_code).to_uppercase());
        }
    } else {
        // Domestic geography parsed from a submitted code no longer applies
        record.place_of_perfor_state_code = None;
        record.place_of_perform_state_nam = None;
        record.place_of_perform_county_co = None;
        record.place_of_perform_county_na = None;
        record.place_of_performance_zip5 = None;
        record.place_of_perform_zip_last4 = None;
        record.place_of_performance_congr = None;
        record.place_of_performance_city = record.legal_entity_foreign_city.clone();
        record.place_of_performance_forei = record.legal_entity_foreign_city.clone();
        record.place_of_performance_code = Some(FOREIGN_CODE.to_string());
    }
}

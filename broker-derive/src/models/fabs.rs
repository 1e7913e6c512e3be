//! Financial-assistance transaction record
//!
//! Field names follow the published column names, truncation included
//! (`place_of_perform_county_co`, `correction_delete_indicatr`, ...), so a
//! record serializes straight back into the row shape hosts expect.

use super::fields::{lenient_f64, lenient_i32, present};
use super::officers::HighCompOfficers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which location fields of a FABS record are authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// 1: aggregate record, location comes from the place of performance
    Aggregate,
    /// 2: non-aggregate record
    NonAggregate,
    /// 3: non-aggregate record to an individual recipient (PII-redacted)
    PiiRedacted,
}

impl RecordType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(RecordType::Aggregate),
            2 => Some(RecordType::NonAggregate),
            3 => Some(RecordType::PiiRedacted),
            _ => None,
        }
    }
}

/// One FABS transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabsRecord {
    // ========================================================================
    // Award identification
    // ========================================================================
    pub fain: Option<String>,
    pub uri: Option<String>,
    pub award_modification_amendme: Option<String>,
    pub sai_number: Option<String>,
    pub afa_generated_unique: Option<String>,
    pub unique_award_key: Option<String>,
    #[serde(deserialize_with = "lenient_i32")]
    pub record_type: Option<i32>,
    pub record_type_description: Option<String>,
    pub correction_delete_indicatr: Option<String>,
    pub correction_delete_ind_desc: Option<String>,
    pub action_date: Option<String>,
    pub action_type: Option<String>,
    pub action_type_description: Option<String>,
    pub assistance_type: Option<String>,
    pub assistance_type_desc: Option<String>,
    pub award_description: Option<String>,
    pub business_funds_indicator: Option<String>,
    pub business_funds_ind_desc: Option<String>,
    pub cfda_number: Option<String>,
    pub cfda_title: Option<String>,
    pub funding_opportunity_number: Option<String>,
    pub funding_opportunity_goals: Option<String>,
    pub period_of_performance_star: Option<String>,
    pub period_of_performance_curr: Option<String>,

    // ========================================================================
    // Amounts
    // ========================================================================
    #[serde(deserialize_with = "lenient_f64")]
    pub federal_action_obligation: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub non_federal_funding_amount: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_funding_amount: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub face_value_loan_guarantee: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub original_loan_subsidy_cost: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub indirect_federal_sharing: Option<f64>,

    // ========================================================================
    // Agencies and offices
    // ========================================================================
    pub awarding_agency_code: Option<String>,
    pub awarding_agency_name: Option<String>,
    pub awarding_sub_tier_agency_c: Option<String>,
    pub awarding_sub_tier_agency_n: Option<String>,
    pub awarding_office_code: Option<String>,
    pub awarding_office_name: Option<String>,
    pub funding_agency_code: Option<String>,
    pub funding_agency_name: Option<String>,
    pub funding_sub_tier_agency_co: Option<String>,
    pub funding_sub_tier_agency_na: Option<String>,
    pub funding_office_code: Option<String>,
    pub funding_office_name: Option<String>,

    // ========================================================================
    // Recipient (legal entity)
    // ========================================================================
    pub awardee_or_recipient_legal: Option<String>,
    pub awardee_or_recipient_uniqu: Option<String>,
    pub uei: Option<String>,
    pub ultimate_parent_legal_enti: Option<String>,
    pub ultimate_parent_unique_ide: Option<String>,
    pub business_types: Option<String>,
    pub business_types_desc: Option<String>,
    pub business_categories: Option<Vec<String>>,
    pub legal_entity_address_line1: Option<String>,
    pub legal_entity_address_line2: Option<String>,
    pub legal_entity_address_line3: Option<String>,
    pub legal_entity_city_code: Option<String>,
    pub legal_entity_city_name: Option<String>,
    pub legal_entity_congressional: Option<String>,
    pub legal_entity_country_code: Option<String>,
    pub legal_entity_country_name: Option<String>,
    pub legal_entity_county_code: Option<String>,
    pub legal_entity_county_name: Option<String>,
    pub legal_entity_foreign_city: Option<String>,
    pub legal_entity_foreign_descr: Option<String>,
    pub legal_entity_foreign_posta: Option<String>,
    pub legal_entity_foreign_provi: Option<String>,
    pub legal_entity_state_code: Option<String>,
    pub legal_entity_state_name: Option<String>,
    pub legal_entity_zip5: Option<String>,
    pub legal_entity_zip_last4: Option<String>,

    // ========================================================================
    // Place of performance
    // ========================================================================
    pub place_of_performance_code: Option<String>,
    pub place_of_performance_city: Option<String>,
    pub place_of_performance_congr: Option<String>,
    pub place_of_perform_country_c: Option<String>,
    pub place_of_perform_country_n: Option<String>,
    pub place_of_perform_county_co: Option<String>,
    pub place_of_perform_county_na: Option<String>,
    pub place_of_performance_forei: Option<String>,
    pub place_of_perfor_state_code: Option<String>,
    pub place_of_perform_state_nam: Option<String>,
    pub place_of_performance_zip4a: Option<String>,
    pub place_of_performance_zip5: Option<String>,
    pub place_of_perform_zip_last4: Option<String>,
    pub place_of_performance_scope: Option<String>,

    #[serde(flatten)]
    pub officers: HighCompOfficers,

    // ========================================================================
    // Row state
    // ========================================================================
    pub is_active: bool,
    pub modified_at: Option<DateTime<Utc>>,

    /// Submitted columns the engine does not interpret, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FabsRecord {
    /// Parsed record type, `None` when absent or out of range
    pub fn record_type(&self) -> Option<RecordType> {
        self.record_type.and_then(RecordType::from_code)
    }

    /// True when the correction/delete indicator marks a deletion
    pub fn is_delete(&self) -> bool {
        present(&self.correction_delete_indicatr)
            .map(|v| v.eq_ignore_ascii_case("D"))
            .unwrap_or(false)
    }

    /// Null every purely derived field
    ///
    /// Submitted fields (codes, ZIPs, names the submitter owns) are left
    /// alone so a second derivation sees the same inputs as the first.
    pub fn clear_derived(&mut self) {
        self.cfda_title = None;
        self.awarding_agency_code = None;
        self.awarding_agency_name = None;
        self.awarding_sub_tier_agency_n = None;
        self.awarding_office_name = None;
        self.funding_agency_code = None;
        self.funding_agency_name = None;
        self.funding_sub_tier_agency_na = None;
        self.funding_office_name = None;
        self.total_funding_amount = None;

        self.place_of_perfor_state_code = None;
        self.place_of_perform_state_nam = None;
        self.place_of_perform_county_co = None;
        self.place_of_perform_county_na = None;
        self.place_of_performance_city = None;
        self.place_of_performance_zip5 = None;
        self.place_of_perform_zip_last4 = None;
        self.place_of_performance_scope = None;
        self.place_of_perform_country_n = None;

        self.legal_entity_country_name = None;
        self.legal_entity_state_name = None;
        self.legal_entity_county_code = None;
        self.legal_entity_county_name = None;

        self.ultimate_parent_legal_enti = None;
        self.ultimate_parent_unique_ide = None;
        self.officers = HighCompOfficers::default();

        self.action_type_description = None;
        self.assistance_type_desc = None;
        self.correction_delete_ind_desc = None;
        self.record_type_description = None;
        self.business_funds_ind_desc = None;
        self.business_types_desc = None;
        self.business_categories = None;

        self.afa_generated_unique = None;
        self.unique_award_key = None;
        self.is_active = false;
        self.modified_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_type_parsing() {
        let mut record = FabsRecord::default();
        assert_eq!(record.record_type(), None);

        record.record_type = Some(3);
        assert_eq!(record.record_type(), Some(RecordType::PiiRedacted));

        record.record_type = Some(9);
        assert_eq!(record.record_type(), None);
    }

    #[test]
    fn test_is_delete_is_case_insensitive() {
        let mut record = FabsRecord::default();
        assert!(!record.is_delete());

        record.correction_delete_indicatr = Some("d".to_string());
        assert!(record.is_delete());

        record.correction_delete_indicatr = Some("C".to_string());
        assert!(!record.is_delete());
    }

    #[test]
    fn test_deserialize_keeps_unknown_columns() {
        let record: FabsRecord = serde_json::from_value(json!({
            "fain": "ABC",
            "record_type": "2",
            "high_comp_officer1_full_na": "Jane",
            "submission_id": 12
        }))
        .unwrap();

        assert_eq!(record.fain.as_deref(), Some("ABC"));
        assert_eq!(record.record_type, Some(2));
        assert_eq!(record.officers.high_comp_officer1_full_na.as_deref(), Some("Jane"));
        assert_eq!(record.extra.get("submission_id"), Some(&json!(12)));
        assert!(!record.extra.contains_key("fain"));
    }

    #[test]
    fn test_serialize_emits_explicit_nulls() {
        let value = serde_json::to_value(FabsRecord::default()).unwrap();
        assert_eq!(value.get("cfda_title"), Some(&Value::Null));
        assert_eq!(value.get("high_comp_officer5_amount"), Some(&Value::Null));
        assert_eq!(value.get("is_active"), Some(&json!(false)));
    }

    #[test]
    fn test_clear_derived_keeps_submitted_fields() {
        let mut record = FabsRecord {
            fain: Some("ABC".to_string()),
            cfda_title: Some("TITLE".to_string()),
            legal_entity_city_code: Some("12345".to_string()),
            is_active: true,
            ..Default::default()
        };
        record.clear_derived();

        assert_eq!(record.fain.as_deref(), Some("ABC"));
        assert_eq!(record.legal_entity_city_code.as_deref(), Some("12345"));
        assert!(record.cfda_title.is_none());
        assert!(!record.is_active);
    }
}

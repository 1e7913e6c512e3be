//! Property tests for the pipeline-wide invariants

mod helpers;

use broker_derive::resolvers::geo::territory_state;
use broker_derive::{AtomType, Derivation, FabsRecord, FpdsRecord};
use helpers::{ctx, fabs_derivation, fpds_derivation, object};
use proptest::prelude::*;
use serde_json::{json, Value};

fn optional(values: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(values).prop_map(str::to_string))
}

fn segment() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[A-Za-z0-9]{1,8}")
}

prop_compose! {
    fn fabs_record()(
        record_type in prop::option::of(1i32..=3),
        delete in optional(&["D", "d", "C", "", " "]),
        country in optional(&["USA", "usa", "PRI", "GUM", "ASM", "CAN", "XKR"]),
        zip5 in optional(&["12345", "20001", "00901", "99999", "1234"]),
        zip_last4 in optional(&["6789", "0001", "12"]),
        state in optional(&["NY", "CA", "VA", "ON"]),
        ppop_code in optional(&["NY**123", "NY*****", "00*****", "00FORGN", "NY50000", "CA1234R", "ZZ99999", "bogus"]),
        ppop_zip in optional(&["12345", "123456789", "12345-6789", "CITY-WIDE", "abc"]),
        fain in segment(),
        uri in segment(),
        sub_tier in optional(&["1234", "5678", "0000"]),
        office in optional(&["ABC123", "CON999", "NOPE"]),
        obligation in prop::option::of(-1.0e6f64..1.0e6),
        business_types in optional(&["A", "MR", "XYZ", "q"]),
        uei in optional(&["UEI000000001", "UNKNOWN"]),
    ) -> FabsRecord {
        FabsRecord {
            record_type,
            correction_delete_indicatr: delete,
            legal_entity_country_code: country,
            legal_entity_zip5: zip5,
            legal_entity_zip_last4: zip_last4,
            legal_entity_state_code: state,
            place_of_performance_code: ppop_code,
            place_of_performance_zip4a: ppop_zip,
            fain,
            uri,
            awarding_sub_tier_agency_c: sub_tier,
            awarding_office_code: office,
            federal_action_obligation: obligation,
            business_types,
            uei,
            ..Default::default()
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_is_active_tracks_delete_indicator(record in fabs_record()) {
        let (derivation, _) = fabs_derivation();
        let deleted = record
            .correction_delete_indicatr
            .as_deref()
            .map(|d| d.trim().eq_ignore_ascii_case("D"))
            .unwrap_or(false);

        let mut derived = record;
        derivation.derive(&mut derived, &ctx());

        prop_assert_eq!(derived.is_active, !deleted);
        prop_assert!(derived.modified_at.is_some());
    }

    #[test]
    fn prop_logging_keys_never_survive(record in fabs_record(), row in 0u32..10_000) {
        let (derivation, _) = fabs_derivation();
        let mut input = match serde_json::to_value(&record).unwrap() {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        input.insert("row_number".into(), json!(row));
        input.insert("job_id".into(), json!("42"));

        let output = derivation.derive_object(input, None).unwrap();
        prop_assert!(output.get("row_number").is_none());
        prop_assert!(output.get("job_id").is_none());
        prop_assert!(output["modified_at"].is_string());
    }

    #[test]
    fn prop_territory_country_is_normalized(record in fabs_record()) {
        let (derivation, _) = fabs_derivation();
        let territory = record
            .legal_entity_country_code
            .as_deref()
            .filter(|c| !c.eq_ignore_ascii_case("USA"))
            .and_then(territory_state);
        prop_assume!(territory.is_some() && !record.is_delete());

        let mut derived = record;
        derivation.derive(&mut derived, &ctx());

        prop_assert_eq!(derived.legal_entity_country_code.as_deref(), Some("USA"));
        prop_assert_eq!(derived.legal_entity_state_code.as_deref(), territory);
    }

    #[test]
    fn prop_nine_digit_ppop_zip_reconstructs(record in fabs_record(), zip in "[0-9]{9}") {
        prop_assume!(!record.is_delete() && record.record_type != Some(3));
        let (derivation, _) = fabs_derivation();
        let mut derived = FabsRecord {
            place_of_performance_zip4a: Some(zip.clone()),
            ..record
        };
        derivation.derive(&mut derived, &ctx());

        let rebuilt = format!(
            "{}{}",
            derived.place_of_performance_zip5.unwrap_or_default(),
            derived.place_of_perform_zip_last4.unwrap_or_default()
        );
        prop_assert_eq!(rebuilt, zip);
    }

    #[test]
    fn prop_fabs_derivation_is_idempotent(record in fabs_record()) {
        let (derivation, _) = fabs_derivation();
        let mut derived = record;
        derivation.derive(&mut derived, &ctx());
        let first = derived.clone();
        derivation.derive(&mut derived, &ctx());
        prop_assert_eq!(derived, first);
    }

    #[test]
    fn prop_fpds_transaction_key_has_six_segments(
        agency_id in segment(),
        idv_agency in segment(),
        piid in segment(),
        modification in segment(),
        parent in segment(),
        transaction in segment(),
        idv in any::<bool>(),
    ) {
        let atom = if idv { AtomType::Idv } else { AtomType::Award };
        let (derivation, _) = fpds_derivation(atom);
        let mut record = FpdsRecord {
            agency_id,
            referenced_idv_agency_iden: idv_agency,
            piid,
            award_modification_amendme: modification,
            parent_award_id: parent,
            transaction_number: transaction,
            ..Default::default()
        };
        derivation.derive(&mut record, &ctx());

        let key = record.detached_award_proc_unique.unwrap();
        prop_assert_eq!(key.matches('_').count(), 5);
        prop_assert!(key.split('_').all(|segment| !segment.is_empty()));
    }
}

#[test]
fn test_scope_for_each_code_pattern() {
    let cases = [
        ("00*****", Some("Multi-state")),
        ("0012345", Some("Multi-state")),
        ("00FORGN", Some("Foreign")),
        ("NY*****", Some("State-wide")),
        ("NY**123", Some("County-wide")),
        ("NY50000", Some("State-wide")),
        ("NY1234R", Some("State-wide")),
        ("not-a-code", None),
    ];

    let (derivation, _) = fabs_derivation();
    for (code, expected) in cases {
        let output = derivation
            .derive_object(
                object(json!({"row_number": 1, "job_id": 1, "place_of_performance_code": code})),
                None,
            )
            .unwrap();
        assert_eq!(
            output["place_of_performance_scope"].as_str(),
            expected,
            "scope for {}",
            code
        );
    }
}

#[test]
fn test_foreign_pii_record_gets_foreign_code() {
    let (derivation, _) = fabs_derivation();
    for country in ["CAN", "MEX", "FRA"] {
        let mut record = FabsRecord {
            record_type: Some(3),
            legal_entity_country_code: Some(country.into()),
            place_of_performance_code: Some("NY*****".into()),
            ..Default::default()
        };
        derivation.derive(&mut record, &ctx());
        assert_eq!(record.place_of_performance_code.as_deref(), Some("00FORGN"));
    }
}

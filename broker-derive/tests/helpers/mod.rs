//! Test Helper Utilities
//!
//! Shared fixture snapshot, derivation constructors and SQLite seeding for
//! the broker-derive integration tests.

#![allow(dead_code)]

use broker_common::FixedClock;
use broker_derive::snapshot::{
    CityRow, CountyRow, ExecCompRow, FrecRow, OfficeRoles, OfficeRow, PublishedAwardRow,
    RecipientRow, StateRow, SubTierRow, ZipRow,
};
use broker_derive::{
    AtomType, CollectingSink, FabsDerivation, FpdsDerivation, RecordContext, ReferenceSnapshot,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Timestamp every fixture clock returns
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn ctx() -> RecordContext {
    RecordContext::new("1", "100")
}

fn state(code: &str, name: &str) -> StateRow {
    StateRow {
        state_code: code.into(),
        state_name: name.into(),
    }
}

fn zip(zip5: &str, zip4: Option<&str>, state: &str, county: &str, cd: &str) -> ZipRow {
    ZipRow {
        zip5: zip5.into(),
        zip_last4: zip4.map(str::to_string),
        state_abbreviation: state.into(),
        county_number: county.into(),
        congressional_district_no: Some(cd.into()),
    }
}

/// Reference snapshot shared by the integration tests
///
/// - ZIP 12345 (and 12345-6789): NY, county 001, district 07, one district
/// - ZIP 20001: VA, county 013, three districts
/// - ZIP 00901: PR, county 127
/// - Sub-tier 1234 under CGAC 012; FREC sub-tier 5678 under FREC 1601
/// - Office ABC123 (assistance awards + funding) owned by sub-tier 1234
/// - Published award FAIN-1 under 1234, first transaction with office ABC123
pub fn fixture_snapshot() -> ReferenceSnapshot {
    ReferenceSnapshot::builder()
        .countries(vec![
            ("USA".into(), "UNITED STATES".into()),
            ("CAN".into(), "CANADA".into()),
            ("PRI".into(), "PUERTO RICO".into()),
        ])
        .states(vec![
            state("NY", "NEW YORK"),
            state("CA", "CALIFORNIA"),
            state("VA", "VIRGINIA"),
            state("PR", "PUERTO RICO"),
        ])
        .counties(vec![
            CountyRow {
                state_code: "NY".into(),
                county_number: "001".into(),
                county_name: "ALBANY".into(),
            },
            CountyRow {
                state_code: "NY".into(),
                county_number: "123".into(),
                county_name: "Kings".into(),
            },
            CountyRow {
                state_code: "VA".into(),
                county_number: "013".into(),
                county_name: "ARLINGTON".into(),
            },
            CountyRow {
                state_code: "PR".into(),
                county_number: "127".into(),
                county_name: "SAN JUAN".into(),
            },
        ])
        .cities(vec![
            CityRow {
                state_code: "CA".into(),
                city_code: "12345".into(),
                feature_name: "SPRINGFIELD".into(),
                county_number: Some("037".into()),
                county_name: Some("LOS ANGELES".into()),
            },
            CityRow {
                state_code: "NY".into(),
                city_code: "50000".into(),
                feature_name: "SCHENECTADY".into(),
                county_number: Some("001".into()),
                county_name: Some("ALBANY".into()),
            },
        ])
        .zip_cities(vec![
            ("12345".into(), "SCHENECTADY".into()),
            ("20001".into(), "ARLINGTON".into()),
        ])
        .zips(vec![
            zip("12345", Some("6789"), "NY", "001", "07"),
            zip("12345", None, "NY", "001", "07"),
            zip("20001", Some("0001"), "VA", "013", "08"),
            zip("20001", Some("0002"), "VA", "013", "09"),
            zip("20001", Some("0003"), "VA", "013", "10"),
            zip("00901", None, "PR", "127", "98"),
        ])
        .cgacs(vec![
            ("012".into(), Some("Department of Agriculture".into())),
            ("097".into(), Some("Department of Defense".into())),
        ])
        .frecs(vec![FrecRow {
            frec_code: "1601".into(),
            agency_name: Some("Department of Labor FREC".into()),
            cgac_code: Some("016".into()),
        }])
        .sub_tiers(vec![
            SubTierRow {
                sub_tier_agency_code: "1234".into(),
                sub_tier_agency_name: Some("Forest Service".into()),
                cgac_code: Some("012".into()),
                frec_code: None,
                is_frec: false,
            },
            SubTierRow {
                sub_tier_agency_code: "5678".into(),
                sub_tier_agency_name: Some("Employment Training".into()),
                cgac_code: Some("016".into()),
                frec_code: Some("1601".into()),
                is_frec: true,
            },
        ])
        .offices(vec![
            OfficeRow {
                office_code: "ABC123".into(),
                office_name: Some("Region 1 Grants".into()),
                sub_tier_code: Some("1234".into()),
                roles: OfficeRoles {
                    assistance_awards: true,
                    assistance_funding: true,
                    ..Default::default()
                },
            },
            OfficeRow {
                office_code: "CON999".into(),
                office_name: Some("Contracts Only".into()),
                sub_tier_code: Some("1234".into()),
                roles: OfficeRoles {
                    contract_awards: true,
                    ..Default::default()
                },
            },
        ])
        .cfda_programs(vec![("10.001".into(), "Agricultural Research".into())])
        .recipients(vec![RecipientRow {
            recipient_id: "UEI000000001".into(),
            ultimate_parent_unique_ide: Some("PARENT000001".into()),
            ultimate_parent_legal_enti: Some("PARENT HOLDINGS".into()),
        }])
        .exec_comp(vec![ExecCompRow {
            recipient_id: "UEI000000001".into(),
            officers: [
                (Some("Ada Lovelace".into()), Some("250000".into())),
                (Some("Grace Hopper".into()), Some("200000".into())),
                (None, None),
                (None, None),
                (None, None),
            ],
        }])
        .published_awards(vec![PublishedAwardRow {
            record_type: Some(2),
            fain: Some("FAIN-1".into()),
            uri: None,
            awarding_sub_tier_agency_c: Some("1234".into()),
            award_modification_amendme: Some("0".into()),
            action_date: Some("2020-01-15".into()),
            awarding_office_code: Some("ABC123".into()),
            funding_office_code: Some("CON999".into()),
        }])
        .build()
        .unwrap()
}

/// FABS derivation over the fixture snapshot with a collecting sink
pub fn fabs_derivation() -> (FabsDerivation, CollectingSink) {
    let sink = CollectingSink::new();
    let derivation = FabsDerivation::new(
        Arc::new(fixture_snapshot()),
        Arc::new(sink.clone()),
        Arc::new(FixedClock(fixed_now())),
    );
    (derivation, sink)
}

/// FPDS derivation over the fixture snapshot with a collecting sink
pub fn fpds_derivation(atom: AtomType) -> (FpdsDerivation, CollectingSink) {
    let sink = CollectingSink::new();
    let derivation = FpdsDerivation::new(
        Arc::new(fixture_snapshot()),
        Arc::new(sink.clone()),
        Arc::new(FixedClock(fixed_now())),
        atom,
    );
    (derivation, sink)
}

/// Unwrap a `json!` object literal
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {}", other),
    }
}

/// In-memory SQLite pool with the reference schema
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    broker_common::db::create_reference_schema(&pool).await.unwrap();
    pool
}

/// Seed a small reference data set into `pool`
pub async fn seed_reference_data(pool: &SqlitePool) {
    let statements = [
        "INSERT INTO country_code VALUES ('USA', 'UNITED STATES'), ('CAN', 'CANADA')",
        "INSERT INTO states VALUES ('NY', 'NEW YORK', '36'), ('PR', 'PUERTO RICO', '72')",
        "INSERT INTO county_code VALUES ('NY', '001', 'ALBANY'), ('NY', '123', 'Kings')",
        "INSERT INTO city_code VALUES ('NY', '50000', 'SCHENECTADY', '001', 'ALBANY')",
        "INSERT INTO zip_city VALUES ('12345', 'SCHENECTADY')",
        "INSERT INTO zips VALUES ('12345', '6789', 'NY', '001', '07'), ('12345', NULL, 'NY', '001', '07')",
        "INSERT INTO cgac VALUES ('012', 'Department of Agriculture')",
        "INSERT INTO frec VALUES ('1601', 'Department of Labor FREC', '016')",
        "INSERT INTO sub_tier_agency VALUES ('1234', 'Forest Service', '012', NULL, 0), \
         ('5678', 'Employment Training', '016', '1601', 1)",
        "INSERT INTO office VALUES ('ABC123', 'Region 1 Grants', '1234', 0, 0, 1, 1)",
        "INSERT INTO cfda_program VALUES ('10.001', 'Agricultural Research')",
        "INSERT INTO recipient VALUES ('UEI000000001', 'PARENT000001', 'PARENT HOLDINGS')",
        "INSERT INTO executive_compensation (recipient_id, high_comp_officer1_full_na, \
         high_comp_officer1_amount) VALUES ('UEI000000001', 'Ada Lovelace', '250000')",
        "INSERT INTO published_fabs (afa_generated_unique, record_type, fain, \
         awarding_sub_tier_agency_c, award_modification_amendme, action_date, \
         awarding_office_code, funding_office_code, is_active) \
         VALUES ('A', 2, 'FAIN-1', '1234', '0', '2020-01-15', 'ABC123', NULL, 1)",
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await.unwrap();
    }
}

//! Reference snapshot loading
//!
//! Reads every reference table into a [`SnapshotBuilder`]. A required table
//! that does not exist is fatal ([`DeriveError::Snapshot`]); an empty one
//! is not.

use super::published::load_award_donors;
use crate::error::DeriveError;
use crate::snapshot::{
    CityRow, CountyRow, ExecCompRow, FrecRow, OfficeRoles, OfficeRow, RecipientRow,
    ReferenceSnapshot, SnapshotBuilder, StateRow, SubTierRow, ZipRow, REQUIRED_TABLES,
};
use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::time::Instant;
use tracing::{info, warn};

/// True when `table` exists in the connected database
pub async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(pool)
            .await
            .with_context(|| format!("Failed to check for table {}", table))?;
    Ok(count > 0)
}

async fn fetch(pool: &SqlitePool, sql: &str) -> Result<Vec<SqliteRow>> {
    sqlx::query(sql)
        .fetch_all(pool)
        .await
        .with_context(|| format!("Reference query failed: {}", sql))
}

fn flag(row: &SqliteRow, column: &str) -> bool {
    row.get::<Option<i64>, _>(column).unwrap_or(0) != 0
}

/// Load every reference table and build the snapshot
///
/// # Errors
/// [`DeriveError::Snapshot`] (inside the `anyhow` chain) when a required
/// table does not exist; database errors otherwise.
pub async fn load_snapshot(pool: &SqlitePool) -> Result<ReferenceSnapshot> {
    let started = Instant::now();

    for table in REQUIRED_TABLES {
        if !table_exists(pool, table).await? {
            return Err(DeriveError::Snapshot((*table).to_string()).into());
        }
    }

    let mut builder = ReferenceSnapshot::builder();
    builder = load_geography(pool, builder).await?;
    builder = load_agencies(pool, builder).await?;
    builder = load_recipients(pool, builder).await?;

    if table_exists(pool, "published_fabs").await? {
        builder = builder.published_awards(load_award_donors(pool).await?);
    } else {
        warn!("published_fabs table not found; office back-fill disabled");
    }

    let snapshot = builder.build()?;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Reference snapshot loaded"
    );
    Ok(snapshot)
}

async fn load_geography(pool: &SqlitePool, builder: SnapshotBuilder) -> Result<SnapshotBuilder> {
    let countries = fetch(pool, "SELECT country_code, country_name FROM country_code")
        .await?
        .iter()
        .map(|r| (r.get("country_code"), r.get("country_name")))
        .collect::<Vec<(String, String)>>();

    let states = fetch(pool, "SELECT state_code, state_name FROM states")
        .await?
        .iter()
        .map(|r| StateRow {
            state_code: r.get("state_code"),
            state_name: r.get("state_name"),
        })
        .collect::<Vec<_>>();

    let counties = fetch(pool, "SELECT state_code, county_number, county_name FROM county_code")
        .await?
        .iter()
        .map(|r| CountyRow {
            state_code: r.get("state_code"),
            county_number: r.get("county_number"),
            county_name: r.get("county_name"),
        })
        .collect::<Vec<_>>();

    // rowid order keeps "first city code wins" stable across loads
    let cities = fetch(
        pool,
        "SELECT state_code, city_code, feature_name, county_number, county_name \
         FROM city_code ORDER BY rowid",
    )
    .await?
    .iter()
    .map(|r| CityRow {
        state_code: r.get("state_code"),
        city_code: r.get("city_code"),
        feature_name: r.get("feature_name"),
        county_number: r.get("county_number"),
        county_name: r.get("county_name"),
    })
    .collect::<Vec<_>>();

    let zip_cities = fetch(pool, "SELECT zip_code, city_name FROM zip_city")
        .await?
        .iter()
        .map(|r| (r.get("zip_code"), r.get("city_name")))
        .collect::<Vec<(String, String)>>();

    let zips = fetch(
        pool,
        "SELECT zip5, zip_last4, state_abbreviation, county_number, congressional_district_no FROM zips",
    )
    .await?
    .iter()
    .map(|r| ZipRow {
        zip5: r.get("zip5"),
        zip_last4: r.get("zip_last4"),
        state_abbreviation: r.get("state_abbreviation"),
        county_number: r.get("county_number"),
        congressional_district_no: r.get("congressional_district_no"),
    })
    .collect::<Vec<_>>();

    info!(
        countries = countries.len(),
        states = states.len(),
        counties = counties.len(),
        cities = cities.len(),
        zips = zips.len(),
        "Loaded geography tables"
    );

    Ok(builder
        .countries(countries)
        .states(states)
        .counties(counties)
        .cities(cities)
        .zip_cities(zip_cities)
        .zips(zips))
}

async fn load_agencies(pool: &SqlitePool, builder: SnapshotBuilder) -> Result<SnapshotBuilder> {
    let cgacs = fetch(pool, "SELECT cgac_code, agency_name FROM cgac")
        .await?
        .iter()
        .map(|r| (r.get("cgac_code"), r.get("agency_name")))
        .collect::<Vec<(String, Option<String>)>>();

    let frecs = fetch(pool, "SELECT frec_code, agency_name, cgac_code FROM frec")
        .await?
        .iter()
        .map(|r| FrecRow {
            frec_code: r.get("frec_code"),
            agency_name: r.get("agency_name"),
            cgac_code: r.get("cgac_code"),
        })
        .collect::<Vec<_>>();

    let sub_tiers = fetch(
        pool,
        "SELECT sub_tier_agency_code, sub_tier_agency_name, cgac_code, frec_code, is_frec \
         FROM sub_tier_agency",
    )
    .await?
    .iter()
    .map(|r| SubTierRow {
        sub_tier_agency_code: r.get("sub_tier_agency_code"),
        sub_tier_agency_name: r.get("sub_tier_agency_name"),
        cgac_code: r.get("cgac_code"),
        frec_code: r.get("frec_code"),
        is_frec: flag(r, "is_frec"),
    })
    .collect::<Vec<_>>();

    let offices = fetch(
        pool,
        "SELECT office_code, office_name, sub_tier_code, contract_awards_office, \
         contract_funding_office, financial_assistance_awards_office, \
         financial_assistance_funding_office FROM office",
    )
    .await?
    .iter()
    .map(|r| OfficeRow {
        office_code: r.get("office_code"),
        office_name: r.get("office_name"),
        sub_tier_code: r.get("sub_tier_code"),
        roles: OfficeRoles {
            contract_awards: flag(r, "contract_awards_office"),
            contract_funding: flag(r, "contract_funding_office"),
            assistance_awards: flag(r, "financial_assistance_awards_office"),
            assistance_funding: flag(r, "financial_assistance_funding_office"),
        },
    })
    .collect::<Vec<_>>();

    let cfda_programs = fetch(pool, "SELECT program_number, program_title FROM cfda_program")
        .await?
        .iter()
        .map(|r| (r.get("program_number"), r.get("program_title")))
        .collect::<Vec<(String, String)>>();

    info!(
        sub_tiers = sub_tiers.len(),
        offices = offices.len(),
        cfda_programs = cfda_programs.len(),
        "Loaded agency tables"
    );

    Ok(builder
        .cgacs(cgacs)
        .frecs(frecs)
        .sub_tiers(sub_tiers)
        .offices(offices)
        .cfda_programs(cfda_programs))
}

async fn load_recipients(pool: &SqlitePool, builder: SnapshotBuilder) -> Result<SnapshotBuilder> {
    let recipients = fetch(
        pool,
        "SELECT recipient_id, ultimate_parent_unique_ide, ultimate_parent_legal_enti FROM recipient",
    )
    .await?
    .iter()
    .map(|r| RecipientRow {
        recipient_id: r.get("recipient_id"),
        ultimate_parent_unique_ide: r.get("ultimate_parent_unique_ide"),
        ultimate_parent_legal_enti: r.get("ultimate_parent_legal_enti"),
    })
    .collect::<Vec<_>>();

    let exec_comp = fetch(pool, "SELECT * FROM executive_compensation")
        .await?
        .iter()
        .map(|r| {
            let slot = |n: usize| -> (Option<String>, Option<String>) {
                (
                    r.get(format!("high_comp_officer{}_full_na", n).as_str()),
                    r.get(format!("high_comp_officer{}_amount", n).as_str()),
                )
            };
            ExecCompRow {
                recipient_id: r.get("recipient_id"),
                officers: [slot(1), slot(2), slot(3), slot(4), slot(5)],
            }
        })
        .collect::<Vec<_>>();

    info!(
        recipients = recipients.len(),
        exec_comp = exec_comp.len(),
        "Loaded recipient tables"
    );

    Ok(builder.recipients(recipients).exec_comp(exec_comp))
}

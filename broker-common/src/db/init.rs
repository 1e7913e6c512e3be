//! Database initialization
//!
//! Creates the reference-data schema consumed by snapshot loading. All
//! statements are `CREATE TABLE IF NOT EXISTS`, so initialization is safe to
//! repeat against an existing store.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Names of every reference table, in creation order
pub const REFERENCE_TABLES: &[&str] = &[
    "country_code",
    "states",
    "county_code",
    "city_code",
    "zip_city",
    "zips",
    "cgac",
    "frec",
    "sub_tier_agency",
    "office",
    "cfda_program",
    "recipient",
    "executive_compensation",
    "published_fabs",
];

/// Open (creating if needed) the reference database and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows snapshot reads while a refresh job writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_reference_schema(&pool).await?;

    Ok(pool)
}

/// Create every reference table on an already-open pool
pub async fn create_reference_schema(pool: &SqlitePool) -> Result<()> {
    // Geography
    create_country_code_table(pool).await?;
    create_states_table(pool).await?;
    create_county_code_table(pool).await?;
    create_city_code_table(pool).await?;
    create_zip_city_table(pool).await?;
    create_zips_table(pool).await?;

    // Agencies and programs
    create_cgac_table(pool).await?;
    create_frec_table(pool).await?;
    create_sub_tier_agency_table(pool).await?;
    create_office_table(pool).await?;
    create_cfda_program_table(pool).await?;

    // Recipients
    create_recipient_table(pool).await?;
    create_executive_compensation_table(pool).await?;

    // Previously published assistance awards (office back-fill donors)
    create_published_fabs_table(pool).await?;

    info!("Reference schema ready ({} tables)", REFERENCE_TABLES.len());
    Ok(())
}

async fn create_country_code_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS country_code (
            country_code TEXT PRIMARY KEY,
            country_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_states_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS states (
            state_code TEXT PRIMARY KEY,
            state_name TEXT NOT NULL,
            fips_code TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_county_code_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS county_code (
            state_code TEXT NOT NULL,
            county_number TEXT NOT NULL,
            county_name TEXT NOT NULL,
            PRIMARY KEY (state_code, county_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_city_code_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS city_code (
            state_code TEXT NOT NULL,
            city_code TEXT NOT NULL,
            feature_name TEXT NOT NULL,
            county_number TEXT,
            county_name TEXT,
            PRIMARY KEY (state_code, city_code)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_zip_city_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS zip_city (
            zip_code TEXT PRIMARY KEY,
            city_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_zips_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS zips (
            zip5 TEXT NOT NULL,
            zip_last4 TEXT,
            state_abbreviation TEXT NOT NULL,
            county_number TEXT NOT NULL,
            congressional_district_no TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_zips_zip5 ON zips(zip5)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_cgac_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cgac (
            cgac_code TEXT PRIMARY KEY,
            agency_name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_frec_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS frec (
            frec_code TEXT PRIMARY KEY,
            agency_name TEXT NOT NULL,
            cgac_code TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sub_tier_agency_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sub_tier_agency (
            sub_tier_agency_code TEXT PRIMARY KEY,
            sub_tier_agency_name TEXT NOT NULL,
            cgac_code TEXT,
            frec_code TEXT,
            is_frec INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_office_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS office (
            office_code TEXT PRIMARY KEY,
            office_name TEXT NOT NULL,
            sub_tier_code TEXT,
            contract_awards_office INTEGER NOT NULL DEFAULT 0,
            contract_funding_office INTEGER NOT NULL DEFAULT 0,
            financial_assistance_awards_office INTEGER NOT NULL DEFAULT 0,
            financial_assistance_funding_office INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_cfda_program_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cfda_program (
            program_number TEXT PRIMARY KEY,
            program_title TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_recipient_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recipient (
            recipient_id TEXT PRIMARY KEY,
            ultimate_parent_unique_ide TEXT,
            ultimate_parent_legal_enti TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_executive_compensation_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS executive_compensation (
            recipient_id TEXT PRIMARY KEY,
            high_comp_officer1_full_na TEXT,
            high_comp_officer1_amount TEXT,
            high_comp_officer2_full_na TEXT,
            high_comp_officer2_amount TEXT,
            high_comp_officer3_full_na TEXT,
            high_comp_officer3_amount TEXT,
            high_comp_officer4_full_na TEXT,
            high_comp_officer4_amount TEXT,
            high_comp_officer5_full_na TEXT,
            high_comp_officer5_amount TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_published_fabs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS published_fabs (
            published_fabs_id INTEGER PRIMARY KEY AUTOINCREMENT,
            afa_generated_unique TEXT NOT NULL,
            record_type INTEGER NOT NULL,
            fain TEXT,
            uri TEXT,
            awarding_sub_tier_agency_c TEXT,
            award_modification_amendme TEXT,
            action_date TEXT NOT NULL,
            awarding_office_code TEXT,
            funding_office_code TEXT,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

//! Previously published assistance transactions
//!
//! Office back-fill needs the earliest active transaction of each award.
//! Rows come back oldest first; the snapshot builder keeps the first
//! per award.

use crate::snapshot::PublishedAwardRow;
use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Load active published rows, oldest action date first
pub async fn load_award_donors(pool: &SqlitePool) -> Result<Vec<PublishedAwardRow>> {
    let rows = sqlx::query(
        r#"
        SELECT record_type, fain, uri, awarding_sub_tier_agency_c,
               award_modification_amendme, action_date,
               awarding_office_code, funding_office_code
        FROM published_fabs
        WHERE is_active = 1
        ORDER BY action_date, published_fabs_id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to load published assistance awards")?;

    let awards: Vec<PublishedAwardRow> = rows
        .iter()
        .map(|r| PublishedAwardRow {
            record_type: r.get::<Option<i64>, _>("record_type").map(|t| t as i32),
            fain: r.get("fain"),
            uri: r.get("uri"),
            awarding_sub_tier_agency_c: r.get("awarding_sub_tier_agency_c"),
            award_modification_amendme: r.get("award_modification_amendme"),
            action_date: r.get("action_date"),
            awarding_office_code: r.get("awarding_office_code"),
            funding_office_code: r.get("funding_office_code"),
        })
        .collect();

    debug!(count = awards.len(), "Loaded published award rows");
    Ok(awards)
}

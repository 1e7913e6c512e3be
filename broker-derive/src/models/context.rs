//! Logging identifiers for a single derivation call
//!
//! Hosts receive each record with two transient keys (a record id and a job
//! id). They are captured and stripped before the record is deserialized so
//! the enriched output can never carry them.

use crate::error::DeriveError;
use serde_json::{Map, Value};

/// Key carrying the job identifier in incoming objects
pub const JOB_ID_KEY: &str = "job_id";

/// Record and job identifiers attached to every emitted event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordContext {
    pub record_id: String,
    pub job_id: String,
}

impl RecordContext {
    pub fn new(record_id: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            job_id: job_id.into(),
        }
    }

    /// Remove the logging keys from `object` and return them as a context
    ///
    /// `record_id_key` names the record identifier column (`row_number` for
    /// assistance files, `detached_award_procurement_id` for procurement).
    /// `default_job_id` is used when the object carries no `job_id`.
    pub fn take_from(
        object: &mut Map<String, Value>,
        record_id_key: &str,
        default_job_id: Option<&str>,
    ) -> Result<Self, DeriveError> {
        let record_id = object
            .remove(record_id_key)
            .and_then(scalar_to_string)
            .ok_or_else(|| {
                DeriveError::Record(format!("missing record identifier '{}'", record_id_key))
            })?;

        let job_id = object
            .remove(JOB_ID_KEY)
            .and_then(scalar_to_string)
            .or_else(|| default_job_id.map(str::to_string))
            .ok_or_else(|| DeriveError::Record(format!("missing '{}'", JOB_ID_KEY)))?;

        Ok(Self { record_id, job_id })
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//! Per-record derivation pipelines
//!
//! # Architecture
//! - [`FabsDerivation`]: the ordered assistance pipeline (agency → place of
//!   performance → recipient location → office back-fill → ... → keys)
//! - [`FpdsDerivation`]: the procurement pipeline for one feed (award or IDV)
//! - [`batch`]: runs either pipeline over many records on the blocking pool
//!
//! A derivation never performs I/O and never fails on data: lookups that
//! miss leave nulls and report to the [`DerivationSink`](crate::sink::DerivationSink).

pub mod batch;
pub mod fabs;
pub mod fpds;

pub use batch::{derive_batch, BatchItem};
pub use fabs::FabsDerivation;
pub use fpds::FpdsDerivation;

use crate::error::DeriveResult;
use crate::models::RecordContext;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// One derivation pipeline over a record type
///
/// Implementations hold the shared snapshot, sink and clock; `derive` only
/// touches the record it is given.
pub trait Derivation: Send + Sync {
    type Record: Serialize + DeserializeOwned + Send + 'static;

    /// Pipeline name for logging
    fn name(&self) -> &'static str;

    /// Column carrying the record identifier in incoming objects
    fn record_id_key(&self) -> &'static str;

    /// Enrich `record` in place
    fn derive(&self, record: &mut Self::Record, ctx: &RecordContext);

    /// Split an incoming JSON object into a typed record and its logging context
    fn prepare(
        &self,
        mut object: Map<String, Value>,
        default_job_id: Option<&str>,
    ) -> DeriveResult<(Self::Record, RecordContext)> {
        let ctx = RecordContext::take_from(&mut object, self.record_id_key(), default_job_id)?;
        let record = serde_json::from_value(Value::Object(object))?;
        Ok((record, ctx))
    }

    /// Derive a JSON object end to end; the result carries no logging keys
    fn derive_object(
        &self,
        object: Map<String, Value>,
        default_job_id: Option<&str>,
    ) -> DeriveResult<Value> {
        let (mut record, ctx) = self.prepare(object, default_job_id)?;
        self.derive(&mut record, &ctx);
        Ok(serde_json::to_value(record)?)
    }
}

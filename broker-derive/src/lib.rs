//! broker-derive library interface
//!
//! Award derivation and reference resolution for assistance (FABS) and
//! procurement (FPDS) transactions.
//!
//! # Layout
//! - [`snapshot`]: immutable in-memory reference tables
//! - [`resolvers`]: one resolver per group of derived fields
//! - [`workflow`]: the ordered per-record pipelines and the batch driver
//! - [`db`]: SQLite loaders that build a snapshot
//! - [`sink`]: where soft-miss events go

pub mod db;
pub mod error;
pub mod models;
pub mod resolvers;
pub mod sink;
pub mod snapshot;
pub mod workflow;

pub use crate::error::{DeriveError, DeriveResult};
pub use crate::models::{AtomType, FabsRecord, FpdsRecord, RecordContext, RecordType};
pub use crate::sink::{CollectingSink, DerivationEvent, DerivationSink, EventLevel, TracingSink};
pub use crate::snapshot::{ReferenceSnapshot, SnapshotBuilder};
pub use crate::workflow::{derive_batch, BatchItem, Derivation, FabsDerivation, FpdsDerivation};

//! Record models for the derivation engine
//!
//! - `FabsRecord`: one financial-assistance transaction (raw on entry, enriched on exit)
//! - `FpdsRecord`: one procurement transaction
//! - `RecordContext`: the logging identifiers carried beside a record, never on it

pub mod context;
pub mod fabs;
pub mod fields;
pub mod fpds;
pub mod officers;

pub use context::RecordContext;
pub use fabs::{FabsRecord, RecordType};
pub use fpds::{AtomType, FpdsBusinessFlags, FpdsRecord};
pub use officers::HighCompOfficers;

//! Reference resolvers
//!
//! Each resolver reads the shared [`ReferenceSnapshot`](crate::snapshot::ReferenceSnapshot)
//! and writes a fixed group of derived fields. Misses null the field; none
//! of them fail.

pub mod agency;
pub mod business_categories;
pub mod cfda;
pub mod geo;
pub mod labels;
pub mod legal_entity;
pub mod office;
pub mod pii;
pub mod ppop;
pub mod recipient;
pub mod unique_keys;

//! # Broker Common Library
//!
//! Shared code for the award derivation services including:
//! - Error type shared by loaders and hosts
//! - Configuration loading (CLI → ENV → TOML → default)
//! - Clock capability for deterministic timestamps
//! - Reference-table schema for the SQLite store

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
pub use time::{Clock, FixedClock, SystemClock};

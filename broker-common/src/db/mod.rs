//! Reference-data storage

pub mod init;

pub use init::*;

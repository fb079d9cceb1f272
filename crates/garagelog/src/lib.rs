//! `garagelog` - local vehicle logbook with portable ZIP backups
//!
//! This library provides the data layer of the logbook: a durable record
//! store for trips, expense notes, maintenance entries, and vehicle
//! configuration, plus a backup codec that round-trips the whole store
//! through a ZIP archive.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod records;
pub mod store;

pub use backup::{export_all, import_from, BackupDocument, RemoteTarget};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use records::{ConfigRecord, Entry, LogKind, Snapshot};
pub use store::Store;

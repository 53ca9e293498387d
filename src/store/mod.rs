//! Store Module - ephemeral run data
//!
//! Key types:
//! - `DataStore`: thread-safe key → JSON value store with export/import
//! - `RecordKind` / `GenerateOptions`: synthetic record generation
//! - `Schema` / `Violation`: structural validation that reports, never raises

mod datastore;
pub mod generate;
pub mod schema;

pub use datastore::{DataExport, DataStore, StoreSummary};
pub use generate::{GenerateOptions, RecordKind};
pub use schema::{validate, validate_credentials, FieldType, Schema, Violation, ViolationKind};

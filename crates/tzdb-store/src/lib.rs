//! TZDB database files.
//!
//! Loads `tzdb.dat` containers, serves zone rules through a lazily decoded
//! cache, and writes new containers.
//!
//! # Key Types
//!
//! - [`TimeZoneDatabase`] -- a loaded database; rules decode on first lookup
//! - [`ZoneRulesProvider`] -- the lookup trait diffing is written against
//! - [`TzdbWriter`] -- builds containers with pooled region ids and blobs
//! - [`StoreConfig`] -- where to find the data file inside a directory
//!
//! # Design Rules
//!
//! 1. The zone id list and version id are fixed once a file is loaded.
//! 2. A corrupt rule blob fails only lookups of the zones linked to it.
//! 3. A decoded rule set is cached and returned as the same `Arc` afterwards.
//! 4. Lookups are safe from any number of threads.

pub mod config;
pub mod database;
pub mod error;
pub mod loader;
pub mod traits;
pub mod writer;

pub use config::{StoreConfig, DEFAULT_DATA_FILE};
pub use database::{RuleSlot, TimeZoneDatabase};
pub use error::{StoreError, StoreResult};
pub use loader::{resolve_data_file, FORMAT_VERSION, GROUP_ID};
pub use traits::ZoneRulesProvider;
pub use writer::TzdbWriter;

//! Episode datasets recorded by training runs
//!
//! Parsing (JSON and binary DAT), DAT -> JSON conversion, loading and the
//! process-lifetime dataset cache.

pub mod cache;
pub mod convert;
pub mod dat;
pub mod json;
pub mod loader;
pub mod record;

pub use cache::DatasetCache;
pub use convert::{ConversionReport, convert_dat_to_json, sync_directory};
pub use dat::{encode_dat, parse_dat, read_dat, write_dat};
pub use json::{parse_json, read_json, write_json};
pub use loader::{DatasetLoader, FileDatasetLoader};
pub use record::{Dataset, EpisodeRecord, Position};

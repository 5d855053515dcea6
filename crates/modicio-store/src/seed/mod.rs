//! Seed import system
//!
//! Provides:
//! - Seed Format v0 schema
//! - YAML parser with validation
//! - Importer building the initial Fragment

pub mod format_v0;
pub mod importer;
pub mod parser;

pub use format_v0::SeedV0;
pub use importer::{build_fragment, import_seed_file, import_seed_str};
pub use parser::{parse_seed_file, parse_seed_str};

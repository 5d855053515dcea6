//! modicio store - the Fragment/Versioning Store boundary
//!
//! Provides:
//! - The `FragmentStore` trait and its fetch/persist/reference contract
//! - An in-memory store and a SQLite store
//! - SQLite schema with an embedded migrations framework
//! - YAML seed import of an initial model

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod seed;

pub use errors::Result;
pub use repo::{FragmentQuery, FragmentStore, InMemoryFragmentStore, InstanceQuery, SqliteFragmentStore};

//! Fragment stores
//!
//! The `FragmentStore` trait is the boundary between the pure kernel and
//! durable snapshots. Two implementations ship: an in-memory store for tests
//! and embedding, and a SQLite store.

pub mod fragment_store;
pub mod memory;
pub mod sqlite;

pub use fragment_store::{FragmentQuery, FragmentStore, InstanceQuery};
pub use memory::InMemoryFragmentStore;
pub use sqlite::SqliteFragmentStore;

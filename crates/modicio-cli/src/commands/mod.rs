//! Subcommands
//!
//! Each command module exposes `Args` parsed by clap and an `execute`
//! function running against an open store. Every invocation is one request
//! with its own `RequestContext`.

pub mod evolve;
pub mod instance;
pub mod reference;
pub mod script;
pub mod seed;
pub mod variant;

use modicio_core::Fragment;
use modicio_store::SqliteFragmentStore;
use std::path::Path;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the store at `path`, creating it and its directories on first use
pub fn open_store(path: &Path) -> Result<SqliteFragmentStore, Box<dyn std::error::Error>> {
    Ok(SqliteFragmentStore::open(path)?)
}

/// Print the coordinates of a stored Fragment, one `key: value` per line
pub fn print_coordinates(fragment: &Fragment) {
    if let Some(data_id) = fragment.data_id {
        println!("data_id: {}", data_id);
    }
    println!("global_id: {}", fragment.global_id);
    println!("variant_id: {}", fragment.variant_id);
    if let Some(name) = &fragment.variant_name {
        println!("variant_name: {}", name);
    }
    println!("running_id: {}", fragment.running_id);
    if let Some(predecessor) = &fragment.predecessor_id {
        println!("predecessor_id: {}", predecessor);
    }
}

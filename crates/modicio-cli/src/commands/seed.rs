//! Seed import command
//!
//! Usage: modicio seed import --file <YAML> [--reference]

use clap::{Args, Subcommand};
use modicio_core_types::RequestContext;
use modicio_engine::MetadataService;
use modicio_store::{FragmentStore, SqliteFragmentStore};
use std::path::PathBuf;

use super::{print_coordinates, CommandResult};

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Import a seed file as a new variant
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to the seed YAML file
    #[arg(long)]
    pub file: PathBuf,

    /// Make the imported model the reference
    #[arg(long)]
    pub reference: bool,
}

/// Execute seed command
pub fn execute(args: SeedArgs, store: &SqliteFragmentStore) -> CommandResult {
    match args.command {
        SeedCommand::Import(import_args) => execute_import(import_args, store),
    }
}

fn execute_import(args: ImportArgs, store: &SqliteFragmentStore) -> CommandResult {
    let fragment = modicio_store::seed::import_seed_file(&args.file)?;
    let stored = store.persist(fragment)?;

    let stored = if args.reference {
        MetadataService::new(store).set_reference_fragment(
            &RequestContext::new(),
            &stored.variant_id,
            &stored.running_id,
        )?
    } else {
        stored
    };

    print_coordinates(&stored);
    println!("nodes: {}", stored.model.len());
    if stored.is_reference {
        println!("reference: true");
    }
    Ok(())
}

//! Evolve command
//!
//! Usage: modicio evolve --variant <ID> --running <ID> --request <TEXT> [--backward]

use clap::Args;
use modicio_core_types::RequestContext;
use modicio_engine::EvolutionService;
use modicio_store::SqliteFragmentStore;

use super::{print_coordinates, CommandResult};

#[derive(Debug, Args)]
pub struct EvolveArgs {
    #[arg(long)]
    pub variant: String,

    #[arg(long)]
    pub running: String,

    /// Comma-separated statements, `forward/backward` pairs allowed
    #[arg(long)]
    pub request: String,

    /// Apply the backward halves in reverse order
    #[arg(long)]
    pub backward: bool,
}

/// Execute evolve command
pub fn execute(args: EvolveArgs, store: &SqliteFragmentStore) -> CommandResult {
    let evolved = EvolutionService::new(store).evolve_fragment(
        &RequestContext::new(),
        &args.variant,
        &args.running,
        &args.request,
        args.backward,
    )?;
    print_coordinates(&evolved);
    println!("nodes: {}", evolved.model.len());
    Ok(())
}

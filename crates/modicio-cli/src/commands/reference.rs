//! Reference model commands
//!
//! Usage:
//!   modicio reference set --variant <ID> --running <ID>
//!   modicio reference show

use clap::{Args, Subcommand};
use modicio_core_types::RequestContext;
use modicio_engine::{MetadataService, ModelService};
use modicio_store::SqliteFragmentStore;

use super::{print_coordinates, CommandResult};

#[derive(Debug, Args)]
pub struct ReferenceArgs {
    #[command(subcommand)]
    pub command: ReferenceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReferenceCommand {
    /// Make a closed model version the reference
    Set(SetArgs),
    /// Print the current reference
    Show,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[arg(long)]
    pub variant: String,

    #[arg(long)]
    pub running: String,
}

/// Execute reference command
pub fn execute(args: ReferenceArgs, store: &SqliteFragmentStore) -> CommandResult {
    let ctx = RequestContext::new();
    let reference = match args.command {
        ReferenceCommand::Set(set_args) => MetadataService::new(store).set_reference_fragment(
            &ctx,
            &set_args.variant,
            &set_args.running,
        )?,
        ReferenceCommand::Show => ModelService::new(store).reference_fragment(&ctx)?,
    };
    print_coordinates(&reference);
    Ok(())
}

//! Variant commands
//!
//! Usage:
//!   modicio variant new [--from <VARIANT_ID>] [--name <NAME>]
//!   modicio variant list [--limit <N>] [--include-open]
//!   modicio variant versions --variant <VARIANT_ID> [--limit <N>]

use clap::{Args, Subcommand};
use modicio_core_types::RequestContext;
use modicio_engine::{MetaData, MetadataService, ModelService};
use modicio_store::SqliteFragmentStore;

use super::{print_coordinates, CommandResult};

#[derive(Debug, Args)]
pub struct VariantArgs {
    #[command(subcommand)]
    pub command: VariantCommand,
}

#[derive(Debug, Subcommand)]
pub enum VariantCommand {
    /// Open a new variant, empty or branched off another
    New(NewArgs),
    /// List variants, newest first
    List(ListArgs),
    /// List the running versions of one variant, newest first
    Versions(VersionsArgs),
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Variant to branch off
    #[arg(long)]
    pub from: Option<String>,

    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Include variants whose latest version is still open
    #[arg(long)]
    pub include_open: bool,
}

#[derive(Debug, Args)]
pub struct VersionsArgs {
    #[arg(long)]
    pub variant: String,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// Execute variant command
pub fn execute(args: VariantArgs, store: &SqliteFragmentStore) -> CommandResult {
    let ctx = RequestContext::new();
    match args.command {
        VariantCommand::New(new_args) => {
            let fragment = ModelService::new(store).new_variant(
                &ctx,
                new_args.from.as_deref(),
                new_args.name.as_deref(),
            )?;
            print_coordinates(&fragment);
        }
        VariantCommand::List(list_args) => {
            let variants = MetadataService::new(store).all_variants_metadata(
                &ctx,
                list_args.limit,
                !list_args.include_open,
            )?;
            print_metadata(&variants);
        }
        VariantCommand::Versions(versions_args) => {
            let versions = MetadataService::new(store).running_versions_of_variant(
                &ctx,
                &versions_args.variant,
                versions_args.limit,
                false,
            )?;
            print_metadata(&versions);
        }
    }
    Ok(())
}

fn print_metadata(entries: &[MetaData]) {
    for entry in entries {
        println!(
            "{}\t{}\t{}",
            entry.id,
            entry.timestamp.to_rfc3339(),
            entry.name.as_deref().unwrap_or("-")
        );
    }
}

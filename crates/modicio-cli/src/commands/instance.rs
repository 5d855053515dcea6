//! Instance commands
//!
//! Usage:
//!   modicio instance create --node <URI> --name <NAME> --uri <URI>
//!   modicio instance show --id <DATA_ID>
//!   modicio instance set --id <DATA_ID> --value <KEY=VALUE>...
//!   modicio instance find [--type <PATTERN>] [--limit <N>]

use clap::{Args, Subcommand};
use modicio_core_types::RequestContext;
use modicio_engine::InstanceService;
use modicio_store::{InstanceQuery, SqliteFragmentStore};

use super::{print_coordinates, CommandResult};

#[derive(Debug, Args)]
pub struct InstanceArgs {
    #[command(subcommand)]
    pub command: InstanceCommand,
}

#[derive(Debug, Subcommand)]
pub enum InstanceCommand {
    /// Instantiate a node of the reference model
    Create(CreateArgs),
    /// Print an instance as JSON
    Show(ShowArgs),
    /// Set attribute values
    Set(SetArgs),
    /// Find instances by root type
    Find(FindArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Uri of the node to instantiate
    #[arg(long)]
    pub node: String,

    #[arg(long)]
    pub name: String,

    /// Uri of the new instance
    #[arg(long)]
    pub uri: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[arg(long)]
    pub id: i64,

    /// `Attribute=value`, by attribute name or uri
    #[arg(long = "value", value_parser = parse_assignment, required = true)]
    pub values: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct FindArgs {
    /// Case-insensitive substring of the root node uri
    #[arg(long = "type")]
    pub type_pattern: Option<String>,

    #[arg(long, default_value_t = 100)]
    pub limit: usize,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

/// Execute instance command
pub fn execute(args: InstanceArgs, store: &SqliteFragmentStore) -> CommandResult {
    let ctx = RequestContext::new();
    let service = InstanceService::new(store);
    match args.command {
        InstanceCommand::Create(create_args) => {
            let fragment = service.create_instance(
                &ctx,
                &create_args.node,
                &create_args.name,
                &create_args.uri,
            )?;
            print_coordinates(&fragment);
        }
        InstanceCommand::Show(show_args) => {
            let fragment = service.get_instance(&ctx, show_args.id)?;
            println!("{}", serde_json::to_string_pretty(&fragment.instance)?);
        }
        InstanceCommand::Set(set_args) => {
            let fragment = service.set_attributes(&ctx, set_args.id, &set_args.values)?;
            print_coordinates(&fragment);
        }
        InstanceCommand::Find(find_args) => {
            let query = InstanceQuery {
                type_pattern: find_args.type_pattern,
                limit: find_args.limit,
                ..InstanceQuery::default()
            };
            for fragment in service.find_instances(&ctx, &query)? {
                if let (Some(data_id), Some(instance)) = (fragment.data_id, &fragment.instance) {
                    println!("{}\t{}\t{}", data_id, instance.uri, instance.model_root);
                }
            }
        }
    }
    Ok(())
}

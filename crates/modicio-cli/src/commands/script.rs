//! Script command
//!
//! Usage: modicio script run --id <DATA_ID> --name <SCRIPT>

use clap::{Args, Subcommand};
use modicio_core::functions::ScriptOutcome;
use modicio_core_types::RequestContext;
use modicio_engine::BehaviourService;
use modicio_store::SqliteFragmentStore;

use super::CommandResult;

#[derive(Debug, Args)]
pub struct ScriptArgs {
    #[command(subcommand)]
    pub command: ScriptCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScriptCommand {
    /// Run a script declared on the instance's type
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long)]
    pub id: i64,

    #[arg(long)]
    pub name: String,
}

/// Execute script command
pub fn execute(args: ScriptArgs, store: &SqliteFragmentStore) -> CommandResult {
    match args.command {
        ScriptCommand::Run(run_args) => {
            let run = BehaviourService::new(store).run_script(
                &RequestContext::new(),
                run_args.id,
                &run_args.name,
            )?;
            match run.outcome {
                ScriptOutcome::Returned(value) => println!("value: {}", value),
                ScriptOutcome::Written { attribute, value } => {
                    println!("{}: {}", attribute, value);
                    if let Some(data_id) = run.fragment.data_id {
                        println!("data_id: {}", data_id);
                    }
                }
            }
        }
    }
    Ok(())
}

//! modicio CLI
//!
//! Command-line interface over a SQLite fragment store

use clap::{Parser, Subcommand};
use modicio_core::logging_facility::{init, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "modicio")]
#[command(about = "modicio - versioned multi-level models", long_about = None)]
struct Cli {
    /// SQLite store; parent directories are created
    #[arg(long, global = true, default_value = ".modicio/store.db")]
    db: PathBuf,

    /// Log output on stderr; RUST_LOG sets the filter
    #[arg(long, global = true, value_parser = ["pretty", "json"], default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seed import operations
    Seed(commands::seed::SeedArgs),
    /// Variant operations
    Variant(commands::variant::VariantArgs),
    /// Evolve a stored model version
    Evolve(commands::evolve::EvolveArgs),
    /// Reference model operations
    Reference(commands::reference::ReferenceArgs),
    /// Instance operations
    Instance(commands::instance::InstanceArgs),
    /// Script operations
    Script(commands::script::ScriptArgs),
}

fn main() {
    let cli = Cli::parse();

    init(Profile::from_format(&cli.log_format).unwrap_or(Profile::Development));

    let result = commands::open_store(&cli.db).and_then(|store| match cli.command {
        Commands::Seed(args) => commands::seed::execute(args, &store),
        Commands::Variant(args) => commands::variant::execute(args, &store),
        Commands::Evolve(args) => commands::evolve::execute(args, &store),
        Commands::Reference(args) => commands::reference::execute(args, &store),
        Commands::Instance(args) => commands::instance::execute(args, &store),
        Commands::Script(args) => commands::script::execute(args, &store),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

//! Garnet command-line driver
//!
//! Lowers parser output (syntax trees as JSON) and prints the executable
//! node tree, or classifies identifiers.

mod commands;
mod logger;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "garnet")]
#[command(about = "Garnet front-end lowering tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower a syntax tree and print the executable nodes
    Lower {
        /// Syntax tree in the parser's JSON format
        tree: PathBuf,
        /// Source file the tree was parsed from
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Translator options (garnet.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Record line coverage and print the covered lines
        #[arg(long)]
        coverage: bool,
        /// Lower as eval code
        #[arg(long)]
        eval: bool,
        /// Treat the source as core library code
        #[arg(long)]
        core: bool,
        /// Lower deferred method bodies too and print them
        #[arg(long)]
        force_eager: bool,
    },

    /// Classify identifiers
    Classify {
        /// Names to classify
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Commands::Lower {
            tree,
            source,
            config,
            coverage,
            eval,
            core,
            force_eager,
        } => commands::lower::execute(commands::lower::LowerArgs {
            tree,
            source,
            config,
            coverage,
            eval,
            core,
            force_eager,
        }),
        Commands::Classify { names } => {
            commands::classify::execute(&names);
            Ok(())
        }
    }
}

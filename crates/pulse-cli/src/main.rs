mod cmd;
mod output;
mod root;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use pulse_core::config::DeckFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pulse",
    about = "Project status pages and slide decks from markdown project records",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from pulse.yaml or .git/)
    #[arg(long, global = true, env = "PULSE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute project workdays and regenerate the status block
    Update {
        /// Reference date for progress (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Write nothing; fail if any file is out of date
        #[arg(long)]
        check: bool,
    },

    /// List project records with their computed progress
    Projects {
        /// Reference date for progress (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Render the status document into a slide deck
    Present {
        /// Deck format: marp or json (default: from pulse.yaml)
        #[arg(long)]
        format: Option<DeckFormat>,
    },

    /// Inspect and validate pulse.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Update { today, check } => cmd::update::run(&root, today, check, cli.json),
        Commands::Projects { today } => cmd::projects::run(&root, today, cli.json),
        Commands::Present { format } => cmd::present::run(&root, format, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

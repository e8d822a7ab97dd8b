//! CLI frontend for the Delve dungeon crawler.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "delve",
    about = "Delve: a turn-based dungeon crawl driven by free-text actions",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive run
    Play {
        /// RNG seed for dungeon generation and dice
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Width and height of each level
        #[arg(long)]
        size: Option<usize>,

        /// Number of levels
        #[arg(long)]
        levels: Option<usize>,

        /// Character name
        #[arg(short, long, default_value = "Adventurer")]
        name: String,

        /// Narration style: plain, grim, wry
        #[arg(long, default_value = "plain")]
        tone: String,

        /// Resume from a save file
        #[arg(short, long)]
        load: Option<PathBuf>,

        /// Write the run journal when the session ends (markdown for .md files)
        #[arg(short, long)]
        journal: Option<PathBuf>,
    },

    /// Generate a dungeon and print its map
    Generate {
        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Width and height of each level
        #[arg(long, default_value = "6")]
        size: usize,

        /// Number of levels
        #[arg(long, default_value = "3")]
        levels: usize,

        /// Write the dungeon as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a save file and summarise it
    Inspect {
        /// Save file to check
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DELVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            seed,
            config,
            size,
            levels,
            name,
            tone,
            load,
            journal,
        } => commands::play::run(&commands::play::PlayOptions {
            seed,
            config,
            size,
            levels,
            name,
            tone,
            load,
            journal,
        }),
        Commands::Generate {
            seed,
            size,
            levels,
            output,
        } => commands::generate::run(seed, size, levels, output.as_deref()),
        Commands::Inspect { file } => commands::inspect::run(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

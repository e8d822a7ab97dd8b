use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use tracing::debug;

use dv_engine::{
    EngineConfig, GameSession, KeywordInterpreter, NarratorTone, RunStatus, TemplateNarrator,
    default_player,
};

pub struct PlayOptions {
    pub seed: Option<u64>,
    pub config: Option<PathBuf>,
    pub size: Option<usize>,
    pub levels: Option<usize>,
    pub name: String,
    pub tone: String,
    pub load: Option<PathBuf>,
    pub journal: Option<PathBuf>,
}

fn build_config(options: &PlayOptions) -> Result<EngineConfig, String> {
    let mut config = match &options.config {
        Some(path) => EngineConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    let size = options.size.unwrap_or(config.dungeon.size);
    let levels = options.levels.unwrap_or(config.dungeon.num_levels);
    Ok(config.with_size(size, levels))
}

pub fn run(options: &PlayOptions) -> Result<(), String> {
    let tone = NarratorTone::parse(&options.tone)
        .ok_or_else(|| format!("unknown tone '{}' (plain, grim, wry)", options.tone))?;
    let config = build_config(options)?;
    debug!(seed = config.seed, size = config.dungeon.size, "starting session");

    let mut session = GameSession::new(config, default_player(&options.name))
        .map_err(|e| format!("failed to start session: {e}"))?
        .with_collaborators(
            Arc::new(KeywordInterpreter::new()),
            Arc::new(TemplateNarrator::new(tone)),
        );
    if let Some(path) = &options.load {
        session
            .load(path)
            .map_err(|e| format!("failed to load {}: {e}", path.display()))?;
    }

    println!("  {} the dungeon", "Entering".bold());
    println!(
        "  Seed: {} | Levels: {} | Type 'help' for commands, 'quit' to exit.\n",
        session.config().seed,
        session.dungeon().num_levels()
    );
    if let Ok(intro) = session.look() {
        println!("{intro}\n");
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match session.process(input) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}\n");
                }
                let lower = input.to_lowercase();
                if matches!(lower.as_str(), "quit" | "exit" | "q") {
                    break;
                }
            }
            Err(e) => {
                println!("{}\n", e.to_string().yellow());
            }
        }

        match session.status() {
            RunStatus::Victory => {
                println!("{}", "Victory!".green().bold());
                break;
            }
            RunStatus::Defeated => {
                println!("{}", "Defeat.".red().bold());
                break;
            }
            RunStatus::Playing => {}
        }
    }

    println!("  {} turns taken.", session.turn());

    if let Some(path) = &options.journal {
        let journal = session.journal();
        let text = if path.extension().is_some_and(|ext| ext == "md") {
            journal.export_markdown()
        } else {
            journal.export_text()
        };
        std::fs::write(path, text)
            .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
        println!("  Journal written to {}", path.display());
    }

    Ok(())
}

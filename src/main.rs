//! Headless battle runner.
//!
//! Loads a battle setup (the bundled demo by default), plays it to the end
//! with NPC command sources on both sides, and prints the battle log.

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use pokemon_arena::battle::events::BattleEvent;
use pokemon_arena::logging::{init_logging, LogFormat};
use pokemon_arena::{BattleBuilder, BattleOutcome, BattleSetup, GameData};

const DEMO_SETUP: &str = include_str!("../data/demo_battle.ron");

/// Run a battle between two NPC-driven teams.
#[derive(Parser, Debug)]
#[command(name = "pokemon-arena", version, about)]
struct Cli {
    /// Battle setup in RON. Defaults to the bundled demo battle.
    setup: Option<PathBuf>,

    /// Override the seed from the setup file.
    #[arg(long)]
    seed: Option<u64>,

    /// Print events and the outcome as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Directory holding `moves.ron` and `species.ron`. Defaults to the
    /// bundled tables.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level filter (overridden by POKEMON_ARENA_LOG).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Serialize)]
struct Report<'a> {
    outcome: BattleOutcome,
    turns: u32,
    events: &'a [BattleEvent],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut setup = match &cli.setup {
        Some(path) => BattleSetup::load(path)
            .with_context(|| format!("loading battle setup from {}", path.display()))?,
        None => BattleSetup::from_ron_str(DEMO_SETUP).context("parsing the bundled demo setup")?,
    };
    if let Some(seed) = cli.seed {
        setup.config.seed = seed;
    }
    if let Some(level) = cli.log_level {
        setup.config.log.level = level;
    }
    if cli.json {
        setup.config.log.format = LogFormat::Json;
    }
    init_logging(&setup.config.log);

    let data = match &cli.data_dir {
        Some(dir) => GameData::from_dir(dir)
            .with_context(|| format!("loading tables from {}", dir.display()))?,
        None => GameData::builtin().context("loading the bundled tables")?,
    };
    let data = Rc::new(data);
    let mut battle = BattleBuilder::from_setup(&setup, data)?.build()?;
    let outcome = battle.run_to_completion()?;

    if cli.json {
        let report = Report {
            outcome,
            turns: battle.context().turn,
            events: battle.events(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in battle.events().iter().filter_map(BattleEvent::format) {
            println!("{line}");
        }
        println!();
        println!("Result: {outcome} after {} turns", battle.context().turn);
    }
    Ok(())
}

//! Demo runner: two AI-controlled pets fight one battle and the event log is printed.

use anyhow::{Context, Result};
use clap::Parser;
use pet_battle::{
    AiDifficulty, AiStrategy, BattleAi, BattleConfig, BattleEngine, BattleParticipant, BattleStats,
    Behavior, EquipmentCatalog, GiftCatalog, SharedGiftProvider,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pet-battle")]
#[command(about = "Run an AI vs AI pet battle and print what happened")]
struct Args {
    /// Directory holding battle_config.ron, equipment.ron and gifts.ron
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// AI difficulty for both pets
    #[arg(long, default_value = "normal")]
    difficulty: AiDifficulty,

    /// Level used to seed both pets' loadouts
    #[arg(long, default_value_t = 5)]
    level: u32,

    /// Stop after this many actions even if nobody has won
    #[arg(long, default_value_t = 60)]
    max_turns: u32,

    /// Print the event log as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = BattleConfig::load(&args.data_dir.join("battle_config.ron"))
        .context("loading battle configuration")?;
    let catalog = EquipmentCatalog::load(&args.data_dir.join("equipment.ron"))
        .context("loading equipment catalog")?;
    anyhow::ensure!(!catalog.is_empty(), "equipment catalog is empty");
    let gift_catalog =
        GiftCatalog::load(&args.data_dir.join("gifts.ron")).context("loading gift catalog")?;
    if gift_catalog.is_empty() {
        warn!("Gift catalog is empty; pets will fight without items");
    }
    info!(
        equipment = catalog.len(),
        gifts = gift_catalog.len(),
        "Loaded battle data"
    );
    let gifts: SharedGiftProvider = Arc::new(gift_catalog);

    let mut engine = BattleEngine::new(format!("demo-{}", seed), config, catalog)
        .with_gift_provider(Arc::clone(&gifts));

    let roster = [
        ("mochi", true, BattleStats::new(100.0, 12.0, 10.0, 14.0), AiStrategy::Aggressive),
        ("biscuit", false, BattleStats::new(110.0, 10.0, 12.0, 11.0), AiStrategy::Balanced),
    ];

    let mut brains: HashMap<String, BattleAi> = HashMap::new();
    for (offset, (id, is_local, stats, strategy)) in roster.into_iter().enumerate() {
        engine.equipment_mut().initialize_participant_loadout(id, args.level);
        engine.add_participant(BattleParticipant::new(id, is_local, stats))?;
        engine.initialize_participant_abilities(id, args.level)?;
        let ai = BattleAi::seeded(id, args.difficulty, strategy, seed.wrapping_add(offset as u64))
            .with_gift_provider(Arc::clone(&gifts));
        brains.insert(id.to_string(), ai);
    }

    engine.start_battle()?;

    for _ in 0..args.max_turns {
        if engine.state().living_participants().count() <= 1 {
            break;
        }
        let Some(actor) = engine.current_turn_participant().map(str::to_string) else {
            break;
        };
        let Some(ai) = brains.get_mut(&actor) else {
            break;
        };
        let action = ai.decide_action(engine.state());
        let strike = engine
            .available_special_abilities(&actor)
            .into_iter()
            .find(|ability| ability.base_action() == action.action_type);
        match strike {
            Some(ability) => {
                engine.use_special_ability(ability, &actor, action.target_id.as_deref())?;
            }
            None => {
                engine.perform_action(action, &actor)?;
            }
        }
    }

    let winner = engine.end_battle()?;
    info!(seed, ?winner, "Demo battle finished");

    if args.json {
        let events = engine.take_events();
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        print!("{}", engine.events());
    }

    Ok(())
}

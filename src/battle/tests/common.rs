use crate::battle::engine::BattleEngine;
use crate::config::BattleConfig;
use crate::equipment::EquipmentCatalog;
use crate::gifts::{GiftCatalog, SharedGiftProvider};
use crate::participant::{BattleModifier, BattleParticipant, BattleStats};
use std::sync::Arc;

/// A builder for creating test participants with common defaults.
///
/// # Example
/// ```
/// let pet = TestParticipantBuilder::new("mochi")
///     .with_hp(50.0)
///     .with_speed(20.0)
///     .build();
/// ```
pub struct TestParticipantBuilder {
    id: String,
    is_local: bool,
    max_hp: f64,
    hp: Option<f64>,
    attack: f64,
    defense: f64,
    speed: f64,
    modifiers: Vec<BattleModifier>,
}

impl TestParticipantBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            is_local: false,
            max_hp: 100.0,
            hp: None,
            attack: 10.0,
            defense: 10.0,
            speed: 10.0,
            modifiers: Vec::new(),
        }
    }

    pub fn local(mut self) -> Self {
        self.is_local = true;
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: f64) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_max_hp(mut self, max_hp: f64) -> Self {
        self.max_hp = max_hp;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_modifier(mut self, modifier: BattleModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn build(self) -> BattleParticipant {
        let mut stats = BattleStats::new(self.max_hp, self.attack, self.defense, self.speed);
        if let Some(hp) = self.hp {
            stats.hp = hp;
        }
        stats.modifiers = self.modifiers;
        BattleParticipant::new(self.id, self.is_local, stats)
    }
}

/// The gifts bundled in `data/gifts.ron`.
pub fn bundled_gifts() -> GiftCatalog {
    match GiftCatalog::from_ron_str(include_str!("../../../data/gifts.ron")) {
        Ok(catalog) => catalog,
        Err(err) => panic!("bundled gifts failed to load: {}", err),
    }
}

pub fn shared_gifts() -> SharedGiftProvider {
    Arc::new(bundled_gifts())
}

/// An engine in Setup with the standard catalog and default config.
pub fn create_engine(provider: Option<SharedGiftProvider>) -> BattleEngine {
    let mut engine = BattleEngine::new("test-battle", BattleConfig::default(), EquipmentCatalog::standard());
    engine.set_gift_provider(provider);
    engine
}

/// Adds every participant and starts the battle. Nobody gets a loadout, so
/// equipment multipliers stay neutral.
pub fn create_test_battle(
    participants: Vec<BattleParticipant>,
    provider: Option<SharedGiftProvider>,
) -> BattleEngine {
    let mut engine = create_engine(provider);
    for participant in participants {
        if let Err(err) = engine.add_participant(participant) {
            panic!("failed to add participant: {}", err);
        }
    }
    if let Err(err) = engine.start_battle() {
        panic!("failed to start battle: {}", err);
    }
    engine
}

/// A started battle with a single participant, for self-targeted scenarios.
pub fn solo_battle(participant: BattleParticipant, provider: Option<SharedGiftProvider>) -> BattleEngine {
    create_test_battle(vec![participant], provider)
}

pub fn hp_of(engine: &BattleEngine, participant_id: &str) -> f64 {
    match engine.state().participant(participant_id) {
        Some(participant) => participant.stats.hp,
        None => panic!("no participant {}", participant_id),
    }
}

#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} but got {}",
        expected,
        actual
    );
}

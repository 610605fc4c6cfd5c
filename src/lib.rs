//! Pet Battle Engine
//!
//! Turn-based battles between companion pets: equipment loadouts, gift items
//! that enhance actions, fairness caps on every multiplier and an AI that
//! picks actions and items by strategy and difficulty.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod equipment;
pub mod errors;
pub mod gifts;
pub mod participant;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    ActionType, AiDifficulty, AiStrategy, BattlePhase, ComboType, EquipmentRarity, EquipmentSlot,
    EquipmentType, ModifierType, SpecialAbilityType, StatCategory,
};

// --- From this crate's modules (`src/`) ---

// Battle engine, state and AI.
pub use battle::abilities::AbilitySlot;
pub use battle::ai::{Behavior, BattleAi};
pub use battle::engine::BattleEngine;
pub use battle::fairness::FairnessViolation;
pub use battle::state::{BattleAction, BattleEvent, BattleResult, BattleState, EventBus};

// Participants and their stats.
pub use participant::{ActionRecord, BattleModifier, BattleParticipant, BattleStats};

// Equipment and gifts.
pub use equipment::{
    BattleEquipment, EquipmentCatalog, EquipmentLoadout, EquipmentStatBonuses, EquipmentStore,
};
pub use gifts::{
    resolve_item_effect, BattleItemEffect, GiftCatalog, GiftDefinition, GiftProvider,
    SharedGiftProvider,
};

// Configuration and errors.
pub use config::{BaseValues, BattleConfig, EquipmentRules, FairnessLimits};
pub use errors::{
    AbilityError, BattleEngineError, ConfigError, EngineResult, EquipmentError, GiftError,
};

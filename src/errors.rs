use schema::{BattlePhase, EquipmentSlot, SpecialAbilityType};
use thiserror::Error;

/// Main error type for the pet battle engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BattleEngineError {
    #[error("Equipment error: {0}")]
    Equipment(#[from] EquipmentError),
    #[error("Battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    #[error("Ability error: {0}")]
    Ability(#[from] AbilityError),
}

/// Errors raised by the loadout store. None of them leave a loadout changed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EquipmentError {
    #[error("participant loadout not found: {0}")]
    LoadoutNotFound(String),
    #[error("equipment not found: {0}")]
    EquipmentNotFound(String),
    #[error("cannot equip broken equipment: {0}")]
    BrokenEquipment(String),
    #[error("no equipment in the {0} slot")]
    EmptySlot(EquipmentSlot),
    #[error("item is not consumable: {0}")]
    NotConsumable(String),
}

/// Errors related to battle lifecycle and roster validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BattleStateError {
    #[error("battle is {actual}, expected {expected}")]
    WrongPhase {
        expected: BattlePhase,
        actual: BattlePhase,
    },
    #[error("participant not found: {0}")]
    UnknownParticipant(String),
    #[error("participant already in battle: {0}")]
    DuplicateParticipant(String),
    #[error("invalid stats for {participant}: {reason}")]
    InvalidStats { participant: String, reason: String },
    #[error("a battle needs at least one participant")]
    NoParticipants,
    #[error("battle state is inconsistent: {0}")]
    InconsistentState(String),
}

/// Errors related to a requested action
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("{requester} cannot act on behalf of {actor}")]
    ActorMismatch { requester: String, actor: String },
    #[error("target not found: {0}")]
    UnknownTarget(String),
    #[error("{0} is defeated")]
    ParticipantDefeated(String),
}

/// Reasons a special ability cannot be used right now. The turn is not spent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbilityError {
    #[error("{participant} has not learned {ability}")]
    NotLearned {
        participant: String,
        ability: SpecialAbilityType,
    },
    #[error("{ability} is on cooldown for {turns_remaining} more turns")]
    OnCooldown {
        ability: SpecialAbilityType,
        turns_remaining: u32,
    },
    #[error("{0} has no charges left")]
    NoCharges(SpecialAbilityType),
}

/// Lookup failures reported by a gift provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GiftError {
    #[error("gift not found: {0}")]
    GiftNotFound(String),
    #[error("gift has no battle effect: {0}")]
    NoBattleEffect(String),
}

/// Errors from loading configuration or catalog data
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid data: {0}")]
    Invalid(String),
}

/// Type alias for Results using BattleEngineError
pub type EngineResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using EquipmentError
pub type EquipmentResult<T> = Result<T, EquipmentError>;

/// Type alias for Results using ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

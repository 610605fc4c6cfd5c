use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Every action a participant can request during a battle.
///
/// The snake_case name doubles as the animation key handed to the renderer.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ActionType {
    Attack,
    Defend,
    Stun,
    Heal,
    Boost,
    Counter,
    Drain,
    Shield,
    Charge,
    Evade,
    Taunt,
}

impl ActionType {
    /// The stat category whose multipliers scale this action, if any.
    pub fn category(self) -> Option<StatCategory> {
        match self {
            ActionType::Attack | ActionType::Drain | ActionType::Boost | ActionType::Charge => {
                Some(StatCategory::Damage)
            }
            ActionType::Defend | ActionType::Shield => Some(StatCategory::Defense),
            ActionType::Heal => Some(StatCategory::Healing),
            ActionType::Evade => Some(StatCategory::Speed),
            ActionType::Stun | ActionType::Counter | ActionType::Taunt => None,
        }
    }

    /// Actions aimed at an opponent rather than at the actor.
    pub fn is_offensive(self) -> bool {
        matches!(
            self,
            ActionType::Attack | ActionType::Stun | ActionType::Drain | ActionType::Taunt
        )
    }

    pub fn animation(self) -> &'static str {
        match self {
            ActionType::Attack => "attack",
            ActionType::Defend => "defend",
            ActionType::Stun => "stun",
            ActionType::Heal => "heal",
            ActionType::Boost => "boost",
            ActionType::Counter => "counter",
            ActionType::Drain => "drain",
            ActionType::Shield => "shield",
            ActionType::Charge => "charge",
            ActionType::Evade => "evade",
            ActionType::Taunt => "taunt",
        }
    }

    /// Flavor text appended to the actor's name in battle logs.
    pub fn response_text(self) -> &'static str {
        match self {
            ActionType::Attack => "attacks with determination!",
            ActionType::Defend => "takes a defensive stance!",
            ActionType::Stun => "attempts to stun the opponent!",
            ActionType::Heal => "recovers health!",
            ActionType::Boost => "powers up for increased damage!",
            ActionType::Counter => "prepares a counter-attack!",
            ActionType::Drain => "drains energy from the opponent!",
            ActionType::Shield => "creates a protective barrier!",
            ActionType::Charge => "charges up energy!",
            ActionType::Evade => "prepares to dodge!",
            ActionType::Taunt => "taunts the opponent!",
        }
    }
}

/// Stat categories that carry a global fairness ceiling.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum StatCategory {
    Damage,
    Defense,
    Speed,
    Healing,
}

impl StatCategory {
    pub fn modifier_type(self) -> ModifierType {
        match self {
            StatCategory::Damage => ModifierType::Damage,
            StatCategory::Defense => ModifierType::Defense,
            StatCategory::Speed => ModifierType::Speed,
            StatCategory::Healing => ModifierType::Healing,
        }
    }
}

/// Kinds of modifier that can sit on a participant or appear in a result.
///
/// Damage, Speed and Healing are multipliers around 1.0. Defense is a
/// damage-reduction fraction and Shield a flat absorption pool. The rest
/// are markers whose value is informational.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum ModifierType {
    Damage,
    Defense,
    Speed,
    Healing,
    Shield,
    Stun,
    Counter,
    Evade,
    Taunt,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BattlePhase {
    Setup,
    Active,
    Ended,
}

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

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
)]
#[strum(serialize_all = "snake_case")]
pub enum AiDifficulty {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl AiDifficulty {
    /// Probability that the AI attaches an item to its chosen action.
    pub fn item_usage_chance(self) -> f64 {
        match self {
            AiDifficulty::Easy => 0.1,
            AiDifficulty::Normal => 0.3,
            AiDifficulty::Hard => 0.6,
            AiDifficulty::Expert => 0.8,
        }
    }

    /// Score multiplier applied to items that are used up on use.
    pub fn consumable_penalty(self) -> f64 {
        match self {
            AiDifficulty::Easy => 0.5,
            AiDifficulty::Normal => 0.7,
            AiDifficulty::Hard => 0.9,
            AiDifficulty::Expert => 1.0,
        }
    }

    /// Chance of skipping deliberation and acting straight away.
    pub fn quick_reaction_chance(self) -> f64 {
        match self {
            AiDifficulty::Easy => 0.1,
            AiDifficulty::Normal => 0.2,
            AiDifficulty::Hard => 0.4,
            AiDifficulty::Expert => 0.6,
        }
    }
}

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum AiStrategy {
    Aggressive,
    Defensive,
    Balanced,
    Support,
}

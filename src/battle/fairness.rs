use crate::battle::state::BattleResult;
use crate::config::{BaseValues, FairnessLimits};
use crate::participant::{BattleModifier, BattleStats};
use schema::ModifierType;
use thiserror::Error;

// Float slack for comparisons against products of the caps.
const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FairnessViolation {
    #[error("damage {actual} exceeds the limit of {limit}")]
    DamageAboveLimit { actual: f64, limit: f64 },
    #[error("healing {actual} exceeds the limit of {limit}")]
    HealingAboveLimit { actual: f64, limit: f64 },
    #[error("{origin} lasts {duration} turns, more than the limit of {limit}")]
    DurationAboveLimit {
        origin: String,
        duration: u32,
        limit: u32,
    },
    #[error("{origin} has {modifier_type} value {value}, more than the limit of {limit}")]
    ModifierAboveLimit {
        origin: String,
        modifier_type: ModifierType,
        value: f64,
        limit: f64,
    },
    #[error("invalid stats: {0}")]
    InvalidStats(String),
}

impl FairnessLimits {
    /// Check a resolved result against the global ceilings.
    pub fn check_result(
        &self,
        result: &BattleResult,
        base: &BaseValues,
    ) -> Result<(), FairnessViolation> {
        let damage_limit = base.attack_damage * self.max_damage_modifier;
        if result.damage > damage_limit + TOLERANCE {
            return Err(FairnessViolation::DamageAboveLimit {
                actual: result.damage,
                limit: damage_limit,
            });
        }

        let healing_limit = base.heal_amount * self.max_heal_modifier;
        if result.healing > healing_limit + TOLERANCE {
            return Err(FairnessViolation::HealingAboveLimit {
                actual: result.healing,
                limit: healing_limit,
            });
        }

        for modifier in result.modifiers_applied.iter().filter(|m| m.is_lasting()) {
            self.check_modifier(modifier, base)?;
        }

        Ok(())
    }

    /// Check one lasting modifier's duration and magnitude.
    pub fn check_modifier(
        &self,
        modifier: &BattleModifier,
        base: &BaseValues,
    ) -> Result<(), FairnessViolation> {
        if modifier.duration > self.max_modifier_duration {
            return Err(FairnessViolation::DurationAboveLimit {
                origin: modifier.source.clone(),
                duration: modifier.duration,
                limit: self.max_modifier_duration,
            });
        }

        let limit = match modifier.modifier_type {
            ModifierType::Defense => Some(base.defend_reduction * self.max_defense_modifier),
            ModifierType::Shield => Some(base.shield_absorption * self.max_defense_modifier),
            ModifierType::Speed | ModifierType::Evade => Some(self.max_speed_modifier),
            _ => None,
        };

        match limit {
            Some(limit) if modifier.value > limit + TOLERANCE => {
                Err(FairnessViolation::ModifierAboveLimit {
                    origin: modifier.source.clone(),
                    modifier_type: modifier.modifier_type,
                    value: modifier.value,
                    limit,
                })
            }
            _ => Ok(()),
        }
    }

    /// Reject stats no battle should start with.
    pub fn validate_stats(&self, stats: &BattleStats) -> Result<(), FairnessViolation> {
        if !(stats.max_hp > 0.0) {
            return Err(FairnessViolation::InvalidStats(format!(
                "max HP must be positive, got {}",
                stats.max_hp
            )));
        }
        if !(0.0..=stats.max_hp).contains(&stats.hp) {
            return Err(FairnessViolation::InvalidStats(format!(
                "HP {} is outside 0..={}",
                stats.hp, stats.max_hp
            )));
        }
        for (name, value) in [
            ("attack", stats.attack),
            ("defense", stats.defense),
            ("speed", stats.speed),
        ] {
            if !(value >= 0.0) {
                return Err(FairnessViolation::InvalidStats(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        if stats.modifiers.len() > self.max_effect_stacking {
            return Err(FairnessViolation::InvalidStats(format!(
                "{} modifiers exceed the stacking limit of {}",
                stats.modifiers.len(),
                self.max_effect_stacking
            )));
        }
        Ok(())
    }
}

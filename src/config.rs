//! Tunable numbers for the battle engine.
//!
//! Every battle runs against one [`BattleConfig`]. The defaults are the
//! balance values the game ships with; a RON file can override any subset.

use crate::errors::{ConfigError, ConfigResult};
use schema::StatCategory;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const BASE_ATTACK_DAMAGE: f64 = 20.0;
pub const BASE_DEFEND_REDUCTION: f64 = 0.5;
pub const BASE_HEAL_AMOUNT: f64 = 25.0;
pub const BASE_STUN_DURATION: u32 = 1;
pub const BASE_BOOST_MULTIPLIER: f64 = 1.15;
pub const BASE_DRAIN_RATIO: f64 = 0.3;
pub const BASE_SHIELD_ABSORPTION: f64 = 30.0;
pub const BASE_CHARGE_MULTIPLIER: f64 = 1.5;

pub const MAX_DAMAGE_MODIFIER: f64 = 1.20;
pub const MAX_DEFENSE_MODIFIER: f64 = 1.15;
pub const MAX_SPEED_MODIFIER: f64 = 1.10;
pub const MAX_HEAL_MODIFIER: f64 = 1.25;
pub const MAX_EFFECT_STACKING: usize = 3;

pub const EQUIPMENT_MAX_DAMAGE_BOOST: f64 = 0.15;
pub const EQUIPMENT_MAX_DEFENSE_BOOST: f64 = 0.12;
pub const EQUIPMENT_MAX_SPEED_BOOST: f64 = 0.08;
pub const EQUIPMENT_MAX_HEALTH_BOOST: f64 = 0.20;
pub const EQUIPMENT_BONUS_FLOOR: f64 = 0.5;
pub const EQUIPMENT_MAX_DURABILITY: u32 = 100;
pub const DURABILITY_LOSS_PER_BATTLE: u32 = 5;

/// Base magnitude of every action before any multiplier.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BaseValues {
    pub attack_damage: f64,
    pub defend_reduction: f64,
    pub heal_amount: f64,
    pub stun_duration: u32,
    pub boost_multiplier: f64,
    pub boost_duration: u32,
    pub drain_ratio: f64,
    pub shield_absorption: f64,
    pub shield_duration: u32,
    pub charge_multiplier: f64,
    /// Duration of counter, evade and taunt markers.
    pub marker_duration: u32,
}

impl Default for BaseValues {
    fn default() -> Self {
        Self {
            attack_damage: BASE_ATTACK_DAMAGE,
            defend_reduction: BASE_DEFEND_REDUCTION,
            heal_amount: BASE_HEAL_AMOUNT,
            stun_duration: BASE_STUN_DURATION,
            boost_multiplier: BASE_BOOST_MULTIPLIER,
            boost_duration: 3,
            drain_ratio: BASE_DRAIN_RATIO,
            shield_absorption: BASE_SHIELD_ABSORPTION,
            shield_duration: 3,
            charge_multiplier: BASE_CHARGE_MULTIPLIER,
            marker_duration: 2,
        }
    }
}

/// Global ceilings that no combination of gear, items and buffs may exceed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FairnessLimits {
    pub max_damage_modifier: f64,
    pub max_defense_modifier: f64,
    pub max_speed_modifier: f64,
    pub max_heal_modifier: f64,
    pub max_effect_stacking: usize,
    pub max_modifier_duration: u32,
}

impl Default for FairnessLimits {
    fn default() -> Self {
        Self {
            max_damage_modifier: MAX_DAMAGE_MODIFIER,
            max_defense_modifier: MAX_DEFENSE_MODIFIER,
            max_speed_modifier: MAX_SPEED_MODIFIER,
            max_heal_modifier: MAX_HEAL_MODIFIER,
            max_effect_stacking: MAX_EFFECT_STACKING,
            max_modifier_duration: 10,
        }
    }
}

impl FairnessLimits {
    pub fn cap_for(&self, category: StatCategory) -> f64 {
        match category {
            StatCategory::Damage => self.max_damage_modifier,
            StatCategory::Defense => self.max_defense_modifier,
            StatCategory::Speed => self.max_speed_modifier,
            StatCategory::Healing => self.max_heal_modifier,
        }
    }

    /// Clamps a combined multiplier into `[0, cap]` for its category.
    pub fn clamp_modifier(&self, category: StatCategory, value: f64) -> f64 {
        value.clamp(0.0, self.cap_for(category))
    }
}

/// Limits on what a full set of equipment may contribute.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EquipmentRules {
    pub max_damage_boost: f64,
    pub max_defense_boost: f64,
    pub max_speed_boost: f64,
    pub max_health_boost: f64,
    /// Lowest multiplier any category can fall to, however heavy the penalties.
    pub bonus_floor: f64,
    pub durability_loss_per_battle: u32,
}

impl Default for EquipmentRules {
    fn default() -> Self {
        Self {
            max_damage_boost: EQUIPMENT_MAX_DAMAGE_BOOST,
            max_defense_boost: EQUIPMENT_MAX_DEFENSE_BOOST,
            max_speed_boost: EQUIPMENT_MAX_SPEED_BOOST,
            max_health_boost: EQUIPMENT_MAX_HEALTH_BOOST,
            bonus_floor: EQUIPMENT_BONUS_FLOOR,
            durability_loss_per_battle: DURABILITY_LOSS_PER_BATTLE,
        }
    }
}

impl EquipmentRules {
    /// Upper bound of the aggregated multiplier for a category.
    pub fn ceiling_for(&self, category: StatCategory) -> f64 {
        let boost = match category {
            StatCategory::Damage => self.max_damage_boost,
            StatCategory::Defense => self.max_defense_boost,
            StatCategory::Speed => self.max_speed_boost,
            StatCategory::Healing => self.max_health_boost,
        };
        1.0 + boost
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BattleConfig {
    pub base: BaseValues,
    pub fairness: FairnessLimits,
    pub equipment: EquipmentRules,
}

impl BattleConfig {
    pub fn from_ron_str(content: &str) -> ConfigResult<Self> {
        let config: BattleConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = read_data_file(path)?;
        Self::from_ron_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let caps = [
            ("max_damage_modifier", self.fairness.max_damage_modifier),
            ("max_defense_modifier", self.fairness.max_defense_modifier),
            ("max_speed_modifier", self.fairness.max_speed_modifier),
            ("max_heal_modifier", self.fairness.max_heal_modifier),
        ];
        for (name, cap) in caps {
            if !(cap >= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at least 1.0, got {}",
                    name, cap
                )));
            }
        }

        if self.fairness.max_effect_stacking == 0 {
            return Err(ConfigError::Invalid(
                "max_effect_stacking must be positive".to_string(),
            ));
        }

        let floor = self.equipment.bonus_floor;
        if !(floor > 0.0 && floor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "bonus_floor must be in (0, 1], got {}",
                floor
            )));
        }

        if !(self.base.defend_reduction >= 0.0 && self.base.defend_reduction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "defend_reduction must be in [0, 1), got {}",
                self.base.defend_reduction
            )));
        }

        Ok(())
    }
}

pub(crate) fn read_data_file(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = BattleConfig::from_ron_str("(fairness: (max_damage_modifier: 1.3))")
            .expect("config should parse");

        assert_eq!(config.fairness.max_damage_modifier, 1.3);
        assert_eq!(config.fairness.max_heal_modifier, MAX_HEAL_MODIFIER);
        assert_eq!(config.base, BaseValues::default());
        assert_eq!(config.equipment, EquipmentRules::default());
    }

    #[test]
    fn test_cap_below_one_is_rejected() {
        let result = BattleConfig::from_ron_str("(fairness: (max_speed_modifier: 0.9))");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let result = BattleConfig::from_ron_str("(fairness: [nope])");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let config = BattleConfig::from_ron_str(include_str!("../data/battle_config.ron"))
            .expect("bundled config should parse");
        assert_eq!(config, BattleConfig::default());
    }

    #[test]
    fn test_equipment_ceiling() {
        let rules = EquipmentRules::default();
        assert_eq!(rules.ceiling_for(StatCategory::Damage), 1.15);
        assert_eq!(rules.ceiling_for(StatCategory::Healing), 1.2);
    }
}

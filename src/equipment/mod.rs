//! Equipment catalog, per-participant loadouts and the bonus math behind them.

pub mod catalog;
pub mod consumables;
pub mod loadout;

pub use catalog::EquipmentCatalog;
pub use loadout::{aggregate_bonuses, EquipmentLoadout, EquipmentStore};

use crate::config::EQUIPMENT_MAX_DURABILITY;
use schema::{EquipmentRarity, EquipmentSlot, EquipmentType, StatCategory};
use serde::{Deserialize, Serialize};

fn full_durability() -> u32 {
    EQUIPMENT_MAX_DURABILITY
}

fn first_level() -> u32 {
    1
}

/// A piece of gear. Catalog entries are templates; loadouts hold their own copies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleEquipment {
    pub id: String,
    pub name: String,
    pub equipment_type: EquipmentType,
    pub slot: EquipmentSlot,
    pub rarity: EquipmentRarity,
    #[serde(default)]
    pub description: String,
    // Bonuses are added to a neutral 1.0 multiplier; negative values are penalties.
    #[serde(default)]
    pub attack_bonus: f64,
    #[serde(default)]
    pub defense_bonus: f64,
    #[serde(default)]
    pub speed_bonus: f64,
    #[serde(default)]
    pub health_bonus: f64,
    #[serde(default)]
    pub special_effects: Vec<String>,
    #[serde(default = "full_durability")]
    pub durability: u32,
    #[serde(default = "full_durability")]
    pub max_durability: u32,
    #[serde(default)]
    pub is_broken: bool,
    #[serde(default = "first_level")]
    pub required_level: u32,
    #[serde(default)]
    pub gift_id: Option<String>,
}

impl BattleEquipment {
    /// A new item in its type's natural slot with full durability and no bonuses.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        equipment_type: EquipmentType,
        rarity: EquipmentRarity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            equipment_type,
            slot: equipment_type.natural_slot(),
            rarity,
            description: String::new(),
            attack_bonus: 0.0,
            defense_bonus: 0.0,
            speed_bonus: 0.0,
            health_bonus: 0.0,
            special_effects: Vec::new(),
            durability: EQUIPMENT_MAX_DURABILITY,
            max_durability: EQUIPMENT_MAX_DURABILITY,
            is_broken: false,
            required_level: 1,
            gift_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_bonuses(mut self, attack: f64, defense: f64, speed: f64, health: f64) -> Self {
        self.attack_bonus = attack;
        self.defense_bonus = defense;
        self.speed_bonus = speed;
        self.health_bonus = health;
        self
    }

    pub fn with_effects(mut self, effects: &[&str]) -> Self {
        self.special_effects = effects.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_durability(mut self, durability: u32) -> Self {
        self.durability = durability;
        self.max_durability = durability;
        self
    }

    pub fn with_required_level(mut self, level: u32) -> Self {
        self.required_level = level;
        self
    }

    pub fn bonus_for(&self, category: StatCategory) -> f64 {
        match category {
            StatCategory::Damage => self.attack_bonus,
            StatCategory::Defense => self.defense_bonus,
            StatCategory::Speed => self.speed_bonus,
            StatCategory::Healing => self.health_bonus,
        }
    }

    pub fn is_consumable(&self) -> bool {
        self.slot == EquipmentSlot::Consumable
    }

    /// Subtract durability. Returns true if this wear broke the item.
    pub fn wear(&mut self, amount: u32) -> bool {
        self.durability = self.durability.saturating_sub(amount);
        if self.durability == 0 && !self.is_broken {
            self.is_broken = true;
            return true;
        }
        false
    }

    pub fn repair(&mut self) {
        self.durability = self.max_durability;
        self.is_broken = false;
    }
}

/// Aggregated multipliers from everything a participant has equipped.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EquipmentStatBonuses {
    pub attack_multiplier: f64,
    pub defense_multiplier: f64,
    pub speed_multiplier: f64,
    pub health_multiplier: f64,
    pub active_effects: Vec<String>,
}

impl Default for EquipmentStatBonuses {
    fn default() -> Self {
        Self {
            attack_multiplier: 1.0,
            defense_multiplier: 1.0,
            speed_multiplier: 1.0,
            health_multiplier: 1.0,
            active_effects: Vec::new(),
        }
    }
}

impl EquipmentStatBonuses {
    pub fn multiplier_for(&self, category: StatCategory) -> f64 {
        match category {
            StatCategory::Damage => self.attack_multiplier,
            StatCategory::Defense => self.defense_multiplier,
            StatCategory::Speed => self.speed_multiplier,
            StatCategory::Healing => self.health_multiplier,
        }
    }

    fn multiplier_mut(&mut self, category: StatCategory) -> &mut f64 {
        match category {
            StatCategory::Damage => &mut self.attack_multiplier,
            StatCategory::Defense => &mut self.defense_multiplier,
            StatCategory::Speed => &mut self.speed_multiplier,
            StatCategory::Healing => &mut self.health_multiplier,
        }
    }
}

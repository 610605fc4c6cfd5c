use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString};

/// The four loadout slots. A loadout holds at most one item per slot.
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
)]
#[strum(serialize_all = "snake_case")]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Accessory,
    Consumable,
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            EquipmentSlot::Weapon => "Weapon",
            EquipmentSlot::Armor => "Armor",
            EquipmentSlot::Accessory => "Accessory",
            EquipmentSlot::Consumable => "Consumable",
        };
        write!(f, "{}", display_name)
    }
}

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
)]
#[strum(serialize_all = "snake_case")]
pub enum EquipmentRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl EquipmentRarity {
    /// Fraction of a category cap that an item of this rarity may reach.
    pub fn effect_multiplier(self) -> f64 {
        match self {
            EquipmentRarity::Common => 0.5,
            EquipmentRarity::Uncommon => 0.7,
            EquipmentRarity::Rare => 0.9,
            EquipmentRarity::Epic => 1.0,
            EquipmentRarity::Legendary => 1.0,
        }
    }
}

impl fmt::Display for EquipmentRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            EquipmentRarity::Common => "Common",
            EquipmentRarity::Uncommon => "Uncommon",
            EquipmentRarity::Rare => "Rare",
            EquipmentRarity::Epic => "Epic",
            EquipmentRarity::Legendary => "Legendary",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum EquipmentType {
    // Weapons
    Sword,
    Bow,
    Staff,
    Dagger,
    Hammer,
    // Armor
    HeavyArmor,
    LightArmor,
    MagicRobe,
    LeatherArmor,
    // Accessories
    PowerRing,
    DefenseRing,
    SpeedAmulet,
    HealthCharm,
    // Consumables
    HealthPotion,
    PowerElixir,
    SpeedBoost,
    ShieldScroll,
}

impl EquipmentType {
    /// The slot an item of this type occupies when equipped.
    pub fn natural_slot(self) -> EquipmentSlot {
        match self {
            EquipmentType::Sword
            | EquipmentType::Bow
            | EquipmentType::Staff
            | EquipmentType::Dagger
            | EquipmentType::Hammer => EquipmentSlot::Weapon,
            EquipmentType::HeavyArmor
            | EquipmentType::LightArmor
            | EquipmentType::MagicRobe
            | EquipmentType::LeatherArmor => EquipmentSlot::Armor,
            EquipmentType::PowerRing
            | EquipmentType::DefenseRing
            | EquipmentType::SpeedAmulet
            | EquipmentType::HealthCharm => EquipmentSlot::Accessory,
            EquipmentType::HealthPotion
            | EquipmentType::PowerElixir
            | EquipmentType::SpeedBoost
            | EquipmentType::ShieldScroll => EquipmentSlot::Consumable,
        }
    }

    /// Types picked by auto-equip for a slot, in preference order.
    ///
    /// The consumable slot is never auto-equipped.
    pub fn auto_equip_priority(slot: EquipmentSlot) -> &'static [EquipmentType] {
        match slot {
            EquipmentSlot::Weapon => &[
                EquipmentType::Sword,
                EquipmentType::Bow,
                EquipmentType::Staff,
                EquipmentType::Dagger,
            ],
            EquipmentSlot::Armor => &[
                EquipmentType::LeatherArmor,
                EquipmentType::LightArmor,
                EquipmentType::HeavyArmor,
            ],
            EquipmentSlot::Accessory => &[
                EquipmentType::PowerRing,
                EquipmentType::HealthCharm,
                EquipmentType::SpeedAmulet,
            ],
            EquipmentSlot::Consumable => &[],
        }
    }
}

use super::BattleEquipment;
use crate::config::{
    read_data_file, EQUIPMENT_MAX_DAMAGE_BOOST, EQUIPMENT_MAX_DEFENSE_BOOST,
    EQUIPMENT_MAX_HEALTH_BOOST, EQUIPMENT_MAX_SPEED_BOOST,
};
use crate::errors::{ConfigError, ConfigResult};
use schema::{EquipmentRarity, EquipmentType};
use std::collections::HashSet;
use std::path::Path;

/// The static equipment database, in a fixed order.
///
/// Order matters: new loadouts receive catalog items in this order, and
/// auto-equip picks the first match from the inventory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EquipmentCatalog {
    items: Vec<BattleEquipment>,
}

impl EquipmentCatalog {
    /// Build a catalog, rejecting duplicate ids and items filed in the wrong slot.
    pub fn new(items: Vec<BattleEquipment>) -> ConfigResult<Self> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate equipment id: {}",
                    item.id
                )));
            }
            if item.slot != item.equipment_type.natural_slot() {
                return Err(ConfigError::Invalid(format!(
                    "{} is a {:?} but is filed under {}",
                    item.id, item.equipment_type, item.slot
                )));
            }
            if item.durability > item.max_durability {
                return Err(ConfigError::Invalid(format!(
                    "{} has durability {} above its maximum {}",
                    item.id, item.durability, item.max_durability
                )));
            }
        }
        Ok(Self { items })
    }

    pub fn from_ron_str(content: &str) -> ConfigResult<Self> {
        let items: Vec<BattleEquipment> = ron::from_str(content)?;
        Self::new(items)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = read_data_file(path)?;
        Self::from_ron_str(&content)
    }

    /// The stock equipment set.
    pub fn standard() -> Self {
        let common = EquipmentRarity::Common.effect_multiplier();
        let uncommon = EquipmentRarity::Uncommon.effect_multiplier();
        let rare = EquipmentRarity::Rare.effect_multiplier();

        let items = vec![
            // Weapons
            BattleEquipment::new("iron_sword", "Iron Sword", EquipmentType::Sword, EquipmentRarity::Common)
                .with_description("A sturdy iron blade for beginners")
                .with_bonuses(EQUIPMENT_MAX_DAMAGE_BOOST * common, 0.0, 0.0, 0.0),
            BattleEquipment::new("wooden_bow", "Wooden Bow", EquipmentType::Bow, EquipmentRarity::Common)
                .with_description("A light bow that trades power for speed")
                .with_bonuses(
                    EQUIPMENT_MAX_DAMAGE_BOOST * common * 0.8,
                    0.0,
                    EQUIPMENT_MAX_SPEED_BOOST * common * 0.5,
                    0.0,
                ),
            BattleEquipment::new("steel_sword", "Steel Sword", EquipmentType::Sword, EquipmentRarity::Uncommon)
                .with_description("A well-forged steel blade")
                .with_bonuses(EQUIPMENT_MAX_DAMAGE_BOOST * uncommon, 0.0, 0.0, 0.0)
                .with_required_level(3),
            BattleEquipment::new("magic_staff", "Magic Staff", EquipmentType::Staff, EquipmentRarity::Uncommon)
                .with_description("Channels arcane power")
                .with_bonuses(EQUIPMENT_MAX_DAMAGE_BOOST * uncommon * 0.7, 0.0, 0.0, 0.0)
                .with_effects(&["magic_damage", "mana_efficiency"])
                .with_required_level(3),
            BattleEquipment::new("enchanted_blade", "Enchanted Blade", EquipmentType::Sword, EquipmentRarity::Rare)
                .with_description("A blade humming with elemental energy")
                .with_bonuses(EQUIPMENT_MAX_DAMAGE_BOOST * rare, 0.0, 0.0, 0.0)
                .with_effects(&["elemental_damage", "critical_chance"])
                .with_required_level(5),
            // Armor
            BattleEquipment::new("leather_armor", "Leather Armor", EquipmentType::LeatherArmor, EquipmentRarity::Common)
                .with_description("Basic protection that keeps you nimble")
                .with_bonuses(0.0, EQUIPMENT_MAX_DEFENSE_BOOST * common, 0.0, 0.0),
            BattleEquipment::new("chain_mail", "Chain Mail", EquipmentType::LightArmor, EquipmentRarity::Uncommon)
                .with_description("Interlocking rings, slightly heavy")
                .with_bonuses(
                    0.0,
                    EQUIPMENT_MAX_DEFENSE_BOOST * uncommon,
                    -EQUIPMENT_MAX_SPEED_BOOST * 0.3,
                    0.0,
                )
                .with_required_level(2),
            BattleEquipment::new("plate_armor", "Plate Armor", EquipmentType::HeavyArmor, EquipmentRarity::Rare)
                .with_description("Heavy plates that turn aside most blows")
                .with_bonuses(
                    0.0,
                    EQUIPMENT_MAX_DEFENSE_BOOST * rare,
                    -EQUIPMENT_MAX_SPEED_BOOST * 0.5,
                    0.0,
                )
                .with_effects(&["damage_reflection", "knockback_resist"])
                .with_required_level(4),
            // Accessories
            BattleEquipment::new("power_ring", "Power Ring", EquipmentType::PowerRing, EquipmentRarity::Uncommon)
                .with_description("A ring that sharpens every strike")
                .with_bonuses(EQUIPMENT_MAX_DAMAGE_BOOST * uncommon * 0.6, 0.0, 0.0, 0.0)
                .with_required_level(2),
            BattleEquipment::new("health_charm", "Health Charm", EquipmentType::HealthCharm, EquipmentRarity::Rare)
                .with_description("A warm charm that bolsters vitality")
                .with_bonuses(0.0, 0.0, 0.0, EQUIPMENT_MAX_HEALTH_BOOST * rare)
                .with_effects(&["health_regeneration"])
                .with_required_level(3),
            BattleEquipment::new("speed_amulet", "Speed Amulet", EquipmentType::SpeedAmulet, EquipmentRarity::Uncommon)
                .with_description("Lightens every step")
                .with_bonuses(0.0, 0.0, EQUIPMENT_MAX_SPEED_BOOST * uncommon, 0.0)
                .with_required_level(4),
            // Consumables
            BattleEquipment::new("health_potion", "Health Potion", EquipmentType::HealthPotion, EquipmentRarity::Common)
                .with_description("Restores 50 HP")
                .with_effects(&["instant_heal_50"])
                .with_durability(1),
            BattleEquipment::new("power_elixir", "Power Elixir", EquipmentType::PowerElixir, EquipmentRarity::Uncommon)
                .with_description("Briefly boosts attack power")
                .with_bonuses(EQUIPMENT_MAX_DAMAGE_BOOST * common, 0.0, 0.0, 0.0)
                .with_effects(&["temporary_power_boost"])
                .with_durability(1)
                .with_required_level(2),
            BattleEquipment::new("speed_boost", "Speed Tonic", EquipmentType::SpeedBoost, EquipmentRarity::Common)
                .with_description("A fizzy drink that quickens reflexes")
                .with_effects(&["temporary_speed_boost"])
                .with_durability(1)
                .with_required_level(2),
            BattleEquipment::new("shield_scroll", "Shield Scroll", EquipmentType::ShieldScroll, EquipmentRarity::Uncommon)
                .with_description("Conjures a barrier that soaks up damage")
                .with_effects(&["damage_barrier"])
                .with_durability(1)
                .with_required_level(3),
        ];

        Self { items }
    }

    pub fn get(&self, equipment_id: &str) -> Option<&BattleEquipment> {
        self.items.iter().find(|item| item.id == equipment_id)
    }

    pub fn items(&self) -> &[BattleEquipment] {
        &self.items
    }

    /// Items a participant of `level` may carry, in catalog order.
    pub fn available_for_level(&self, level: u32) -> impl Iterator<Item = &BattleEquipment> {
        self.items
            .iter()
            .filter(move |item| item.required_level <= level)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

use super::BattleEquipment;
use crate::battle::state::BattleResult;
use crate::config::EquipmentRules;
use crate::participant::BattleModifier;
use schema::{EquipmentType, ModifierType};

pub const HEALTH_POTION_HEALING: f64 = 50.0;
pub const POWER_ELIXIR_DURATION: u32 = 3;
pub const SPEED_BOOST_DURATION: u32 = 2;
pub const SHIELD_SCROLL_ABSORPTION: f64 = 25.0;
pub const SHIELD_SCROLL_DURATION: u32 = 4;

/// The outcome of using a consumable, before it is applied to anyone.
pub fn consumable_result(item: &BattleEquipment, rules: &EquipmentRules) -> BattleResult {
    let animation = match item.equipment_type {
        EquipmentType::HealthPotion => "drink_potion",
        EquipmentType::PowerElixir => "drink_elixir",
        EquipmentType::SpeedBoost => "use_boost",
        EquipmentType::ShieldScroll => "cast_scroll",
        _ => "use_item",
    };

    let mut result = BattleResult::new(animation, format!("uses {}!", item.name));
    result.status_effects = item.special_effects.clone();

    match item.equipment_type {
        EquipmentType::HealthPotion => {
            result.healing = HEALTH_POTION_HEALING;
        }
        EquipmentType::PowerElixir => {
            result.modifiers_applied.push(BattleModifier::new(
                ModifierType::Damage,
                1.0 + item.attack_bonus,
                POWER_ELIXIR_DURATION,
                item.id.as_str(),
            ));
        }
        EquipmentType::SpeedBoost => {
            result.modifiers_applied.push(BattleModifier::new(
                ModifierType::Speed,
                1.0 + rules.max_speed_boost,
                SPEED_BOOST_DURATION,
                item.id.as_str(),
            ));
        }
        EquipmentType::ShieldScroll => {
            result.modifiers_applied.push(BattleModifier::new(
                ModifierType::Shield,
                SHIELD_SCROLL_ABSORPTION,
                SHIELD_SCROLL_DURATION,
                item.id.as_str(),
            ));
        }
        _ => {}
    }

    result
}

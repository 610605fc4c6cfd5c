//! Gifts are consumable items owned by the host application. The engine only
//! reads their battle effects through a [`GiftProvider`].

use crate::config::read_data_file;
use crate::errors::{ConfigError, ConfigResult, GiftError};
use schema::{ActionType, StatCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// What a gift does when used alongside an action.
///
/// Modifier fields are multipliers; zero (or anything not above zero) means
/// the gift does not touch that category.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BattleItemEffect {
    /// Restricts the effect to one action. `None` applies to every action.
    pub action_type: Option<ActionType>,
    pub damage_modifier: f64,
    pub defense_modifier: f64,
    pub speed_modifier: f64,
    pub heal_modifier: f64,
    /// Turns the effect lasts; 0 means single use.
    pub duration: u32,
    pub consumable: bool,
}

impl BattleItemEffect {
    pub fn applies_to(&self, action: ActionType) -> bool {
        self.action_type.map_or(true, |declared| declared == action)
    }

    /// The multiplier for a category, if the effect sets one.
    pub fn modifier_for(&self, category: StatCategory) -> Option<f64> {
        let value = match category {
            StatCategory::Damage => self.damage_modifier,
            StatCategory::Defense => self.defense_modifier,
            StatCategory::Speed => self.speed_modifier,
            StatCategory::Healing => self.heal_modifier,
        };
        (value > 0.0).then_some(value)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GiftDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub battle_effect: Option<BattleItemEffect>,
}

impl GiftDefinition {
    pub fn require_battle_effect(self) -> Result<BattleItemEffect, GiftError> {
        self.battle_effect
            .ok_or(GiftError::NoBattleEffect(self.id))
    }
}

/// Source of gift definitions, usually backed by the character's inventory.
pub trait GiftProvider {
    fn gift_definition(&self, gift_id: &str) -> Result<GiftDefinition, GiftError>;

    /// Gifts the holder can currently use in battle.
    fn available_gifts(&self) -> Vec<GiftDefinition>;
}

/// A provider shared between the engine and the AI.
pub type SharedGiftProvider = Arc<dyn GiftProvider + Send + Sync>;

/// Look up the effect a gift has on `action`.
///
/// Unknown gifts, gifts without a battle effect, gifts meant for a different
/// action and a missing provider all resolve to `None`; none of them is an
/// error for the battle.
pub fn resolve_item_effect(
    provider: Option<&dyn GiftProvider>,
    gift_id: &str,
    action: ActionType,
) -> Option<BattleItemEffect> {
    let Some(provider) = provider else {
        debug!(gift = gift_id, "No gift provider configured; ignoring item");
        return None;
    };

    let effect = match provider
        .gift_definition(gift_id)
        .and_then(GiftDefinition::require_battle_effect)
    {
        Ok(effect) => effect,
        Err(err) => {
            debug!(gift = gift_id, %err, "Ignoring item");
            return None;
        }
    };

    if !effect.applies_to(action) {
        debug!(
            gift = gift_id,
            declared = ?effect.action_type,
            %action,
            "Gift does not apply to this action"
        );
        return None;
    }
    Some(effect)
}

/// An in-memory gift provider, loadable from RON.
#[derive(Debug, Clone, Default)]
pub struct GiftCatalog {
    gifts: BTreeMap<String, GiftDefinition>,
}

impl GiftCatalog {
    pub fn new(definitions: Vec<GiftDefinition>) -> Self {
        let gifts = definitions
            .into_iter()
            .map(|definition| (definition.id.clone(), definition))
            .collect();
        Self { gifts }
    }

    pub fn from_ron_str(content: &str) -> ConfigResult<Self> {
        let definitions: Vec<GiftDefinition> = ron::from_str(content)?;
        for definition in &definitions {
            if let Some(effect) = &definition.battle_effect {
                let modifiers = [
                    effect.damage_modifier,
                    effect.defense_modifier,
                    effect.speed_modifier,
                    effect.heal_modifier,
                ];
                if modifiers.iter().any(|value| *value < 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "gift {} has a negative modifier",
                        definition.id
                    )));
                }
            }
        }
        Ok(Self::new(definitions))
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = read_data_file(path)?;
        Self::from_ron_str(&content)
    }

    pub fn insert(&mut self, definition: GiftDefinition) {
        self.gifts.insert(definition.id.clone(), definition);
    }

    pub fn len(&self) -> usize {
        self.gifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gifts.is_empty()
    }
}

impl GiftProvider for GiftCatalog {
    fn gift_definition(&self, gift_id: &str) -> Result<GiftDefinition, GiftError> {
        self.gifts
            .get(gift_id)
            .cloned()
            .ok_or_else(|| GiftError::GiftNotFound(gift_id.to_string()))
    }

    fn available_gifts(&self) -> Vec<GiftDefinition> {
        self.gifts
            .values()
            .filter(|definition| definition.battle_effect.is_some())
            .cloned()
            .collect()
    }
}

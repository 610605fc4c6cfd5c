//! Special abilities and action combos.
//!
//! Abilities are resolved through the same pipeline as ordinary actions: the
//! ability's power joins equipment and live buffs in [`combined_modifier`]
//! and the product is capped once. A combo finisher works the same way,
//! its bonus folded in before the cap.

use crate::battle::calculators::{combined_modifier, Resolution, ResolveBonus, ResolveContext};
use crate::battle::commands::BattleCommand;
use crate::battle::state::BattleResult;
use crate::errors::AbilityError;
use crate::participant::BattleModifier;
use schema::{ActionType, ComboType, ModifierType, SpecialAbilityType};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

pub const LIFE_STEAL_RATIO: f64 = 0.6;
pub const BERSERKER_DURATION: u32 = 3;
pub const SANCTUARY_HEAL_BOOST: f64 = 1.2;
pub const SANCTUARY_DURATION: u32 = 3;

/// One learned ability and how soon it can be used again.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AbilitySlot {
    pub ability: SpecialAbilityType,
    /// Owner turns left before the ability is ready.
    pub cooldown_remaining: u32,
    /// Uses left this battle; `None` for unlimited.
    pub charges: Option<u32>,
}

impl AbilitySlot {
    pub fn new(ability: SpecialAbilityType) -> Self {
        Self {
            ability,
            cooldown_remaining: 0,
            charges: ability.max_charges(),
        }
    }

    pub fn check_ready(&self) -> Result<(), AbilityError> {
        if self.charges == Some(0) {
            return Err(AbilityError::NoCharges(self.ability));
        }
        if self.cooldown_remaining > 0 {
            return Err(AbilityError::OnCooldown {
                ability: self.ability,
                turns_remaining: self.cooldown_remaining,
            });
        }
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.check_ready().is_ok()
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_remaining = self.ability.cooldown();
        if let Some(charges) = self.charges.as_mut() {
            *charges = charges.saturating_sub(1);
        }
    }

    pub fn tick(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }
}

/// Every ability a participant of `level` may learn, ready to use.
pub fn learnable_abilities(level: u32) -> Vec<AbilitySlot> {
    SpecialAbilityType::iter()
        .filter(|ability| ability.required_level() <= level)
        .map(AbilitySlot::new)
        .collect()
}

/// Which lasting modifiers a removal command strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierFilter {
    /// Stuns, taunts and multipliers that work against their holder.
    Harmful,
    /// Defense and Shield.
    Guard,
}

impl ModifierFilter {
    pub fn matches(self, modifier: &BattleModifier) -> bool {
        match self {
            ModifierFilter::Harmful => match modifier.modifier_type {
                ModifierType::Stun | ModifierType::Taunt => true,
                ModifierType::Damage | ModifierType::Speed | ModifierType::Healing => {
                    modifier.value < 1.0
                }
                ModifierType::Defense => modifier.value < 0.0,
                ModifierType::Shield | ModifierType::Counter | ModifierType::Evade => false,
            },
            ModifierFilter::Guard => matches!(
                modifier.modifier_type,
                ModifierType::Defense | ModifierType::Shield
            ),
        }
    }
}

fn is_combo_prefix(chain: &[ActionType]) -> bool {
    ComboType::iter().any(|combo| combo.sequence().starts_with(chain))
}

/// Extend `chain` with this turn's action and report a finished combo.
///
/// `None` stands for a turn that was not an ordinary action (a lost turn or
/// a special ability) and breaks the chain. An action that does not continue
/// the chain may still start a new one.
pub fn advance_combo_chain(chain: &mut Vec<ActionType>, action: Option<ActionType>) -> Option<ComboType> {
    let Some(action) = action else {
        chain.clear();
        return None;
    };

    chain.push(action);
    if !is_combo_prefix(chain) {
        chain.clear();
        chain.push(action);
        if !is_combo_prefix(chain) {
            chain.clear();
            return None;
        }
    }

    let completed = ComboType::iter().find(|combo| combo.sequence() == chain.as_slice());
    if completed.is_some() {
        chain.clear();
    }
    completed
}

/// The combo `action` would finish, without touching the chain.
pub fn completing_combo(chain: &[ActionType], action: ActionType) -> Option<ComboType> {
    let mut next = chain.to_vec();
    advance_combo_chain(&mut next, Some(action))
}

pub fn combo_bonus(combo: ComboType) -> ResolveBonus<'static> {
    ResolveBonus {
        source: combo.into(),
        damage: combo.damage_multiplier(),
        effect: combo.effect_multiplier(),
    }
}

pub fn ability_bonus(ability: SpecialAbilityType) -> ResolveBonus<'static> {
    ResolveBonus {
        source: ability.into(),
        damage: ability.power(),
        effect: ability.power(),
    }
}

/// Mark a result as a combo finisher.
pub fn apply_combo_flourish(result: &mut BattleResult, combo: ComboType) {
    result
        .status_effects
        .extend(combo.bonus_effects().iter().map(|effect| effect.to_string()));
    result.response = format!("COMBO: {}! {}", combo.name(), result.response);
}

/// Resolve a special ability into a result and the commands that apply it.
///
/// `ctx.action` is the ability's base action and `ctx.bonus` its
/// [`ability_bonus`].
pub fn resolve_special_ability(ability: SpecialAbilityType, ctx: &ResolveContext) -> Resolution {
    let actor_id = ctx.action.actor_id.as_str();
    let target_id = ctx.action.target_or_actor();
    let base = &ctx.config.base;
    let lasting = |duration: u32| duration.min(ctx.config.fairness.max_modifier_duration);
    let animation: &'static str = ability.into();

    let mut result = BattleResult::new(animation, ability.response_text());
    let mut commands = Vec::new();

    let multiplier = match ctx.action.action_type.category() {
        Some(category) => combined_modifier(category, ctx, None, &mut result.modifiers_applied),
        None => 1.0,
    };

    let mut effects: Vec<(&str, BattleModifier)> = Vec::new();
    let status: &[&str] = match ability {
        SpecialAbilityType::CriticalStrike => {
            result.damage = base.attack_damage * multiplier * ctx.target.damage_taken_factor();
            commands.push(BattleCommand::DealDamage {
                target: target_id.to_string(),
                amount: result.damage,
            });
            &["critical_hit"]
        }
        SpecialAbilityType::LightningBolt => {
            // Ignores the target's Defense; shields still absorb it.
            result.damage = base.attack_damage * multiplier;
            commands.push(BattleCommand::DealDamage {
                target: target_id.to_string(),
                amount: result.damage,
            });
            &["unblockable", "lightning_effect"]
        }
        SpecialAbilityType::LifeSteal => {
            result.damage = base.attack_damage * multiplier * ctx.target.damage_taken_factor();
            result.healing = result.damage * LIFE_STEAL_RATIO;
            commands.push(BattleCommand::DrainHealth {
                source: actor_id.to_string(),
                target: target_id.to_string(),
                amount: result.damage,
                heal_ratio: LIFE_STEAL_RATIO,
            });
            &["life_steal"]
        }
        SpecialAbilityType::BerserkerRage => {
            commands.push(BattleCommand::RemoveModifiers {
                target: actor_id.to_string(),
                filter: ModifierFilter::Guard,
            });
            effects.push((
                actor_id,
                BattleModifier::new(
                    ModifierType::Damage,
                    multiplier,
                    lasting(BERSERKER_DURATION),
                    "berserker_rage",
                ),
            ));
            &["guard_dropped"]
        }
        SpecialAbilityType::PerfectGuard => {
            effects.push((
                actor_id,
                BattleModifier::new(
                    ModifierType::Defense,
                    base.defend_reduction * multiplier,
                    lasting(1),
                    "perfect_guard",
                ),
            ));
            &[]
        }
        SpecialAbilityType::Sanctuary => {
            result.healing = base.heal_amount * multiplier;
            commands.push(BattleCommand::HealParticipant {
                target: actor_id.to_string(),
                amount: result.healing,
            });
            effects.push((
                actor_id,
                BattleModifier::new(
                    ModifierType::Healing,
                    SANCTUARY_HEAL_BOOST,
                    lasting(SANCTUARY_DURATION),
                    "sanctuary",
                ),
            ));
            &[]
        }
        SpecialAbilityType::Cleanse => {
            commands.push(BattleCommand::RemoveModifiers {
                target: actor_id.to_string(),
                filter: ModifierFilter::Harmful,
            });
            &["remove_debuffs"]
        }
        SpecialAbilityType::TimeFreeze => {
            effects.push((
                target_id,
                BattleModifier::new(
                    ModifierType::Stun,
                    1.0,
                    lasting(base.stun_duration),
                    "time_freeze",
                ),
            ));
            &["skip_opponent_turn"]
        }
    };
    result
        .status_effects
        .extend(status.iter().map(|effect| effect.to_string()));

    for (recipient, modifier) in effects {
        result.modifiers_applied.push(modifier.clone());
        commands.push(BattleCommand::AddModifier {
            target: recipient.to_string(),
            modifier,
        });
    }

    Resolution { result, commands }
}

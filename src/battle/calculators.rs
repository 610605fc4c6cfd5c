//! Pure outcome math for a single action.
//!
//! Nothing here touches the battle state. The resolver reads copies of the
//! actor's and target's stats and returns the result together with the
//! commands that would apply it.

use crate::battle::commands::BattleCommand;
use crate::battle::state::{BattleAction, BattleResult};
use crate::config::BattleConfig;
use crate::equipment::EquipmentStatBonuses;
use crate::gifts::BattleItemEffect;
use crate::participant::{BattleModifier, BattleStats};
use schema::{ActionType, ModifierType, StatCategory};
use tracing::debug;

pub const EQUIPMENT_SOURCE: &str = "equipment";
pub const FAIRNESS_CAP_SOURCE: &str = "fairness_cap";

/// Everything the resolver needs to know about one action.
pub struct ResolveContext<'a> {
    pub action: &'a BattleAction,
    pub actor: &'a BattleStats,
    pub target: &'a BattleStats,
    pub equipment: &'a EquipmentStatBonuses,
    /// The gift used with the action and its effect, if it applies.
    pub item: Option<(&'a str, &'a BattleItemEffect)>,
    /// A combo finisher or special ability folded in before the cap.
    pub bonus: Option<ResolveBonus<'a>>,
    pub config: &'a BattleConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveBonus<'a> {
    pub source: &'a str,
    pub damage: f64,
    pub effect: f64,
}

impl ResolveBonus<'_> {
    pub fn multiplier_for(&self, category: StatCategory) -> f64 {
        match category {
            StatCategory::Damage => self.damage,
            _ => self.effect,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub result: BattleResult,
    pub commands: Vec<BattleCommand>,
}

/// Fold equipment, item and live buffs for `category` into one multiplier
/// and clamp it to the category's fairness ceiling.
///
/// Every contributing factor is recorded in `audit`, as is the cap when it
/// bites.
pub fn combined_modifier(
    category: StatCategory,
    ctx: &ResolveContext,
    item: Option<(&str, &BattleItemEffect)>,
    audit: &mut Vec<BattleModifier>,
) -> f64 {
    let modifier_type = category.modifier_type();

    let equipment = ctx.equipment.multiplier_for(category);
    let mut combined = equipment;
    if (equipment - 1.0).abs() > f64::EPSILON {
        audit.push(BattleModifier::instant(modifier_type, equipment, EQUIPMENT_SOURCE));
    }

    if let Some((gift_id, effect)) = item {
        if let Some(value) = effect.modifier_for(category) {
            combined *= value;
            audit.push(BattleModifier::instant(modifier_type, value, gift_id));
        }
    }

    if let Some(bonus) = &ctx.bonus {
        let value = bonus.multiplier_for(category);
        if (value - 1.0).abs() > f64::EPSILON {
            combined *= value;
            audit.push(BattleModifier::instant(modifier_type, value, bonus.source));
        }
    }

    // Live Defense modifiers are damage reduction, not multipliers on the
    // actor's own defensive actions.
    if category != StatCategory::Defense {
        for live in ctx.actor.modifiers_of(modifier_type) {
            combined *= live.value;
            audit.push(BattleModifier::instant(modifier_type, live.value, live.source.as_str()));
        }
    }

    let capped = ctx.config.fairness.clamp_modifier(category, combined);
    if capped < combined {
        debug!(%category, combined, capped, "Modifier capped");
        audit.push(BattleModifier::instant(modifier_type, capped, FAIRNESS_CAP_SOURCE));
    }
    capped
}

/// Resolve an action into a result and the commands that apply it.
pub fn resolve_action(ctx: &ResolveContext) -> Resolution {
    let action = ctx.action;
    let action_type = action.action_type;
    let actor_id = action.actor_id.as_str();
    let target_id = action.target_or_actor();
    let base = &ctx.config.base;

    let mut result = BattleResult::new(action_type.animation(), action_type.response_text());
    let mut commands = Vec::new();

    let item = ctx.item.filter(|(_, effect)| effect.applies_to(action_type));
    let multiplier = match action_type.category() {
        Some(category) => combined_modifier(category, ctx, item, &mut result.modifiers_applied),
        None => 1.0,
    };

    // Items with a longer duration extend the action's lasting effect.
    let lasting = |base_duration: u32| {
        let duration = item.map_or(base_duration, |(_, effect)| base_duration.max(effect.duration));
        duration.min(ctx.config.fairness.max_modifier_duration)
    };

    let effect = match action_type {
        ActionType::Attack => {
            let damage = base.attack_damage * multiplier * ctx.target.damage_taken_factor();
            result.damage = damage;
            commands.push(BattleCommand::DealDamage {
                target: target_id.to_string(),
                amount: damage,
            });
            None
        }
        ActionType::Drain => {
            let damage =
                base.attack_damage * base.drain_ratio * multiplier * ctx.target.damage_taken_factor();
            result.damage = damage;
            result.healing = damage;
            commands.push(BattleCommand::DrainHealth {
                source: actor_id.to_string(),
                target: target_id.to_string(),
                amount: damage,
                heal_ratio: 1.0,
            });
            None
        }
        ActionType::Heal => {
            let healing = base.heal_amount * multiplier;
            result.healing = healing;
            commands.push(BattleCommand::HealParticipant {
                target: target_id.to_string(),
                amount: healing,
            });
            None
        }
        ActionType::Defend => Some((
            actor_id,
            BattleModifier::new(
                ModifierType::Defense,
                base.defend_reduction * multiplier,
                lasting(1),
                "defend_action",
            ),
        )),
        ActionType::Shield => Some((
            actor_id,
            BattleModifier::new(
                ModifierType::Shield,
                base.shield_absorption * multiplier,
                lasting(base.shield_duration),
                "shield_action",
            ),
        )),
        ActionType::Boost => Some((
            actor_id,
            BattleModifier::new(
                ModifierType::Damage,
                base.boost_multiplier * multiplier,
                lasting(base.boost_duration),
                "boost_action",
            ),
        )),
        ActionType::Charge => Some((
            actor_id,
            BattleModifier::new(
                ModifierType::Damage,
                base.charge_multiplier * multiplier,
                lasting(1),
                "charge_action",
            ),
        )),
        ActionType::Stun => Some((
            target_id,
            BattleModifier::new(
                ModifierType::Stun,
                1.0,
                lasting(base.stun_duration),
                "stun_action",
            ),
        )),
        ActionType::Counter => Some((
            actor_id,
            BattleModifier::new(
                ModifierType::Counter,
                1.0,
                lasting(base.marker_duration),
                "counter_action",
            ),
        )),
        ActionType::Evade => Some((
            actor_id,
            BattleModifier::new(
                ModifierType::Evade,
                multiplier,
                lasting(base.marker_duration),
                "evade_action",
            ),
        )),
        ActionType::Taunt => Some((
            target_id,
            BattleModifier::new(
                ModifierType::Taunt,
                1.0,
                lasting(base.marker_duration),
                "taunt_action",
            ),
        )),
    };

    if let Some((recipient, modifier)) = effect {
        result.modifiers_applied.push(modifier.clone());
        commands.push(BattleCommand::AddModifier {
            target: recipient.to_string(),
            modifier,
        });
    }

    Resolution { result, commands }
}

use crate::battle::abilities::{advance_combo_chain, ModifierFilter};
use crate::battle::state::{BattleEvent, BattleState, EventBus};
use crate::participant::{BattleModifier, BattleParticipant};
use schema::{ActionType, SpecialAbilityType};
use thiserror::Error;
use tracing::{debug, warn};

/// Atomic commands representing final state changes
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    DealDamage {
        target: String,
        amount: f64,
    },
    /// Damage the target and heal the source by `heal_ratio` of whatever
    /// actually got through.
    DrainHealth {
        source: String,
        target: String,
        amount: f64,
        heal_ratio: f64,
    },
    HealParticipant {
        target: String,
        amount: f64,
    },
    AddModifier {
        target: String,
        modifier: BattleModifier,
    },
    TickModifiers {
        target: String,
    },
    RemoveModifiers {
        target: String,
        filter: ModifierFilter,
    },
    StartCooldown {
        target: String,
        ability: SpecialAbilityType,
    },
    TickCooldowns {
        target: String,
    },
    /// Feed the turn into the target's combo chain; `None` breaks it.
    TrackCombo {
        target: String,
        action: Option<ActionType>,
    },
    EmitEvent(BattleEvent),
}

/// Error types for command execution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("command refers to unknown participant {0}")]
    NoParticipant(String),
    #[error("{participant} has no {ability} slot")]
    NoAbility {
        participant: String,
        ability: SpecialAbilityType,
    },
}

/// What actually landed while executing a batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppliedTotals {
    pub damage_dealt: f64,
    pub healing_done: f64,
    /// Modifiers turned away by the stacking limit.
    pub dropped_modifiers: Vec<BattleModifier>,
}

pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    state: &mut BattleState,
    bus: &mut EventBus,
    max_stacking: usize,
) -> Result<AppliedTotals, ExecutionError> {
    let mut totals = AppliedTotals::default();
    for command in commands {
        execute_command(command, state, bus, max_stacking, &mut totals)?;
    }
    Ok(totals)
}

fn participant_mut<'a>(
    state: &'a mut BattleState,
    participant_id: &str,
) -> Result<&'a mut BattleParticipant, ExecutionError> {
    state
        .participant_mut(participant_id)
        .ok_or_else(|| ExecutionError::NoParticipant(participant_id.to_string()))
}

/// Shields absorb first, then HP drops. Returns the HP actually lost.
fn execute_deal_damage_command(
    target: &str,
    amount: f64,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> Result<f64, ExecutionError> {
    let participant = participant_mut(state, target)?;
    let was_defeated = participant.is_defeated();

    let through = participant.stats.absorb_with_shields(amount);
    let absorbed = amount - through;
    if absorbed > 0.0 {
        bus.push(BattleEvent::DamageAbsorbed {
            target: target.to_string(),
            amount: absorbed,
        });
    }

    let dealt = participant.stats.take_damage(through);
    bus.push(BattleEvent::DamageDealt {
        target: target.to_string(),
        damage: dealt,
        remaining_hp: participant.stats.hp,
    });

    if !was_defeated && participant.is_defeated() {
        bus.push(BattleEvent::ParticipantDefeated {
            participant: target.to_string(),
        });
    }

    Ok(dealt)
}

/// Defeated participants cannot be healed back into the battle.
fn execute_heal_command(
    target: &str,
    amount: f64,
    state: &mut BattleState,
    bus: &mut EventBus,
) -> Result<f64, ExecutionError> {
    let participant = participant_mut(state, target)?;
    if participant.is_defeated() {
        return Ok(0.0);
    }

    let restored = participant.stats.heal(amount);
    bus.push(BattleEvent::Healed {
        target: target.to_string(),
        amount: restored,
        new_hp: participant.stats.hp,
    });
    Ok(restored)
}

fn execute_command(
    command: BattleCommand,
    state: &mut BattleState,
    bus: &mut EventBus,
    max_stacking: usize,
    totals: &mut AppliedTotals,
) -> Result<(), ExecutionError> {
    match command {
        BattleCommand::EmitEvent(event) => {
            bus.push(event);
        }
        BattleCommand::DealDamage { target, amount } => {
            totals.damage_dealt += execute_deal_damage_command(&target, amount, state, bus)?;
        }
        BattleCommand::DrainHealth {
            source,
            target,
            amount,
            heal_ratio,
        } => {
            // Check the source up front so a bad batch fails before any damage lands.
            participant_mut(state, &source)?;
            let dealt = execute_deal_damage_command(&target, amount, state, bus)?;
            totals.damage_dealt += dealt;
            totals.healing_done += execute_heal_command(&source, dealt * heal_ratio, state, bus)?;
        }
        BattleCommand::HealParticipant { target, amount } => {
            totals.healing_done += execute_heal_command(&target, amount, state, bus)?;
        }
        BattleCommand::AddModifier { target, modifier } => {
            let participant = participant_mut(state, &target)?;
            if participant.stats.add_modifier(modifier.clone(), max_stacking) {
                bus.push(BattleEvent::ModifierAdded { target, modifier });
            } else {
                warn!(
                    participant = %target,
                    source = %modifier.source,
                    "Effect stacking limit reached; modifier dropped"
                );
                totals.dropped_modifiers.push(modifier.clone());
                bus.push(BattleEvent::ModifierDropped { target, modifier });
            }
        }
        BattleCommand::TickModifiers { target } => {
            let participant = participant_mut(state, &target)?;
            for modifier in participant.stats.tick_modifiers() {
                bus.push(BattleEvent::ModifierExpired {
                    target: target.clone(),
                    modifier,
                });
            }
        }
        BattleCommand::RemoveModifiers { target, filter } => {
            let participant = participant_mut(state, &target)?;
            for modifier in participant.stats.remove_modifiers(|m| filter.matches(m)) {
                bus.push(BattleEvent::ModifierRemoved {
                    target: target.clone(),
                    modifier,
                });
            }
        }
        BattleCommand::StartCooldown { target, ability } => {
            let participant = participant_mut(state, &target)?;
            let slot = participant
                .ability_mut(ability)
                .ok_or_else(|| ExecutionError::NoAbility {
                    participant: target.clone(),
                    ability,
                })?;
            slot.start_cooldown();
        }
        BattleCommand::TickCooldowns { target } => {
            let participant = participant_mut(state, &target)?;
            participant.abilities.iter_mut().for_each(|slot| slot.tick());
        }
        BattleCommand::TrackCombo { target, action } => {
            let participant = participant_mut(state, &target)?;
            if let Some(combo) = advance_combo_chain(&mut participant.combo_chain, action) {
                debug!(participant = %target, %combo, "Combo completed");
                bus.push(BattleEvent::ComboCompleted {
                    actor: target,
                    combo,
                });
            }
        }
    }
    Ok(())
}

use crate::battle::abilities::{
    ability_bonus, apply_combo_flourish, combo_bonus, completing_combo, learnable_abilities,
    resolve_special_ability,
};
use crate::battle::calculators::{resolve_action, ResolveContext};
use crate::battle::commands::{execute_command_batch, AppliedTotals, BattleCommand, ExecutionError};
use crate::battle::state::{BattleAction, BattleEvent, BattleResult, BattleState, EventBus};
use crate::config::BattleConfig;
use crate::equipment::{EquipmentCatalog, EquipmentStore};
use crate::errors::{AbilityError, ActionError, BattleEngineError, BattleStateError, EngineResult};
use crate::gifts::{resolve_item_effect, GiftProvider, SharedGiftProvider};
use crate::participant::{ActionRecord, BattleParticipant};
use ordered_float::OrderedFloat;
use schema::{ActionType, BattlePhase, ModifierType, SpecialAbilityType};
use strum::IntoEnumIterator;
use tracing::{debug, error, info};

/// Buffs and cooldowns count down at the start of their owner's turn.
fn turn_start_commands(actor_id: &str) -> Vec<BattleCommand> {
    vec![
        BattleCommand::TickModifiers {
            target: actor_id.to_string(),
        },
        BattleCommand::TickCooldowns {
            target: actor_id.to_string(),
        },
    ]
}

/// Owns one battle: the authoritative state, the participants' loadouts and
/// the event log.
///
/// Every mutating operation works on a staged copy of the state and commits
/// it only once the whole operation has succeeded.
pub struct BattleEngine {
    state: BattleState,
    config: BattleConfig,
    equipment: EquipmentStore,
    gift_provider: Option<SharedGiftProvider>,
    event_bus: EventBus,
}

impl BattleEngine {
    pub fn new(battle_id: impl Into<String>, config: BattleConfig, catalog: EquipmentCatalog) -> Self {
        let equipment = EquipmentStore::new(catalog, config.equipment.clone());
        Self {
            state: BattleState::new(battle_id),
            config,
            equipment,
            gift_provider: None,
            event_bus: EventBus::new(),
        }
    }

    pub fn with_gift_provider(mut self, provider: SharedGiftProvider) -> Self {
        self.gift_provider = Some(provider);
        self
    }

    pub fn set_gift_provider(&mut self, provider: Option<SharedGiftProvider>) {
        self.gift_provider = provider;
    }

    pub fn gift_provider(&self) -> Option<&SharedGiftProvider> {
        self.gift_provider.as_ref()
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn equipment(&self) -> &EquipmentStore {
        &self.equipment
    }

    /// Loadout operations (equip, unequip, repair) go straight to the store.
    pub fn equipment_mut(&mut self) -> &mut EquipmentStore {
        &mut self.equipment
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        self.event_bus.take()
    }

    fn require_phase(&self, expected: BattlePhase) -> EngineResult<()> {
        if self.state.phase != expected {
            return Err(BattleStateError::WrongPhase {
                expected,
                actual: self.state.phase,
            }
            .into());
        }
        Ok(())
    }

    fn require_participant(&self, participant_id: &str) -> EngineResult<&BattleParticipant> {
        self.state
            .participant(participant_id)
            .ok_or_else(|| BattleStateError::UnknownParticipant(participant_id.to_string()).into())
    }

    fn run_commands(
        &self,
        commands: Vec<BattleCommand>,
        staged: &mut BattleState,
        bus: &mut EventBus,
    ) -> EngineResult<AppliedTotals> {
        execute_command_batch(commands, staged, bus, self.config.fairness.max_effect_stacking)
            .map_err(|err: ExecutionError| {
                BattleEngineError::from(BattleStateError::InconsistentState(err.to_string()))
            })
    }

    fn commit(&mut self, staged: BattleState, mut bus: EventBus) {
        self.state = staged;
        for event in bus.take() {
            self.event_bus.push(event);
        }
    }

    pub fn add_participant(&mut self, participant: BattleParticipant) -> EngineResult<()> {
        self.require_phase(BattlePhase::Setup)?;
        if self.state.participants.contains_key(&participant.id) {
            return Err(BattleStateError::DuplicateParticipant(participant.id).into());
        }
        self.config
            .fairness
            .validate_stats(&participant.stats)
            .map_err(|violation| BattleStateError::InvalidStats {
                participant: participant.id.clone(),
                reason: violation.to_string(),
            })?;

        info!(battle = %self.state.battle_id, participant = %participant.id, "Participant joined");
        self.state
            .participants
            .insert(participant.id.clone(), participant);
        Ok(())
    }

    /// Grant every ability `level` unlocks, replacing any earlier grant.
    pub fn initialize_participant_abilities(
        &mut self,
        participant_id: &str,
        level: u32,
    ) -> EngineResult<Vec<SpecialAbilityType>> {
        self.require_phase(BattlePhase::Setup)?;
        let participant = self
            .state
            .participant_mut(participant_id)
            .ok_or_else(|| BattleStateError::UnknownParticipant(participant_id.to_string()))?;

        participant.abilities = learnable_abilities(level);
        participant.combo_chain.clear();
        let granted: Vec<SpecialAbilityType> =
            participant.abilities.iter().map(|slot| slot.ability).collect();
        info!(participant = participant_id, level, ?granted, "Abilities granted");
        Ok(granted)
    }

    /// Abilities the participant could use right now. Empty for an unknown participant.
    pub fn available_special_abilities(&self, participant_id: &str) -> Vec<SpecialAbilityType> {
        self.state
            .participant(participant_id)
            .map(|participant| {
                participant
                    .abilities
                    .iter()
                    .filter(|slot| slot.is_ready())
                    .map(|slot| slot.ability)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Apply equipment to everyone's stats and fix the turn order, fastest first.
    pub fn start_battle(&mut self) -> EngineResult<()> {
        self.require_phase(BattlePhase::Setup)?;
        if self.state.participants.is_empty() {
            return Err(BattleStateError::NoParticipants.into());
        }

        let mut staged = self.state.clone();
        for participant in staged.participants.values_mut() {
            participant.stats = self
                .equipment
                .apply_equipment_bonuses(&participant.id, &participant.base_stats);
        }

        let mut order: Vec<&BattleParticipant> = staged.participants.values().collect();
        order.sort_by(|a, b| {
            OrderedFloat(b.stats.speed)
                .cmp(&OrderedFloat(a.stats.speed))
                .then_with(|| a.id.cmp(&b.id))
        });
        let turn_order: Vec<String> = order.into_iter().map(|p| p.id.clone()).collect();

        staged.turn_order = turn_order.clone();
        staged.current_turn = 0;
        staged.turn_number = 1;
        staged.phase = BattlePhase::Active;

        let mut bus = EventBus::new();
        bus.push(BattleEvent::BattleStarted {
            turn_order: turn_order.clone(),
        });
        info!(battle = %staged.battle_id, ?turn_order, "Battle started");
        self.commit(staged, bus);
        Ok(())
    }

    /// A defeated or stunned actor loses the turn: the failed result, plus
    /// the event explaining a stun.
    fn lost_turn(&self, actor: &BattleParticipant, commands: &mut Vec<BattleCommand>) -> Option<BattleResult> {
        if actor.is_defeated() {
            debug!(actor = %actor.id, "Defeated participant cannot act");
            return Some(BattleResult::failed("defeated", "is too exhausted to act!"));
        }
        if actor.stats.has_modifier(ModifierType::Stun) {
            commands.insert(
                0,
                BattleCommand::EmitEvent(BattleEvent::ActionPrevented {
                    actor: actor.id.clone(),
                    reason: ModifierType::Stun,
                }),
            );
            return Some(BattleResult::failed("stunned", "is stunned and cannot act!"));
        }
        None
    }

    fn report_unfair(&self, actor: &str, result: &BattleResult) {
        if let Err(violation) = self.config.fairness.check_result(result, &self.config.base) {
            error!(actor, %violation, "Fairness violation");
        }
    }

    /// Apply a turn's commands, record it in the actor's history and pass
    /// the turn on.
    fn complete_turn(
        &mut self,
        commands: Vec<BattleCommand>,
        mut result: BattleResult,
        action: BattleAction,
        ability: Option<SpecialAbilityType>,
    ) -> EngineResult<BattleResult> {
        let mut staged = self.state.clone();
        let mut bus = EventBus::new();
        let totals = self.run_commands(commands, &mut staged, &mut bus)?;
        if result.success {
            result.damage = totals.damage_dealt;
            result.healing = totals.healing_done;
            result
                .modifiers_applied
                .retain(|modifier| !totals.dropped_modifiers.contains(modifier));
        }

        debug!(
            actor = %action.actor_id,
            action = %action.action_type,
            ?ability,
            success = result.success,
            damage = result.damage,
            healing = result.healing,
            "Turn resolved"
        );

        let turn = staged.turn_number;
        if let Some(actor) = staged.participant_mut(&action.actor_id) {
            actor.history.push(ActionRecord {
                turn,
                action,
                result: result.clone(),
                ability,
            });
        }
        staged.advance_turn();

        self.commit(staged, bus);
        Ok(result)
    }

    /// Resolve and apply one action on behalf of `requesting_participant`.
    ///
    /// An empty `actor_id` is filled in with the requester. A stunned or
    /// defeated actor gets an unsuccessful result and still uses up the turn.
    /// An action that finishes a combo carries the combo's bonus, capped
    /// together with everything else.
    pub fn perform_action(
        &mut self,
        mut action: BattleAction,
        requesting_participant: &str,
    ) -> EngineResult<BattleResult> {
        self.require_phase(BattlePhase::Active)?;
        let actor = self.require_participant(requesting_participant)?;

        if action.actor_id.is_empty() {
            action.actor_id = requesting_participant.to_string();
        } else if action.actor_id != requesting_participant {
            return Err(ActionError::ActorMismatch {
                requester: requesting_participant.to_string(),
                actor: action.actor_id,
            }
            .into());
        }

        let target_id = action.target_or_actor().to_string();
        let Some(target) = self.state.participant(&target_id) else {
            return Err(ActionError::UnknownTarget(target_id).into());
        };

        let mut commands = turn_start_commands(&action.actor_id);
        let result = match self.lost_turn(actor, &mut commands) {
            Some(lost) => lost,
            None => {
                let provider = self
                    .gift_provider
                    .as_deref()
                    .map(|provider| provider as &dyn GiftProvider);
                let item_effect = action.item_used.as_deref().and_then(|gift_id| {
                    resolve_item_effect(provider, gift_id, action.action_type)
                        .map(|effect| (gift_id, effect))
                });
                let equipment = self.equipment.stat_bonuses(&action.actor_id);
                let combo = completing_combo(&actor.combo_chain, action.action_type);

                let mut resolution = resolve_action(&ResolveContext {
                    action: &action,
                    actor: &actor.stats,
                    target: &target.stats,
                    equipment: &equipment,
                    item: item_effect.as_ref().map(|(gift_id, effect)| (*gift_id, effect)),
                    bonus: combo.map(combo_bonus),
                    config: &self.config,
                });
                if let Some(combo) = combo {
                    apply_combo_flourish(&mut resolution.result, combo);
                }
                self.report_unfair(&action.actor_id, &resolution.result);

                commands.insert(
                    0,
                    BattleCommand::EmitEvent(BattleEvent::ActionPerformed {
                        actor: action.actor_id.clone(),
                        action: action.action_type,
                        target: target_id.clone(),
                        item: item_effect.as_ref().map(|(gift_id, _)| gift_id.to_string()),
                    }),
                );
                commands.extend(resolution.commands);
                resolution.result
            }
        };

        commands.push(BattleCommand::TrackCombo {
            target: action.actor_id.clone(),
            action: result.success.then_some(action.action_type),
        });
        self.complete_turn(commands, result, action, None)
    }

    /// Use a learned special ability. Takes the turn like an ordinary action.
    ///
    /// `target` only matters for abilities aimed at an opponent; the rest
    /// always affect the actor. An ability that is not ready is an error and
    /// leaves the turn untouched.
    pub fn use_special_ability(
        &mut self,
        ability: SpecialAbilityType,
        requesting_participant: &str,
        target: Option<&str>,
    ) -> EngineResult<BattleResult> {
        self.require_phase(BattlePhase::Active)?;
        let actor = self.require_participant(requesting_participant)?;
        let slot = actor.ability(ability).ok_or_else(|| AbilityError::NotLearned {
            participant: requesting_participant.to_string(),
            ability,
        })?;
        slot.check_ready()?;

        let mut action = BattleAction::new(ability.base_action(), requesting_participant);
        if let Some(target) = target.filter(|_| ability.base_action().is_offensive()) {
            action = action.with_target(target);
        }
        let target_id = action.target_or_actor().to_string();
        let Some(target) = self.state.participant(&target_id) else {
            return Err(ActionError::UnknownTarget(target_id).into());
        };

        let mut commands = turn_start_commands(requesting_participant);
        let result = match self.lost_turn(actor, &mut commands) {
            Some(lost) => lost,
            None => {
                let equipment = self.equipment.stat_bonuses(requesting_participant);
                let resolution = resolve_special_ability(
                    ability,
                    &ResolveContext {
                        action: &action,
                        actor: &actor.stats,
                        target: &target.stats,
                        equipment: &equipment,
                        item: None,
                        bonus: Some(ability_bonus(ability)),
                        config: &self.config,
                    },
                );
                self.report_unfair(requesting_participant, &resolution.result);
                info!(actor = requesting_participant, %ability, target = %target_id, "Special ability used");

                commands.insert(
                    0,
                    BattleCommand::EmitEvent(BattleEvent::AbilityUsed {
                        actor: requesting_participant.to_string(),
                        ability,
                        target: target_id.clone(),
                    }),
                );
                commands.extend(resolution.commands);
                commands.push(BattleCommand::StartCooldown {
                    target: requesting_participant.to_string(),
                    ability,
                });
                resolution.result
            }
        };

        commands.push(BattleCommand::TrackCombo {
            target: requesting_participant.to_string(),
            action: None,
        });
        self.complete_turn(commands, result, action, Some(ability))
    }

    /// Use a consumable from the participant's loadout. Does not use up a turn.
    pub fn use_consumable(
        &mut self,
        participant_id: &str,
        equipment_id: &str,
    ) -> EngineResult<BattleResult> {
        self.require_phase(BattlePhase::Active)?;
        if self.require_participant(participant_id)?.is_defeated() {
            return Err(ActionError::ParticipantDefeated(participant_id.to_string()).into());
        }

        let item_name = self
            .equipment
            .equipment_info(equipment_id)
            .map(|item| item.name.clone())
            .unwrap_or_else(|_| equipment_id.to_string());
        let mut result = self.equipment.use_consumable(participant_id, equipment_id)?;

        let mut commands = vec![BattleCommand::EmitEvent(BattleEvent::ConsumableUsed {
            participant: participant_id.to_string(),
            item_name,
        })];
        if result.healing > 0.0 {
            commands.push(BattleCommand::HealParticipant {
                target: participant_id.to_string(),
                amount: result.healing,
            });
        }
        for modifier in result.modifiers_applied.iter().filter(|m| m.is_lasting()) {
            commands.push(BattleCommand::AddModifier {
                target: participant_id.to_string(),
                modifier: modifier.clone(),
            });
        }

        let mut staged = self.state.clone();
        let mut bus = EventBus::new();
        let totals = self.run_commands(commands, &mut staged, &mut bus)?;
        result.healing = totals.healing_done;
        result
            .modifiers_applied
            .retain(|modifier| !totals.dropped_modifiers.contains(modifier));

        self.commit(staged, bus);
        Ok(result)
    }

    /// Finish the battle, wear down everyone's equipment and report the winner.
    pub fn end_battle(&mut self) -> EngineResult<Option<String>> {
        self.require_phase(BattlePhase::Active)?;

        let mut staged = self.state.clone();
        let mut bus = EventBus::new();
        let ids: Vec<String> = staged.participants.keys().cloned().collect();
        for participant_id in ids {
            if self.equipment.loadout(&participant_id).is_none() {
                continue;
            }
            for equipment_id in self.equipment.damage_equipment(&participant_id)? {
                bus.push(BattleEvent::EquipmentBroken {
                    participant: participant_id.clone(),
                    equipment_id,
                });
            }
        }

        staged.phase = BattlePhase::Ended;
        let winner = staged.winner().map(str::to_string);
        bus.push(BattleEvent::BattleEnded {
            winner: winner.clone(),
        });
        info!(battle = %staged.battle_id, ?winner, turns = staged.turn_number, "Battle ended");

        self.commit(staged, bus);
        Ok(winner)
    }

    /// Every action type while the battle is active, nothing otherwise.
    pub fn available_actions(&self) -> Vec<ActionType> {
        if self.state.phase == BattlePhase::Active {
            ActionType::iter().collect()
        } else {
            Vec::new()
        }
    }

    pub fn current_turn_participant(&self) -> Option<&str> {
        self.state.current_turn_participant()
    }

    pub fn is_participant_defeated(&self, participant_id: &str) -> EngineResult<bool> {
        Ok(self.require_participant(participant_id)?.is_defeated())
    }

    pub fn winner(&self) -> Option<&str> {
        self.state.winner()
    }
}

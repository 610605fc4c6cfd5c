use crate::participant::{BattleModifier, BattleParticipant};
use schema::{ActionType, BattlePhase, ComboType, ModifierType, SpecialAbilityType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A requested action. Transient: built by a caller or the AI and consumed by the engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleAction {
    pub action_type: ActionType,
    pub actor_id: String,
    /// `None` (or an empty id) targets the actor.
    pub target_id: Option<String>,
    /// Gift id to use alongside the action.
    pub item_used: Option<String>,
}

impl BattleAction {
    pub fn new(action_type: ActionType, actor_id: impl Into<String>) -> Self {
        Self {
            action_type,
            actor_id: actor_id.into(),
            target_id: None,
            item_used: None,
        }
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_item(mut self, gift_id: impl Into<String>) -> Self {
        self.item_used = Some(gift_id.into());
        self
    }

    pub fn target_or_actor(&self) -> &str {
        match self.target_id.as_deref() {
            Some(target) if !target.is_empty() => target,
            _ => &self.actor_id,
        }
    }
}

/// The outcome of one action or consumable. Never modified after it is returned.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleResult {
    pub success: bool,
    pub damage: f64,
    pub healing: f64,
    /// Every modifier that shaped this result, including instantaneous ones.
    pub modifiers_applied: Vec<BattleModifier>,
    pub animation: String,
    pub response: String,
    pub status_effects: Vec<String>,
}

impl BattleResult {
    pub fn new(animation: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            success: true,
            damage: 0.0,
            healing: 0.0,
            modifiers_applied: Vec::new(),
            animation: animation.into(),
            response: response.into(),
            status_effects: Vec::new(),
        }
    }

    pub fn failed(animation: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::new(animation, response)
        }
    }

    /// Lasting modifiers of a given type carried by this result.
    pub fn lasting_modifiers(&self, modifier_type: ModifierType) -> impl Iterator<Item = &BattleModifier> {
        self.modifiers_applied
            .iter()
            .filter(move |m| m.modifier_type == modifier_type && m.is_lasting())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Lifecycle
    BattleStarted {
        turn_order: Vec<String>,
    },
    BattleEnded {
        winner: Option<String>,
    },

    // Actions
    ActionPerformed {
        actor: String,
        action: ActionType,
        target: String,
        item: Option<String>,
    },
    ActionPrevented {
        actor: String,
        reason: ModifierType,
    },
    ConsumableUsed {
        participant: String,
        item_name: String,
    },
    AbilityUsed {
        actor: String,
        ability: SpecialAbilityType,
        target: String,
    },
    ComboCompleted {
        actor: String,
        combo: ComboType,
    },

    // Damage and healing
    DamageDealt {
        target: String,
        damage: f64,
        remaining_hp: f64,
    },
    DamageAbsorbed {
        target: String,
        amount: f64,
    },
    Healed {
        target: String,
        amount: f64,
        new_hp: f64,
    },
    ParticipantDefeated {
        participant: String,
    },

    // Modifiers
    ModifierAdded {
        target: String,
        modifier: BattleModifier,
    },
    ModifierDropped {
        target: String,
        modifier: BattleModifier,
    },
    ModifierExpired {
        target: String,
        modifier: BattleModifier,
    },
    ModifierRemoved {
        target: String,
        modifier: BattleModifier,
    },

    // Equipment
    EquipmentBroken {
        participant: String,
        equipment_id: String,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::BattleStarted { turn_order } => {
                Some(format!("The battle begins! Turn order: {}", turn_order.join(", ")))
            }
            BattleEvent::BattleEnded { winner } => match winner {
                Some(winner) => Some(format!("The battle is over. {} wins!", winner)),
                None => Some("The battle is over. Nobody is left standing.".to_string()),
            },
            BattleEvent::ActionPerformed {
                actor,
                action,
                target,
                item,
            } => {
                let mut text = format!("{} {}", actor, action.response_text());
                if target != actor {
                    text.push_str(&format!(" (target: {})", target));
                }
                if let Some(item) = item {
                    text.push_str(&format!(" [{}]", item));
                }
                Some(text)
            }
            BattleEvent::ActionPrevented { actor, reason } => match reason {
                ModifierType::Stun => Some(format!("{} is stunned and cannot act!", actor)),
                other => Some(format!("{} cannot act ({})!", actor, other)),
            },
            BattleEvent::ConsumableUsed {
                participant,
                item_name,
            } => Some(format!("{} uses {}!", participant, item_name)),
            BattleEvent::AbilityUsed {
                actor,
                ability,
                target,
            } => {
                let mut text = format!("{} {}", actor, ability.response_text());
                if target != actor {
                    text.push_str(&format!(" (target: {})", target));
                }
                Some(text)
            }
            BattleEvent::ComboCompleted { actor, combo } => {
                Some(format!("COMBO! {} lands {}!", actor, combo.name()))
            }
            BattleEvent::DamageDealt { target, damage, .. } => {
                Some(format!("{} took {:.1} damage!", target, damage))
            }
            BattleEvent::DamageAbsorbed { target, amount } => {
                Some(format!("{}'s barrier absorbed {:.1} damage!", target, amount))
            }
            BattleEvent::Healed { target, amount, .. } => {
                Some(format!("{} recovered {:.1} HP!", target, amount))
            }
            BattleEvent::ParticipantDefeated { participant } => {
                Some(format!("{} is defeated!", participant))
            }
            BattleEvent::ModifierAdded { .. } => {
                None // Silent - the action text already says what happened
            }
            BattleEvent::ModifierDropped { target, modifier } => Some(format!(
                "{} cannot hold any more effects; {} was lost.",
                target, modifier.source
            )),
            BattleEvent::ModifierExpired { target, modifier } => Some(format!(
                "{}'s {} effect wore off.",
                target, modifier.modifier_type
            )),
            BattleEvent::ModifierRemoved { target, modifier } => Some(format!(
                "{}'s {} effect was removed.",
                target, modifier.modifier_type
            )),
            BattleEvent::EquipmentBroken {
                participant,
                equipment_id,
            } => Some(format!("{}'s {} broke!", participant, equipment_id)),
        }
    }
}

/// Ordered log of everything that happened in a battle.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Remove and return every event recorded so far.
    pub fn take(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            if let Some(formatted) = event.format() {
                writeln!(f, "{}", formatted)?;
            }
        }
        Ok(())
    }
}

/// The authoritative record of one battle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleState {
    pub battle_id: String,
    pub phase: BattlePhase,
    pub participants: BTreeMap<String, BattleParticipant>,
    /// Fixed when the battle starts: fastest first.
    pub turn_order: Vec<String>,
    pub current_turn: usize,
    pub turn_number: u32,
}

impl BattleState {
    pub fn new(battle_id: impl Into<String>) -> Self {
        Self {
            battle_id: battle_id.into(),
            phase: BattlePhase::Setup,
            participants: BTreeMap::new(),
            turn_order: Vec::new(),
            current_turn: 0,
            turn_number: 1,
        }
    }

    pub fn participant(&self, participant_id: &str) -> Option<&BattleParticipant> {
        self.participants.get(participant_id)
    }

    pub fn participant_mut(&mut self, participant_id: &str) -> Option<&mut BattleParticipant> {
        self.participants.get_mut(participant_id)
    }

    pub fn current_turn_participant(&self) -> Option<&str> {
        self.turn_order.get(self.current_turn).map(String::as_str)
    }

    pub fn advance_turn(&mut self) {
        if self.turn_order.is_empty() {
            return;
        }
        self.current_turn = (self.current_turn + 1) % self.turn_order.len();
        if self.current_turn == 0 {
            self.turn_number += 1;
        }
    }

    /// Everyone other than `participant_id` who is still standing.
    pub fn opponents_of<'a>(
        &'a self,
        participant_id: &'a str,
    ) -> impl Iterator<Item = &'a BattleParticipant> + 'a {
        self.participants
            .values()
            .filter(move |p| p.id != participant_id && !p.is_defeated())
    }

    pub fn living_participants(&self) -> impl Iterator<Item = &BattleParticipant> {
        self.participants.values().filter(|p| !p.is_defeated())
    }

    /// The sole survivor of a finished battle.
    pub fn winner(&self) -> Option<&str> {
        if self.phase != BattlePhase::Ended {
            return None;
        }
        let mut living = self.living_participants();
        match (living.next(), living.next()) {
            (Some(winner), None) => Some(winner.id.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::BattleStats;
    use pretty_assertions::assert_eq;

    fn state_with(ids: &[&str]) -> BattleState {
        let mut state = BattleState::new("test");
        for id in ids {
            state.participants.insert(
                id.to_string(),
                BattleParticipant::new(*id, false, BattleStats::new(100.0, 10.0, 10.0, 10.0)),
            );
            state.turn_order.push(id.to_string());
        }
        state
    }

    #[test]
    fn test_empty_target_means_actor() {
        let action = BattleAction::new(ActionType::Heal, "mochi").with_target("");
        assert_eq!(action.target_or_actor(), "mochi");

        let action = BattleAction::new(ActionType::Attack, "mochi").with_target("biscuit");
        assert_eq!(action.target_or_actor(), "biscuit");
    }

    #[test]
    fn test_turn_pointer_wraps_and_counts_rounds() {
        let mut state = state_with(&["a", "b"]);

        assert_eq!(state.current_turn_participant(), Some("a"));
        state.advance_turn();
        assert_eq!(state.current_turn_participant(), Some("b"));
        state.advance_turn();
        assert_eq!(state.current_turn_participant(), Some("a"));
        assert_eq!(state.turn_number, 2);
    }

    #[test]
    fn test_winner_only_once_ended_with_one_survivor() {
        let mut state = state_with(&["a", "b"]);
        if let Some(b) = state.participant_mut("b") {
            b.stats.hp = 0.0;
        }
        assert_eq!(state.winner(), None);

        state.phase = BattlePhase::Ended;
        assert_eq!(state.winner(), Some("a"));

        if let Some(a) = state.participant_mut("a") {
            a.stats.hp = 0.0;
        }
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_event_formatting() {
        let performed = BattleEvent::ActionPerformed {
            actor: "mochi".to_string(),
            action: ActionType::Attack,
            target: "biscuit".to_string(),
            item: Some("damage_potion".to_string()),
        };
        assert_eq!(
            performed.format(),
            Some("mochi attacks with determination! (target: biscuit) [damage_potion]".to_string())
        );

        let stunned = BattleEvent::ActionPrevented {
            actor: "biscuit".to_string(),
            reason: ModifierType::Stun,
        };
        assert_eq!(stunned.format(), Some("biscuit is stunned and cannot act!".to_string()));

        let added = BattleEvent::ModifierAdded {
            target: "mochi".to_string(),
            modifier: BattleModifier::new(ModifierType::Defense, 0.5, 1, "defend_action"),
        };
        assert_eq!(added.format(), None);
    }
}

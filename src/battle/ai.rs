//! Automated opponents: action choice by strategy and item selection by difficulty.

use crate::battle::state::{BattleAction, BattleState};
use crate::gifts::{GiftDefinition, SharedGiftProvider};
use crate::participant::BattleParticipant;
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{ActionType, AiDifficulty, AiStrategy, ModifierType, StatCategory};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// Time a participant normally has to choose an action.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);
/// Below this much remaining time the AI stops deliberating.
pub const AI_EMERGENCY_TIMEOUT: Duration = Duration::from_secs(5);

const RECENT_ACTION_MEMORY: usize = 3;

/// A trait for any system that can decide on a battle action.
pub trait Behavior {
    /// Inspects the battle state and decides on the next action for the participant it drives.
    fn decide_action(&mut self, state: &BattleState) -> BattleAction;
}

pub struct BattleAi<R: Rng = StdRng> {
    character_id: String,
    difficulty: AiDifficulty,
    strategy: AiStrategy,
    gift_provider: Option<SharedGiftProvider>,
    recent_actions: VecDeque<ActionType>,
    rng: R,
}

impl BattleAi<StdRng> {
    pub fn new(character_id: impl Into<String>, difficulty: AiDifficulty, strategy: AiStrategy) -> Self {
        Self::with_rng(character_id, difficulty, strategy, StdRng::from_os_rng())
    }

    /// Deterministic AI for replays and tests.
    pub fn seeded(
        character_id: impl Into<String>,
        difficulty: AiDifficulty,
        strategy: AiStrategy,
        seed: u64,
    ) -> Self {
        Self::with_rng(character_id, difficulty, strategy, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> BattleAi<R> {
    pub fn with_rng(
        character_id: impl Into<String>,
        difficulty: AiDifficulty,
        strategy: AiStrategy,
        rng: R,
    ) -> Self {
        Self {
            character_id: character_id.into(),
            difficulty,
            strategy,
            gift_provider: None,
            recent_actions: VecDeque::with_capacity(RECENT_ACTION_MEMORY),
            rng,
        }
    }

    pub fn with_gift_provider(mut self, provider: SharedGiftProvider) -> Self {
        self.gift_provider = Some(provider);
        self
    }

    pub fn character_id(&self) -> &str {
        &self.character_id
    }

    pub fn difficulty(&self) -> AiDifficulty {
        self.difficulty
    }

    pub fn strategy(&self) -> AiStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: AiStrategy) {
        self.strategy = strategy;
    }

    /// Choose the next action, deliberating only if there is time to.
    pub fn select_action(&mut self, state: &BattleState, time_remaining: Duration) -> BattleAction {
        if time_remaining < AI_EMERGENCY_TIMEOUT {
            return self.select_quick_action(state);
        }

        let threat = self.assess_threat(state);
        let opportunity = self.assess_opportunity(state);
        let action = self.select_strategic_action(state, threat, opportunity);
        let action = self.enhance_action_with_item(action);

        debug!(
            ai = %self.character_id,
            strategy = %self.strategy,
            threat,
            opportunity,
            action = %action.action_type,
            item = ?action.item_used,
            "AI chose action"
        );
        self.remember(action.action_type);
        action
    }

    /// Whether the AI should act without waiting out its turn timer.
    pub fn should_act_immediately(&mut self, state: &BattleState) -> bool {
        let Some(me) = state.participant(&self.character_id) else {
            return true;
        };
        if me.stats.hp_ratio() < 0.2 {
            return true;
        }
        if self
            .others(state)
            .any(|opponent| opponent.stats.has_modifier(ModifierType::Stun))
        {
            return true;
        }
        self.rng.random::<f64>() < self.difficulty.quick_reaction_chance()
    }

    /// The highest scoring available gift for `action_type`, if any scores above zero.
    pub fn select_best_item(&self, action_type: ActionType) -> Option<String> {
        let provider = self.gift_provider.as_ref()?;
        provider
            .available_gifts()
            .into_iter()
            .map(|gift| (OrderedFloat(self.calculate_item_score(&gift, action_type)), gift.id))
            .filter(|(score, _)| score.0 > 0.0)
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, id)| id)
    }

    /// How much a gift would help `action_type`. Zero means "don't bother".
    pub fn calculate_item_score(&self, gift: &GiftDefinition, action_type: ActionType) -> f64 {
        let Some(effect) = &gift.battle_effect else {
            return 0.0;
        };
        if !effect.applies_to(action_type) {
            return 0.0;
        }

        // Actions without a stat category lean on speed.
        let (category, weight) = match action_type.category() {
            Some(StatCategory::Speed) | None => (StatCategory::Speed, 50.0),
            Some(category) => (category, 100.0),
        };
        let modifier = match effect.modifier_for(category) {
            Some(value) if value > 1.0 => value,
            _ => return 0.0,
        };

        let mut score = (modifier - 1.0) * weight;
        if effect.duration > 0 {
            score += f64::from(effect.duration) * 10.0;
        }
        if effect.consumable {
            score *= self.difficulty.consumable_penalty();
        }
        score
    }

    /// Attach the best item to `action` with the difficulty's usage probability.
    pub fn enhance_action_with_item(&mut self, mut action: BattleAction) -> BattleAction {
        if self.rng.random::<f64>() >= self.difficulty.item_usage_chance() {
            return action;
        }
        if let Some(item) = self.select_best_item(action.action_type) {
            action.item_used = Some(item);
        }
        action
    }

    fn action(&self, action_type: ActionType) -> BattleAction {
        BattleAction::new(action_type, self.character_id.as_str())
    }

    fn targeted(&self, action_type: ActionType, state: &BattleState) -> BattleAction {
        let action = self.action(action_type);
        match self.select_target(state) {
            Some(target) => action.with_target(target),
            None => action,
        }
    }

    fn select_quick_action(&self, state: &BattleState) -> BattleAction {
        match state.participant(&self.character_id) {
            Some(me) if me.stats.hp_ratio() < 0.3 => self.action(ActionType::Heal),
            _ => self.targeted(ActionType::Attack, state),
        }
    }

    fn select_strategic_action(&mut self, state: &BattleState, threat: f64, opportunity: f64) -> BattleAction {
        let Some(me) = state.participant(&self.character_id) else {
            return self.select_quick_action(state);
        };
        let hp_ratio = me.stats.hp_ratio();
        if hp_ratio < 0.25 {
            return self.action(ActionType::Heal);
        }

        match self.strategy {
            AiStrategy::Aggressive => self.select_aggressive_action(state, threat, opportunity),
            AiStrategy::Defensive => self.select_defensive_action(state, threat),
            AiStrategy::Support => self.select_support_action(state, hp_ratio, threat, opportunity),
            AiStrategy::Balanced => self.select_balanced_action(state, hp_ratio, threat, opportunity),
        }
    }

    fn select_aggressive_action(&mut self, state: &BattleState, threat: f64, opportunity: f64) -> BattleAction {
        if opportunity > 0.7 {
            if !self.used_recently(ActionType::Charge) {
                return self.action(ActionType::Charge);
            }
            return self.targeted(ActionType::Attack, state);
        }

        if threat > 0.5 {
            const VARIED: [ActionType; 4] = [
                ActionType::Attack,
                ActionType::Stun,
                ActionType::Drain,
                ActionType::Taunt,
            ];
            let pick = VARIED[self.rng.random_range(0..VARIED.len())];
            return self.targeted(pick, state);
        }

        self.targeted(ActionType::Attack, state)
    }

    fn select_defensive_action(&self, state: &BattleState, threat: f64) -> BattleAction {
        if threat > 0.6 {
            if !self.used_recently(ActionType::Shield) {
                return self.action(ActionType::Shield);
            }
            if !self.used_recently(ActionType::Defend) {
                return self.action(ActionType::Defend);
            }
            return self.action(ActionType::Evade);
        }

        if threat > 0.3 {
            return self.targeted(ActionType::Stun, state);
        }

        self.action(ActionType::Counter)
    }

    fn select_support_action(
        &self,
        state: &BattleState,
        hp_ratio: f64,
        threat: f64,
        opportunity: f64,
    ) -> BattleAction {
        if hp_ratio < 0.8 {
            return self.action(ActionType::Heal);
        }
        if opportunity > 0.4 && !self.used_recently(ActionType::Boost) {
            return self.action(ActionType::Boost);
        }
        if threat > 0.5 && !self.used_recently(ActionType::Shield) {
            return self.action(ActionType::Shield);
        }
        self.targeted(ActionType::Drain, state)
    }

    fn select_balanced_action(
        &self,
        state: &BattleState,
        hp_ratio: f64,
        threat: f64,
        opportunity: f64,
    ) -> BattleAction {
        if hp_ratio < 0.5 && !self.used_recently(ActionType::Heal) {
            return self.action(ActionType::Heal);
        }

        if threat > opportunity {
            if threat > 0.7 {
                return self.action(ActionType::Defend);
            }
            return self.targeted(ActionType::Stun, state);
        }

        if opportunity > 0.6 && !self.used_recently(ActionType::Boost) {
            return self.action(ActionType::Boost);
        }

        self.targeted(ActionType::Attack, state)
    }

    fn others<'a>(&'a self, state: &'a BattleState) -> impl Iterator<Item = &'a BattleParticipant> + 'a {
        state
            .participants
            .values()
            .filter(move |participant| participant.id != self.character_id)
    }

    /// Danger from opponents, in `[0, 1]`.
    pub fn assess_threat(&self, state: &BattleState) -> f64 {
        let Some(me) = state.participant(&self.character_id) else {
            return 0.5;
        };

        let mut threat = (1.0 - me.stats.hp_ratio()) * 0.4;
        for opponent in self.others(state) {
            threat += opponent.stats.hp_ratio() * 0.3;
            threat += 0.2 * opponent.stats.modifiers_of(ModifierType::Damage).count() as f64;
        }
        threat += me
            .stats
            .modifiers
            .iter()
            .filter(|m| matches!(m.modifier_type, ModifierType::Stun | ModifierType::Defense))
            .map(|m| 0.1 * f64::from(m.duration))
            .sum::<f64>();

        threat.clamp(0.0, 1.0)
    }

    /// How promising an offensive move looks, in `[0, 1]`.
    pub fn assess_opportunity(&self, state: &BattleState) -> f64 {
        let Some(me) = state.participant(&self.character_id) else {
            return 0.5;
        };

        let mut opportunity = me.stats.hp_ratio() * 0.3;
        opportunity += 0.2
            * me
                .stats
                .modifiers
                .iter()
                .filter(|m| matches!(m.modifier_type, ModifierType::Damage | ModifierType::Shield))
                .count() as f64;
        for opponent in self.others(state) {
            opportunity += (1.0 - opponent.stats.hp_ratio()) * 0.3;
            opportunity += 0.3 * opponent.stats.modifiers_of(ModifierType::Stun).count() as f64;
        }

        opportunity.clamp(0.0, 1.0)
    }

    /// The living opponent with the least HP, ties going to the lowest id.
    pub fn select_target(&self, state: &BattleState) -> Option<String> {
        state
            .opponents_of(&self.character_id)
            .min_by_key(|opponent| OrderedFloat(opponent.stats.hp))
            .map(|opponent| opponent.id.clone())
    }

    fn used_recently(&self, action_type: ActionType) -> bool {
        self.recent_actions.contains(&action_type)
    }

    fn remember(&mut self, action_type: ActionType) {
        if self.recent_actions.len() == RECENT_ACTION_MEMORY {
            self.recent_actions.pop_front();
        }
        self.recent_actions.push_back(action_type);
    }
}

impl<R: Rng> Behavior for BattleAi<R> {
    fn decide_action(&mut self, state: &BattleState) -> BattleAction {
        self.select_action(state, DEFAULT_TURN_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::ai::{Behavior, BattleAi, AI_EMERGENCY_TIMEOUT, DEFAULT_TURN_TIMEOUT};
    use crate::battle::state::{BattleAction, BattleState};
    use crate::battle::tests::common::{create_test_battle, shared_gifts, TestParticipantBuilder};
    use crate::participant::BattleModifier;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;
    use schema::{ActionType, AiDifficulty, AiStrategy, ModifierType};
    use std::time::Duration;

    const TRIALS: usize = 400;

    fn duel_state(my_hp: f64, opponent_hp: f64) -> BattleState {
        create_test_battle(
            vec![
                TestParticipantBuilder::new("mochi").with_hp(my_hp).build(),
                TestParticipantBuilder::new("biscuit").with_hp(opponent_hp).build(),
            ],
            None,
        )
        .state()
        .clone()
    }

    fn usage_rate(difficulty: AiDifficulty, seed: u64) -> f64 {
        let mut ai = BattleAi::with_rng("mochi", difficulty, AiStrategy::Aggressive, StdRng::seed_from_u64(seed))
            .with_gift_provider(shared_gifts());
        let used = (0..TRIALS)
            .filter(|_| {
                let action = BattleAction::new(ActionType::Attack, "mochi").with_target("biscuit");
                ai.enhance_action_with_item(action).item_used.is_some()
            })
            .count();
        used as f64 / TRIALS as f64
    }

    #[rstest]
    #[case(1)]
    #[case(42)]
    #[case(2024)]
    fn test_item_usage_rises_with_difficulty(#[case] seed: u64) {
        // Act
        let easy = usage_rate(AiDifficulty::Easy, seed);
        let normal = usage_rate(AiDifficulty::Normal, seed);
        let expert = usage_rate(AiDifficulty::Expert, seed);

        // Assert
        assert!(easy <= 0.3, "easy used items {:.0}% of the time", easy * 100.0);
        assert!(expert >= 0.5, "expert used items {:.0}% of the time", expert * 100.0);
        assert!(easy < normal && normal < expert);
    }

    #[test]
    fn test_emergency_heals_when_low() {
        let state = duel_state(20.0, 100.0);
        let mut ai = BattleAi::seeded("mochi", AiDifficulty::Normal, AiStrategy::Aggressive, 5);

        let action = ai.select_action(&state, Duration::from_secs(2));

        assert_eq!(action, BattleAction::new(ActionType::Heal, "mochi"));
    }

    #[test]
    fn test_emergency_attacks_the_weakest_opponent() {
        // Arrange
        let state = create_test_battle(
            vec![
                TestParticipantBuilder::new("mochi").build(),
                TestParticipantBuilder::new("biscuit").with_hp(60.0).build(),
                TestParticipantBuilder::new("pudding").with_hp(30.0).build(),
                TestParticipantBuilder::new("almond").with_hp(0.0).build(),
            ],
            None,
        )
        .state()
        .clone();
        let mut ai = BattleAi::seeded("mochi", AiDifficulty::Normal, AiStrategy::Defensive, 5);

        // Act
        let action = ai.select_action(&state, AI_EMERGENCY_TIMEOUT - Duration::from_millis(1));

        // Assert
        assert_eq!(action.action_type, ActionType::Attack);
        assert_eq!(action.target_id.as_deref(), Some("pudding"));
    }

    #[rstest]
    #[case(AiStrategy::Aggressive)]
    #[case(AiStrategy::Defensive)]
    #[case(AiStrategy::Balanced)]
    #[case(AiStrategy::Support)]
    fn test_critical_health_overrides_strategy(#[case] strategy: AiStrategy) {
        let state = duel_state(20.0, 100.0);
        let mut ai = BattleAi::seeded("mochi", AiDifficulty::Hard, strategy, 9);

        let action = ai.decide_action(&state);

        assert_eq!(action.action_type, ActionType::Heal);
    }

    #[test]
    fn test_defensive_ai_rotates_under_pressure() {
        // Arrange: low HP and a buffed opponent push threat above 0.6.
        let mut state = duel_state(30.0, 100.0);
        if let Some(biscuit) = state.participant_mut("biscuit") {
            biscuit
                .stats
                .modifiers
                .push(BattleModifier::new(ModifierType::Damage, 1.15, 3, "boost_action"));
        }
        let mut ai = BattleAi::seeded("mochi", AiDifficulty::Easy, AiStrategy::Defensive, 3);
        assert!(ai.assess_threat(&state) > 0.6);

        // Act
        let choices: Vec<ActionType> = (0..3)
            .map(|_| ai.select_action(&state, DEFAULT_TURN_TIMEOUT).action_type)
            .collect();

        // Assert
        assert_eq!(choices, vec![ActionType::Shield, ActionType::Defend, ActionType::Evade]);
    }

    #[test]
    fn test_support_ai_heals_below_eighty_percent() {
        let state = duel_state(70.0, 100.0);
        let mut ai = BattleAi::seeded("mochi", AiDifficulty::Normal, AiStrategy::Support, 4);

        let action = ai.decide_action(&state);

        assert_eq!(action.action_type, ActionType::Heal);
        assert_eq!(action.target_id, None);
    }

    #[test]
    fn test_scores_stay_in_unit_range() {
        let mut state = duel_state(5.0, 1.0);
        if let Some(biscuit) = state.participant_mut("biscuit") {
            for source in ["a", "b", "c"] {
                biscuit
                    .stats
                    .modifiers
                    .push(BattleModifier::new(ModifierType::Stun, 1.0, 2, source));
            }
        }
        let ai = BattleAi::seeded("mochi", AiDifficulty::Normal, AiStrategy::Balanced, 1);

        let threat = ai.assess_threat(&state);
        let opportunity = ai.assess_opportunity(&state);

        assert!((0.0..=1.0).contains(&threat));
        assert!((0.0..=1.0).contains(&opportunity));
    }

    #[test]
    fn test_acts_immediately_when_opponent_is_stunned() {
        let mut state = duel_state(100.0, 100.0);
        if let Some(biscuit) = state.participant_mut("biscuit") {
            biscuit
                .stats
                .modifiers
                .push(BattleModifier::new(ModifierType::Stun, 1.0, 1, "stun_action"));
        }
        let mut ai = BattleAi::seeded("mochi", AiDifficulty::Easy, AiStrategy::Balanced, 8);

        assert!(ai.should_act_immediately(&state));
    }

    #[test]
    fn test_quick_reaction_rate_follows_difficulty() {
        let state = duel_state(100.0, 100.0);
        let mut easy = BattleAi::seeded("mochi", AiDifficulty::Easy, AiStrategy::Balanced, 21);
        let mut expert = BattleAi::seeded("mochi", AiDifficulty::Expert, AiStrategy::Balanced, 21);

        let easy_rate = (0..TRIALS).filter(|_| easy.should_act_immediately(&state)).count();
        let expert_rate = (0..TRIALS).filter(|_| expert.should_act_immediately(&state)).count();

        assert!(easy_rate < expert_rate);
    }
}

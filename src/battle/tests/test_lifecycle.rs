#[cfg(test)]
mod tests {
    use crate::battle::state::{BattleAction, BattleEvent};
    use crate::battle::tests::common::{
        assert_close, create_engine, create_test_battle, hp_of, TestParticipantBuilder,
    };
    use crate::errors::{ActionError, BattleEngineError, BattleStateError};
    use pretty_assertions::assert_eq;
    use schema::{ActionType, BattlePhase};

    fn duel() -> crate::battle::engine::BattleEngine {
        create_test_battle(
            vec![
                TestParticipantBuilder::new("mochi").local().with_speed(20.0).build(),
                TestParticipantBuilder::new("biscuit").with_speed(10.0).build(),
            ],
            None,
        )
    }

    #[test]
    fn test_actions_rejected_before_start() {
        // Arrange
        let mut engine = create_engine(None);
        engine
            .add_participant(TestParticipantBuilder::new("mochi").build())
            .expect("setup accepts participants");

        // Act
        let result = engine.perform_action(BattleAction::new(ActionType::Attack, "mochi"), "mochi");

        // Assert
        assert_eq!(
            result,
            Err(BattleEngineError::BattleState(BattleStateError::WrongPhase {
                expected: BattlePhase::Active,
                actual: BattlePhase::Setup,
            }))
        );
        assert!(engine.available_actions().is_empty());
    }

    #[test]
    fn test_roster_validation() {
        let mut engine = create_engine(None);

        assert_eq!(
            engine.start_battle(),
            Err(BattleEngineError::BattleState(BattleStateError::NoParticipants))
        );

        engine
            .add_participant(TestParticipantBuilder::new("mochi").build())
            .expect("first add succeeds");
        assert_eq!(
            engine.add_participant(TestParticipantBuilder::new("mochi").build()),
            Err(BattleEngineError::BattleState(BattleStateError::DuplicateParticipant(
                "mochi".to_string()
            )))
        );

        let overfull = TestParticipantBuilder::new("biscuit").with_hp(150.0).build();
        assert!(matches!(
            engine.add_participant(overfull),
            Err(BattleEngineError::BattleState(BattleStateError::InvalidStats { .. }))
        ));

        engine.start_battle().expect("one participant is enough");
        assert!(matches!(
            engine.add_participant(TestParticipantBuilder::new("pudding").build()),
            Err(BattleEngineError::BattleState(BattleStateError::WrongPhase { .. }))
        ));
    }

    #[test]
    fn test_turn_order_by_speed_then_id() {
        // Arrange
        let engine = create_test_battle(
            vec![
                TestParticipantBuilder::new("slowpoke").with_speed(5.0).build(),
                TestParticipantBuilder::new("zippy").with_speed(30.0).build(),
                TestParticipantBuilder::new("biscuit").with_speed(15.0).build(),
                TestParticipantBuilder::new("almond").with_speed(15.0).build(),
            ],
            None,
        );

        // Assert
        assert_eq!(
            engine.state().turn_order,
            vec!["zippy", "almond", "biscuit", "slowpoke"]
        );
        assert_eq!(engine.current_turn_participant(), Some("zippy"));
        assert_eq!(engine.available_actions().len(), 11);
    }

    #[test]
    fn test_rejected_actions_leave_state_untouched() {
        // Arrange
        let mut engine = duel();
        let before = engine.state().clone();
        let events_before = engine.events().len();

        // Act
        let stranger = engine.perform_action(BattleAction::new(ActionType::Attack, "ghost"), "ghost");
        let impostor = engine.perform_action(
            BattleAction::new(ActionType::Attack, "biscuit").with_target("mochi"),
            "mochi",
        );
        let bad_target = engine.perform_action(
            BattleAction::new(ActionType::Attack, "mochi").with_target("ghost"),
            "mochi",
        );

        // Assert
        assert_eq!(
            stranger,
            Err(BattleEngineError::BattleState(BattleStateError::UnknownParticipant(
                "ghost".to_string()
            )))
        );
        assert_eq!(
            impostor,
            Err(BattleEngineError::Action(ActionError::ActorMismatch {
                requester: "mochi".to_string(),
                actor: "biscuit".to_string(),
            }))
        );
        assert_eq!(
            bad_target,
            Err(BattleEngineError::Action(ActionError::UnknownTarget("ghost".to_string())))
        );
        assert_eq!(engine.state(), &before);
        assert_eq!(engine.events().len(), events_before);
    }

    #[test]
    fn test_empty_actor_is_filled_from_requester() {
        // Arrange
        let mut engine = duel();
        let action = BattleAction::new(ActionType::Attack, "").with_target("biscuit");

        // Act
        let result = engine.perform_action(action, "mochi").expect("action should resolve");

        // Assert
        assert_close(result.damage, 20.0);
        assert_close(hp_of(&engine, "biscuit"), 80.0);
        let recorded = engine
            .state()
            .participant("mochi")
            .and_then(|p| p.last_action())
            .map(|record| record.action.actor_id.clone());
        assert_eq!(recorded, Some("mochi".to_string()));
    }

    #[test]
    fn test_action_advances_turn_and_records_history() {
        // Arrange
        let mut engine = duel();

        // Act
        engine
            .perform_action(BattleAction::new(ActionType::Attack, "mochi").with_target("biscuit"), "mochi")
            .expect("mochi acts");
        engine
            .perform_action(BattleAction::new(ActionType::Attack, "biscuit").with_target("mochi"), "biscuit")
            .expect("biscuit acts");

        // Assert
        let state = engine.state();
        assert_eq!(state.current_turn_participant(), Some("mochi"));
        assert_eq!(state.turn_number, 2);
        let history: Vec<u32> = state
            .participant("biscuit")
            .map(|p| p.history.iter().map(|record| record.turn).collect())
            .unwrap_or_default();
        assert_eq!(history, vec![1]);
    }

    #[test]
    fn test_end_battle_reports_winner_and_wears_equipment() {
        // Arrange
        let mut engine = create_engine(None);
        engine.equipment_mut().initialize_participant_loadout("mochi", 1);
        engine
            .add_participant(TestParticipantBuilder::new("mochi").with_speed(20.0).build())
            .expect("add mochi");
        engine
            .add_participant(TestParticipantBuilder::new("biscuit").with_hp(15.0).build())
            .expect("add biscuit");
        engine.start_battle().expect("start");

        // Act
        engine
            .perform_action(BattleAction::new(ActionType::Attack, "mochi").with_target("biscuit"), "mochi")
            .expect("finishing blow");
        let winner = engine.end_battle().expect("battle was active");

        // Assert
        assert_eq!(winner, Some("mochi".to_string()));
        assert_eq!(engine.winner(), Some("mochi"));
        assert_eq!(engine.is_participant_defeated("biscuit"), Ok(true));
        let durability: Vec<u32> = engine
            .equipment()
            .equipped_items("mochi")
            .iter()
            .map(|item| item.durability)
            .collect();
        assert!(!durability.is_empty());
        assert!(durability.iter().all(|d| *d == 95));
        assert!(matches!(
            engine.events().events().last(),
            Some(BattleEvent::BattleEnded { winner: Some(_) })
        ));

        assert!(matches!(
            engine.end_battle(),
            Err(BattleEngineError::BattleState(BattleStateError::WrongPhase { .. }))
        ));
    }

    #[test]
    fn test_no_winner_while_several_stand() {
        let mut engine = duel();

        let winner = engine.end_battle().expect("battle was active");

        assert_eq!(winner, None);
    }

    #[test]
    fn test_start_applies_equipment_to_stats() {
        // Arrange
        let mut engine = create_engine(None);
        engine.equipment_mut().initialize_participant_loadout("mochi", 1);
        let bonuses = engine.equipment().stat_bonuses("mochi");
        engine
            .add_participant(TestParticipantBuilder::new("mochi").build())
            .expect("add mochi");

        // Act
        engine.start_battle().expect("start");

        // Assert
        let mochi = engine.state().participant("mochi").cloned().expect("mochi is in battle");
        assert_close(mochi.stats.attack, mochi.base_stats.attack * bonuses.attack_multiplier);
        assert_close(mochi.stats.defense, mochi.base_stats.defense * bonuses.defense_multiplier);
        assert!(bonuses.attack_multiplier > 1.0);
    }
}

#[cfg(test)]
mod tests {
    use crate::battle::engine::BattleEngine;
    use crate::battle::state::{BattleAction, BattleEvent};
    use crate::battle::tests::common::{assert_close, create_engine, hp_of, TestParticipantBuilder};
    use crate::errors::{AbilityError, BattleEngineError, BattleStateError};
    use pretty_assertions::assert_eq;
    use schema::{ActionType, ComboType, ModifierType, SpecialAbilityType};

    fn arena(level: u32, mochi_hp: f64) -> BattleEngine {
        let mut engine = create_engine(None);
        engine
            .add_participant(TestParticipantBuilder::new("mochi").with_hp(mochi_hp).with_speed(20.0).build())
            .expect("add mochi");
        engine
            .add_participant(TestParticipantBuilder::new("biscuit").build())
            .expect("add biscuit");
        engine
            .initialize_participant_abilities("mochi", level)
            .expect("mochi is registered");
        engine.start_battle().expect("start");
        engine
    }

    fn act(engine: &mut BattleEngine, actor: &str, action_type: ActionType, target: Option<&str>) -> f64 {
        let mut action = BattleAction::new(action_type, actor);
        if let Some(target) = target {
            action = action.with_target(target);
        }
        match engine.perform_action(action, actor) {
            Ok(result) => result.damage,
            Err(err) => panic!("{} could not act: {}", actor, err),
        }
    }

    #[test]
    fn test_grants_follow_level_and_setup_phase() {
        // Arrange
        let mut engine = create_engine(None);
        engine
            .add_participant(TestParticipantBuilder::new("mochi").build())
            .expect("add mochi");

        // Act
        let granted = engine.initialize_participant_abilities("mochi", 2).expect("setup phase");

        // Assert
        assert_eq!(
            granted,
            vec![
                SpecialAbilityType::CriticalStrike,
                SpecialAbilityType::LightningBolt,
                SpecialAbilityType::LifeSteal,
                SpecialAbilityType::Cleanse,
            ]
        );
        assert_eq!(
            engine.initialize_participant_abilities("ghost", 2),
            Err(BattleEngineError::BattleState(BattleStateError::UnknownParticipant(
                "ghost".to_string()
            )))
        );
        engine.start_battle().expect("start");
        assert!(matches!(
            engine.initialize_participant_abilities("mochi", 5),
            Err(BattleEngineError::BattleState(BattleStateError::WrongPhase { .. }))
        ));
    }

    #[test]
    fn test_unlearned_ability_is_rejected_without_spending_the_turn() {
        // Arrange
        let mut engine = arena(1, 100.0);
        let before = engine.state().clone();

        // Act
        let result = engine.use_special_ability(SpecialAbilityType::Sanctuary, "mochi", None);

        // Assert
        assert_eq!(
            result,
            Err(BattleEngineError::Ability(AbilityError::NotLearned {
                participant: "mochi".to_string(),
                ability: SpecialAbilityType::Sanctuary,
            }))
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_critical_strike_hits_the_cap_and_is_recorded() {
        // Arrange
        let mut engine = arena(1, 100.0);

        // Act
        let result = engine
            .use_special_ability(SpecialAbilityType::CriticalStrike, "mochi", Some("biscuit"))
            .expect("critical strike is ready");

        // Assert
        assert_close(result.damage, 24.0);
        assert_close(hp_of(&engine, "biscuit"), 76.0);
        assert_eq!(result.animation, "critical_strike");
        assert_eq!(engine.current_turn_participant(), Some("biscuit"));
        let recorded = engine
            .state()
            .participant("mochi")
            .and_then(|p| p.last_action())
            .and_then(|record| record.ability);
        assert_eq!(recorded, Some(SpecialAbilityType::CriticalStrike));
        assert!(engine.events().events().iter().any(|e| matches!(
            e,
            BattleEvent::AbilityUsed { ability: SpecialAbilityType::CriticalStrike, target, .. } if target == "biscuit"
        )));
        assert!(engine.available_special_abilities("mochi").is_empty());
    }

    #[test]
    fn test_cooldown_lasts_the_owners_next_turns() {
        // Arrange
        let mut engine = arena(2, 100.0);
        engine
            .use_special_ability(SpecialAbilityType::LightningBolt, "mochi", Some("biscuit"))
            .expect("bolt is ready");

        // Act
        let mut waits = Vec::new();
        for _ in 0..3 {
            act(&mut engine, "biscuit", ActionType::Counter, None);
            match engine.use_special_ability(SpecialAbilityType::LightningBolt, "mochi", Some("biscuit")) {
                Err(BattleEngineError::Ability(AbilityError::OnCooldown { turns_remaining, .. })) => {
                    waits.push(turns_remaining)
                }
                other => panic!("bolt should still be cooling down, got {:?}", other),
            }
            act(&mut engine, "mochi", ActionType::Counter, None);
        }
        act(&mut engine, "biscuit", ActionType::Counter, None);
        let ready = engine.use_special_ability(SpecialAbilityType::LightningBolt, "mochi", Some("biscuit"));

        // Assert
        assert_eq!(waits, vec![3, 2, 1]);
        assert!(ready.is_ok());
    }

    #[test]
    fn test_time_freeze_skips_the_target_and_runs_out_of_charges() {
        // Arrange
        let mut engine = arena(5, 100.0);

        // Act
        let freeze = engine
            .use_special_ability(SpecialAbilityType::TimeFreeze, "mochi", Some("biscuit"))
            .expect("time freeze is ready");
        let frozen = engine
            .perform_action(BattleAction::new(ActionType::Attack, "biscuit").with_target("mochi"), "biscuit")
            .expect("a stunned actor still gets a result");
        let again = engine.use_special_ability(SpecialAbilityType::TimeFreeze, "mochi", Some("biscuit"));

        // Assert
        assert_eq!(freeze.status_effects, vec!["skip_opponent_turn".to_string()]);
        assert!(!frozen.success);
        assert_close(hp_of(&engine, "mochi"), 100.0);
        assert_eq!(
            again,
            Err(BattleEngineError::Ability(AbilityError::NoCharges(
                SpecialAbilityType::TimeFreeze
            )))
        );
    }

    #[test]
    fn test_stunned_actor_keeps_its_ability_ready() {
        // Arrange
        let mut engine = arena(1, 100.0);
        act(&mut engine, "biscuit", ActionType::Stun, Some("mochi"));

        // Act
        let result = engine
            .use_special_ability(SpecialAbilityType::CriticalStrike, "mochi", Some("biscuit"))
            .expect("a stunned actor still gets a result");

        // Assert
        assert!(!result.success);
        assert_eq!(result.animation, "stunned");
        assert_close(hp_of(&engine, "biscuit"), 100.0);
        assert_eq!(
            engine.available_special_abilities("mochi"),
            vec![SpecialAbilityType::CriticalStrike]
        );
    }

    #[test]
    fn test_berserker_rage_drops_the_guard() {
        // Arrange
        let mut engine = arena(3, 100.0);
        act(&mut engine, "mochi", ActionType::Shield, None);
        act(&mut engine, "biscuit", ActionType::Counter, None);

        // Act
        engine
            .use_special_ability(SpecialAbilityType::BerserkerRage, "mochi", None)
            .expect("rage is ready");

        // Assert
        let mochi = engine.state().participant("mochi").cloned().expect("mochi is in battle");
        assert!(!mochi.stats.has_modifier(ModifierType::Shield));
        let rage: Vec<(f64, u32)> = mochi
            .stats
            .modifiers_of(ModifierType::Damage)
            .map(|m| (m.value, m.duration))
            .collect();
        assert_eq!(rage.len(), 1);
        assert_close(rage[0].0, 1.2);
        assert_eq!(rage[0].1, 3);
        assert!(engine.events().events().iter().any(|e| matches!(
            e,
            BattleEvent::ModifierRemoved { modifier, .. } if modifier.modifier_type == ModifierType::Shield
        )));
    }

    #[test]
    fn test_sanctuary_heals_up_to_the_cap() {
        let mut engine = arena(4, 50.0);

        let result = engine
            .use_special_ability(SpecialAbilityType::Sanctuary, "mochi", Some("biscuit"))
            .expect("sanctuary is ready");

        assert_close(result.healing, 31.25);
        assert_close(hp_of(&engine, "mochi"), 81.25);
        assert_close(hp_of(&engine, "biscuit"), 100.0);
    }

    #[test]
    fn test_stun_then_attack_lands_a_capped_combo() {
        // Arrange
        let mut engine = arena(1, 100.0);
        act(&mut engine, "mochi", ActionType::Stun, Some("biscuit"));
        act(&mut engine, "biscuit", ActionType::Attack, Some("mochi"));

        // Act
        let result = engine
            .perform_action(BattleAction::new(ActionType::Attack, "mochi").with_target("biscuit"), "mochi")
            .expect("attack resolves");

        // Assert
        assert_close(result.damage, 24.0);
        assert!(result.response.starts_with("COMBO: Stunning Strike!"));
        assert_eq!(result.status_effects, vec!["guaranteed_hit".to_string()]);
        assert!(result.modifiers_applied.iter().any(|m| m.source == "stun_attack"));
        assert!(engine.events().events().iter().any(|e| matches!(
            e,
            BattleEvent::ComboCompleted { actor, combo: ComboType::StunAttack } if actor == "mochi"
        )));
    }

    #[test]
    fn test_drain_then_heal_boosts_healing() {
        // Arrange
        let mut engine = arena(1, 50.0);
        act(&mut engine, "mochi", ActionType::Drain, Some("biscuit"));
        act(&mut engine, "biscuit", ActionType::Counter, None);

        // Act
        let result = engine
            .perform_action(BattleAction::new(ActionType::Heal, "mochi"), "mochi")
            .expect("heal resolves");

        // Assert
        assert_close(result.healing, 30.0);
        assert_close(hp_of(&engine, "mochi"), 86.0);
    }

    #[test]
    fn test_ability_breaks_a_combo_in_progress() {
        // Arrange
        let mut engine = arena(1, 100.0);
        act(&mut engine, "mochi", ActionType::Stun, Some("biscuit"));
        act(&mut engine, "biscuit", ActionType::Attack, Some("mochi"));
        engine
            .use_special_ability(SpecialAbilityType::CriticalStrike, "mochi", Some("biscuit"))
            .expect("critical strike is ready");
        act(&mut engine, "biscuit", ActionType::Counter, None);

        // Act
        let damage = act(&mut engine, "mochi", ActionType::Attack, Some("biscuit"));

        // Assert
        assert_close(damage, 20.0);
        assert!(!engine
            .events()
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::ComboCompleted { .. })));
    }
}

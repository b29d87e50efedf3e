#[cfg(test)]
mod tests {
    use crate::battle::arbiter::BattleOutcome;
    use crate::battle::engine::BattleEngine;
    use crate::battle::field::{MoveState, SideId, SlotId, TimedCondition};
    use crate::battle::tests::common::{
        assert_ok, create_engine_with, create_field_with_format, create_test_engine,
        create_test_field, deterministic_config, test_catalog, SharedView, TestCombatantBuilder,
    };
    use crate::catalog::{DataCatalog, StandardCatalog};
    use crate::combatant::{Combatant, StatusCondition};
    use crate::config::{BattleConfig, BattleFormat};
    use crate::providers::{ScriptedChoice, ScriptedProvider};
    use pretty_assertions::assert_eq;
    use schema::{
        ElementType, MoveCategory, MoveData, MoveId, ScreenKind, SemiInvulnerableKind, SpeciesId,
        Stat, Weather,
    };
    use std::sync::Arc;

    const SEEDS: std::ops::Range<u64> = 0..100;

    /// Machamp's Tackle into an idle Snorlax does 33, leaving 202.
    fn machamp_tackles_snorlax(
        seed: u64,
        machamp: Combatant,
        catalog: Arc<dyn DataCatalog>,
        snorlax_evasion: i8,
    ) -> (BattleEngine, SharedView) {
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![machamp], vec![snorlax]);
        let config = BattleConfig {
            seed: Some(seed),
            ..deterministic_config()
        };
        let (mut engine, view) = create_engine_with(
            field,
            config,
            catalog,
            ScriptedProvider::moves([MoveId::Tackle]),
            ScriptedProvider::default(),
        );
        engine.field_mut().slot_mut(SlotId::enemy(0)).unwrap().stat_stages[Stat::Evasion.index()] =
            snorlax_evasion;
        assert_ok(engine.run_turn());
        (engine, view)
    }

    fn snorlax_hp(engine: &BattleEngine) -> u16 {
        engine.field().combatant_at(SlotId::enemy(0)).unwrap().current_hp
    }

    fn pp_left(engine: &BattleEngine, slot: SlotId, move_id: MoveId) -> u8 {
        engine
            .field()
            .combatant_at(slot)
            .and_then(|c| c.move_slot(move_id))
            .map(|m| m.pp)
            .unwrap_or(0)
    }

    #[test]
    fn test_solar_beam_charges_then_fires() {
        let venusaur = TestCombatantBuilder::new(SpeciesId::Venusaur, 50)
            .with_moves(vec![MoveId::SolarBeam])
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![venusaur], vec![snorlax]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::SolarBeam]),
            ScriptedProvider::default(),
        );

        // Turn 1: charge only.
        assert_ok(engine.run_turn());
        assert!(view.contains_message("Venusaur absorbed light!"));
        assert!(engine.field().combatant_at(SlotId::enemy(0)).unwrap().is_full_hp());
        assert!(matches!(
            engine.field().slot(SlotId::player(0)).unwrap().move_state,
            MoveState::Charging {
                move_id: MoveId::SolarBeam,
                ..
            }
        ));
        assert_eq!(pp_left(&engine, SlotId::player(0), MoveId::SolarBeam), 9);

        // Turn 2: the continuation fires without asking the provider and costs no PP.
        assert_ok(engine.run_turn());
        assert_eq!(engine.field().combatant_at(SlotId::enemy(0)).unwrap().current_hp, 160);
        assert_eq!(pp_left(&engine, SlotId::player(0), MoveId::SolarBeam), 9);
        assert_eq!(
            engine.field().slot(SlotId::player(0)).unwrap().move_state,
            MoveState::Idle
        );
    }

    #[test]
    fn test_solar_beam_skips_charge_in_sun() {
        let venusaur = TestCombatantBuilder::new(SpeciesId::Venusaur, 50)
            .with_moves(vec![MoveId::SolarBeam])
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![venusaur], vec![snorlax]);
        let (mut engine, _view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::SolarBeam]),
            ScriptedProvider::default(),
        );
        engine.field_mut().weather = Some(TimedCondition {
            kind: Weather::Sun,
            turns_remaining: 5,
        });

        assert_ok(engine.run_turn());

        assert_eq!(engine.field().combatant_at(SlotId::enemy(0)).unwrap().current_hp, 160);
    }

    #[test]
    fn test_dig_dodges_then_strikes() {
        // Garchomp (122 speed) outspeeds Machamp (75 speed).
        let garchomp = TestCombatantBuilder::new(SpeciesId::Garchomp, 50)
            .with_moves(vec![MoveId::Dig])
            .build();
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
        let field = create_test_field(vec![garchomp], vec![machamp]);
        let (mut engine, _view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Dig]),
            ScriptedProvider::moves([MoveId::Tackle, MoveId::Tackle]),
        );

        // Turn 1: Garchomp is underground, Machamp's Tackle misses.
        assert_ok(engine.run_turn());
        assert!(engine.field().combatant_at(SlotId::player(0)).unwrap().is_full_hp());
        assert!(matches!(
            engine.field().slot(SlotId::player(0)).unwrap().move_state,
            MoveState::SemiInvulnerable {
                kind: SemiInvulnerableKind::Underground,
                ..
            }
        ));

        // Turn 2: Dig lands, then Garchomp is hittable again.
        assert_ok(engine.run_turn());
        assert_eq!(engine.field().combatant_at(SlotId::enemy(0)).unwrap().current_hp, 84);
        assert_eq!(engine.field().combatant_at(SlotId::player(0)).unwrap().current_hp, 159);
    }

    #[test]
    fn test_earthquake_reaches_underground_target() {
        let garchomp = TestCombatantBuilder::new(SpeciesId::Garchomp, 50)
            .with_moves(vec![MoveId::Dig])
            .build();
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
            .with_moves(vec![MoveId::Earthquake])
            .build();
        let field = create_test_field(vec![garchomp], vec![machamp]);
        let (mut engine, _view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Dig]),
            ScriptedProvider::moves([MoveId::Earthquake]),
        );

        assert_ok(engine.run_turn());

        let garchomp = engine.field().combatant_at(SlotId::player(0)).unwrap();
        assert!(garchomp.current_hp < garchomp.max_hp());
    }

    #[test]
    fn test_counter_returns_double_physical_damage() {
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_moves(vec![MoveId::Counter])
            .build();
        let field = create_test_field(vec![machamp], vec![snorlax]);
        let (mut engine, _view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Tackle]),
            ScriptedProvider::moves([MoveId::Counter]),
        );

        assert_ok(engine.run_turn());

        assert_eq!(engine.field().combatant_at(SlotId::enemy(0)).unwrap().current_hp, 202);
        assert_eq!(engine.field().combatant_at(SlotId::player(0)).unwrap().current_hp, 99);
    }

    #[test]
    fn test_counter_fails_without_an_attacker() {
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_moves(vec![MoveId::Counter])
            .build();
        let field = create_test_field(vec![machamp], vec![snorlax]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::default(),
            ScriptedProvider::moves([MoveId::Counter]),
        );

        assert_ok(engine.run_turn());

        assert!(view.contains_message("But it failed!"));
        assert!(engine.field().combatant_at(SlotId::player(0)).unwrap().is_full_hp());
    }

    #[test]
    fn test_focus_punch_fails_after_being_hit() {
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
            .with_moves(vec![MoveId::FocusPunch])
            .build();
        let pikachu = TestCombatantBuilder::new(SpeciesId::Pikachu, 50)
            .with_moves(vec![MoveId::QuickAttack])
            .build();
        let field = create_test_field(vec![machamp], vec![pikachu]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::FocusPunch]),
            ScriptedProvider::moves([MoveId::QuickAttack]),
        );

        assert_ok(engine.run_turn());

        assert!(view.contains_message("Machamp is tightening its focus!"));
        assert!(view.contains_message("Machamp lost its focus and couldn't move!"));
        assert_eq!(engine.field().combatant_at(SlotId::player(0)).unwrap().current_hp, 150);
        assert!(engine.field().combatant_at(SlotId::enemy(0)).unwrap().is_full_hp());
    }

    #[test]
    fn test_focus_punch_lands_when_undisturbed() {
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
            .with_moves(vec![MoveId::FocusPunch])
            .build();
        let pikachu = TestCombatantBuilder::new(SpeciesId::Pikachu, 50).build();
        let field = create_test_field(vec![machamp], vec![pikachu]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::FocusPunch]),
            ScriptedProvider::default(),
        );

        let outcome = assert_ok(engine.run_turn());

        assert_eq!(outcome, BattleOutcome::Victory);
        assert!(view.contains_message("Pikachu fainted!"));
    }

    #[test]
    fn test_protect_blocks_incoming_move() {
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_moves(vec![MoveId::Protect])
            .build();
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
        let field = create_test_field(vec![snorlax], vec![machamp]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Protect]),
            ScriptedProvider::moves([MoveId::Tackle]),
        );

        assert_ok(engine.run_turn());

        assert!(engine.field().combatant_at(SlotId::player(0)).unwrap().is_full_hp());
        assert_eq!(engine.field().slot(SlotId::player(0)).unwrap().protect_streak, 1);
        assert!(view.contains_message("Snorlax protected itself!"));
    }

    #[test]
    fn test_aurora_veil_needs_hail() {
        let lapras = TestCombatantBuilder::new(SpeciesId::Lapras, 50)
            .with_moves(vec![MoveId::AuroraVeil])
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![lapras], vec![snorlax]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::AuroraVeil]),
            ScriptedProvider::default(),
        );

        assert_ok(engine.run_turn());

        assert!(view.contains_message("But it failed!"));
        assert!(!engine.field().side(SideId::Player).has_screen(ScreenKind::AuroraVeil));
    }

    #[test]
    fn test_aurora_veil_rises_in_hail() {
        let lapras = TestCombatantBuilder::new(SpeciesId::Lapras, 50)
            .with_moves(vec![MoveId::AuroraVeil])
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![lapras], vec![snorlax]);
        let (mut engine, _view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::AuroraVeil]),
            ScriptedProvider::default(),
        );
        engine.field_mut().weather = Some(TimedCondition {
            kind: Weather::Hail,
            turns_remaining: 5,
        });

        assert_ok(engine.run_turn());

        // Set for five turns, one already ticked off at turn end.
        let screens = &engine.field().side(SideId::Player).screens;
        assert_eq!(screens.get(&ScreenKind::AuroraVeil), Some(&4));
    }

    #[test]
    fn test_sleeping_combatant_wakes_and_acts() {
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_status(StatusCondition::Sleep(1))
            .build();
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
        let field = create_test_field(vec![snorlax], vec![machamp]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Tackle, MoveId::Tackle]),
            ScriptedProvider::default(),
        );

        assert_ok(engine.run_turn());
        assert!(view.contains_message("Snorlax is fast asleep."));
        assert_eq!(
            engine.field().combatant_at(SlotId::player(0)).unwrap().status,
            Some(StatusCondition::Sleep(0))
        );
        assert!(engine.field().combatant_at(SlotId::enemy(0)).unwrap().is_full_hp());

        assert_ok(engine.run_turn());
        assert_eq!(engine.field().combatant_at(SlotId::player(0)).unwrap().status, None);
        assert_eq!(engine.field().combatant_at(SlotId::enemy(0)).unwrap().current_hp, 129);
    }

    #[test]
    fn test_earthquake_hits_ally_and_both_foes_in_doubles() {
        let garchomp = TestCombatantBuilder::new(SpeciesId::Garchomp, 50)
            .with_moves(vec![MoveId::Earthquake])
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
        let lapras = TestCombatantBuilder::new(SpeciesId::Lapras, 50).build();
        let field = create_field_with_format(
            BattleFormat::Doubles,
            vec![garchomp, snorlax],
            vec![machamp, lapras],
        );
        let (mut engine, _view) = create_test_engine(
            field,
            ScriptedProvider::new([
                ScriptedChoice::Move {
                    move_id: MoveId::Earthquake,
                    target: None,
                },
                ScriptedChoice::Pass,
            ]),
            ScriptedProvider::default(),
        );

        assert_ok(engine.run_turn());

        for slot in [SlotId::player(1), SlotId::enemy(0), SlotId::enemy(1)] {
            let combatant = engine.field().combatant_at(slot).unwrap();
            assert!(
                combatant.current_hp < combatant.max_hp(),
                "{} was not hit",
                combatant.name()
            );
        }
        assert!(engine.field().combatant_at(SlotId::player(0)).unwrap().is_full_hp());
    }

    #[test]
    fn test_full_paralysis_sometimes_stops_the_move() {
        let mut stopped = 0;
        let mut moved = 0;
        for seed in SEEDS {
            let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
                .with_status(StatusCondition::Paralysis)
                .build();
            let (engine, view) = machamp_tackles_snorlax(seed, machamp, test_catalog(), 0);

            if view.contains_message("Machamp is paralyzed! It can't move!") {
                stopped += 1;
                assert_eq!(snorlax_hp(&engine), 235, "seed {}", seed);
                assert_eq!(pp_left(&engine, SlotId::player(0), MoveId::Tackle), 35);
            } else {
                moved += 1;
                assert_eq!(snorlax_hp(&engine), 202, "seed {}", seed);
                assert_eq!(pp_left(&engine, SlotId::player(0), MoveId::Tackle), 34);
            }
        }

        assert!(stopped > 0 && moved > 0, "stopped {}, moved {}", stopped, moved);
    }

    #[test]
    fn test_frozen_combatant_thaws_or_stays_put() {
        let mut frozen = 0;
        let mut thawed = 0;
        for seed in SEEDS {
            let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
                .with_status(StatusCondition::Freeze)
                .build();
            let (engine, view) = machamp_tackles_snorlax(seed, machamp, test_catalog(), 0);
            let status = engine.field().combatant_at(SlotId::player(0)).unwrap().status;

            if view.contains_message("Machamp is frozen solid!") {
                frozen += 1;
                assert_eq!(status, Some(StatusCondition::Freeze));
                assert_eq!(snorlax_hp(&engine), 235, "seed {}", seed);
            } else {
                thawed += 1;
                assert!(view.contains_message("Machamp thawed out!"), "seed {}", seed);
                assert_eq!(status, None);
                assert_eq!(snorlax_hp(&engine), 202, "seed {}", seed);
            }
        }

        assert!(frozen > 0 && thawed > 0, "frozen {}, thawed {}", frozen, thawed);
    }

    #[test]
    fn test_evasion_makes_a_sure_move_miss() {
        // Evasion +6 cuts 100 accuracy to a third.
        let mut missed = 0;
        let mut hit = 0;
        for seed in SEEDS {
            let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
            let (engine, view) = machamp_tackles_snorlax(seed, machamp, test_catalog(), 6);

            if view.contains_message("Machamp's attack missed!") {
                missed += 1;
                assert_eq!(snorlax_hp(&engine), 235, "seed {}", seed);
            } else {
                hit += 1;
                assert_eq!(snorlax_hp(&engine), 202, "seed {}", seed);
            }
        }

        assert!(missed > 0 && hit > 0, "missed {}, hit {}", missed, hit);
    }

    #[test]
    fn test_accuracy_stage_makes_an_inaccurate_move_certain() {
        let mut catalog = StandardCatalog::builtin();
        catalog.insert_move(MoveData::attack(
            MoveId::Tackle,
            "Tackle",
            ElementType::Normal,
            MoveCategory::Physical,
            40,
            Some(50),
            35,
        ));
        let catalog: Arc<dyn DataCatalog> = Arc::new(catalog);

        for seed in 0..30 {
            let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
            let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
            let field = create_test_field(vec![machamp], vec![snorlax]);
            let config = BattleConfig {
                seed: Some(seed),
                ..deterministic_config()
            };
            let (mut engine, view) = create_engine_with(
                field,
                config,
                Arc::clone(&catalog),
                ScriptedProvider::moves([MoveId::Tackle]),
                ScriptedProvider::default(),
            );
            // 50 * 3 covers every roll.
            engine.field_mut().slot_mut(SlotId::player(0)).unwrap().stat_stages
                [Stat::Accuracy.index()] = 6;

            assert_ok(engine.run_turn());

            assert!(!view.contains_message("missed"), "seed {}", seed);
            assert_eq!(snorlax_hp(&engine), 202, "seed {}", seed);
        }
    }

    #[test]
    fn test_never_miss_move_ignores_evasion() {
        for seed in 0..30 {
            let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
                .with_moves(vec![MoveId::AerialAce])
                .build();
            let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
            let field = create_test_field(vec![machamp], vec![snorlax]);
            let config = BattleConfig {
                seed: Some(seed),
                ..deterministic_config()
            };
            let (mut engine, _view) = create_engine_with(
                field,
                config,
                test_catalog(),
                ScriptedProvider::moves([MoveId::AerialAce]),
                ScriptedProvider::default(),
            );
            engine.field_mut().slot_mut(SlotId::enemy(0)).unwrap().stat_stages
                [Stat::Evasion.index()] = 6;

            assert_ok(engine.run_turn());

            // floor(floor(22 * 60 * 150 / 85) / 50) + 2 = 48
            assert_eq!(snorlax_hp(&engine), 187, "seed {}", seed);
        }
    }
}

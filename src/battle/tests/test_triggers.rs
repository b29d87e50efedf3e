#[cfg(test)]
mod tests {
    use crate::battle::field::SlotId;
    use crate::battle::tests::common::{
        assert_ok, create_engine_with, create_test_engine, create_test_field, deterministic_config,
        TestCombatantBuilder,
    };
    use crate::catalog::StandardCatalog;
    use crate::combatant::StatusCondition;
    use crate::config::BattleConfig;
    use crate::providers::ScriptedProvider;
    use pretty_assertions::assert_eq;
    use schema::{Ability, HeldItem, MoveId, SpeciesId, Stat, Weather};
    use std::sync::Arc;

    #[test]
    fn test_intimidate_fires_when_leads_enter() {
        let intimidator = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_ability(Ability::Intimidate)
            .build();
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
        let field = create_test_field(vec![intimidator], vec![machamp]);
        let (mut engine, view) =
            create_test_engine(field, ScriptedProvider::default(), ScriptedProvider::default());

        assert_ok(engine.start());

        let enemy_slot = engine.field().slot(SlotId::enemy(0)).unwrap();
        assert_eq!(enemy_slot.stage(Stat::Attack), -1);
        let player_slot = engine.field().slot(SlotId::player(0)).unwrap();
        assert_eq!(player_slot.stage(Stat::Attack), 0);
        assert!(view.contains_message("Snorlax's Intimidate affects the opposing side!"));
    }

    #[test]
    fn test_leftovers_heal_at_turn_end() {
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_item(HeldItem::Leftovers)
            .with_hp(100)
            .build();
        let pikachu = TestCombatantBuilder::new(SpeciesId::Pikachu, 50).build();
        let field = create_test_field(vec![snorlax], vec![pikachu]);
        let (mut engine, view) =
            create_test_engine(field, ScriptedProvider::default(), ScriptedProvider::default());

        assert_ok(engine.run_turn());

        // 235 / 16 = 14
        let snorlax = engine.field().combatant_at(SlotId::player(0)).unwrap();
        assert_eq!(snorlax.current_hp, 114);
        assert!(view.contains_message("Snorlax restored a little HP using its Leftovers!"));
    }

    #[test]
    fn test_sitrus_berry_heals_once_below_half() {
        // Arrange: Machamp's Tackle takes Snorlax from 130 to 97, under half of 235.
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_item(HeldItem::SitrusBerry)
            .with_hp(130)
            .build();
        let field = create_test_field(vec![machamp], vec![snorlax]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Tackle]),
            ScriptedProvider::default(),
        );

        // Act
        assert_ok(engine.run_turn());

        // Assert: 97 + 235 / 4
        let snorlax = engine.field().combatant_at(SlotId::enemy(0)).unwrap();
        assert_eq!(snorlax.current_hp, 155);
        assert_eq!(snorlax.item, None);
        assert!(view.contains_message("Snorlax used its Sitrus Berry!"));
    }

    #[test]
    fn test_rough_skin_hurts_contact_attacker() {
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_ability(Ability::RoughSkin)
            .build();
        let field = create_test_field(vec![machamp], vec![snorlax]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Tackle]),
            ScriptedProvider::default(),
        );

        assert_ok(engine.run_turn());

        // 165 / 8 = 20
        let machamp = engine.field().combatant_at(SlotId::player(0)).unwrap();
        assert_eq!(machamp.current_hp, 145);
        assert!(view.contains_message("Machamp was hurt by Snorlax's Rough Skin!"));
    }

    #[test]
    fn test_failing_listener_does_not_stop_the_others() {
        // Arrange: the ability is missing from the catalog, so its listener errors.
        let mut catalog = StandardCatalog::builtin();
        catalog.remove_ability(Ability::SpeedBoost);
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_ability(Ability::SpeedBoost)
            .with_item(HeldItem::Leftovers)
            .with_hp(100)
            .build();
        let pikachu = TestCombatantBuilder::new(SpeciesId::Pikachu, 50).build();
        let field = create_test_field(vec![snorlax], vec![pikachu]);
        let (mut engine, _view) = create_engine_with(
            field,
            deterministic_config(),
            Arc::new(catalog),
            ScriptedProvider::default(),
            ScriptedProvider::default(),
        );

        // Act
        assert_ok(engine.run_turn());

        // Assert: the item listener still ran, the ability listener did nothing.
        let snorlax = engine.field().combatant_at(SlotId::player(0)).unwrap();
        assert_eq!(snorlax.current_hp, 114);
        let slot = engine.field().slot(SlotId::player(0)).unwrap();
        assert_eq!(slot.stage(Stat::Speed), 0);
    }

    #[test]
    fn test_speed_boost_raises_speed_each_turn() {
        let ninjask = TestCombatantBuilder::new(SpeciesId::Ninjask, 50)
            .with_ability(Ability::SpeedBoost)
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![ninjask], vec![snorlax]);
        let (mut engine, _view) =
            create_test_engine(field, ScriptedProvider::default(), ScriptedProvider::default());

        assert_ok(engine.run_turn());
        assert_ok(engine.run_turn());

        let slot = engine.field().slot(SlotId::player(0)).unwrap();
        assert_eq!(slot.stage(Stat::Speed), 2);
    }

    #[test]
    fn test_listeners_follow_the_occupant() {
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_item(HeldItem::Leftovers)
            .build();
        let pikachu = TestCombatantBuilder::new(SpeciesId::Pikachu, 50).build();
        let field = create_test_field(vec![snorlax], vec![pikachu]);
        let (mut engine, _view) =
            create_test_engine(field, ScriptedProvider::default(), ScriptedProvider::default());

        assert_ok(engine.start());
        let owners: Vec<SlotId> = engine
            .context()
            .dispatcher
            .listeners()
            .iter()
            .map(|listener| listener.owner)
            .collect();

        assert_eq!(owners, vec![SlotId::player(0)]);
    }

    #[test]
    fn test_life_orb_boosts_then_costs_hp_after_the_move() {
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
            .with_item(HeldItem::LifeOrb)
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![machamp], vec![snorlax]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Tackle]),
            ScriptedProvider::default(),
        );

        assert_ok(engine.run_turn());

        // 33 * 1.3 = 42, then 165 / 10 = 16 recoil
        let snorlax = engine.field().combatant_at(SlotId::enemy(0)).unwrap();
        assert_eq!(snorlax.current_hp, 193);
        let machamp = engine.field().combatant_at(SlotId::player(0)).unwrap();
        assert_eq!(machamp.current_hp, 149);
        assert!(view.contains_message("Machamp lost some of its HP!"));
    }

    #[test]
    fn test_life_orb_costs_nothing_without_damage() {
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
            .with_moves(vec![MoveId::SwordsDance])
            .with_item(HeldItem::LifeOrb)
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![machamp], vec![snorlax]);
        let (mut engine, view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::SwordsDance]),
            ScriptedProvider::default(),
        );

        assert_ok(engine.run_turn());

        let machamp = engine.field().combatant_at(SlotId::player(0)).unwrap();
        assert!(machamp.is_full_hp());
        assert!(!view.contains_message("lost some of its HP"));
    }

    #[test]
    fn test_rocky_helmet_hurts_contact_attacker_only() {
        let helmet_holder = || {
            TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
                .with_item(HeldItem::RockyHelmet)
                .build()
        };
        let machamp = || {
            TestCombatantBuilder::new(SpeciesId::Machamp, 50)
                .with_moves(vec![MoveId::Tackle, MoveId::Earthquake])
                .build()
        };

        let (mut contact, view) = create_test_engine(
            create_test_field(vec![machamp()], vec![helmet_holder()]),
            ScriptedProvider::moves([MoveId::Tackle]),
            ScriptedProvider::default(),
        );
        assert_ok(contact.run_turn());

        // 165 / 6 = 27
        let attacker = contact.field().combatant_at(SlotId::player(0)).unwrap();
        assert_eq!(attacker.current_hp, 138);
        assert!(view.contains_message("Machamp was hurt by Snorlax's Rocky Helmet!"));

        let (mut ranged, _view) = create_test_engine(
            create_test_field(vec![machamp()], vec![helmet_holder()]),
            ScriptedProvider::moves([MoveId::Earthquake]),
            ScriptedProvider::default(),
        );
        assert_ok(ranged.run_turn());

        let attacker = ranged.field().combatant_at(SlotId::player(0)).unwrap();
        assert!(attacker.is_full_hp());
        assert!(!ranged.field().combatant_at(SlotId::enemy(0)).unwrap().is_full_hp());
    }

    #[test]
    fn test_static_sometimes_paralyzes_contact_attacker() {
        let mut paralyzed = 0;
        let mut spared = 0;
        for seed in 0..100 {
            let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50).build();
            let static_holder = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
                .with_ability(Ability::Static)
                .build();
            let field = create_test_field(vec![machamp], vec![static_holder]);
            let config = BattleConfig {
                seed: Some(seed),
                ..deterministic_config()
            };
            let (mut engine, view) = create_engine_with(
                field,
                config,
                Arc::new(StandardCatalog::builtin()),
                ScriptedProvider::moves([MoveId::Tackle]),
                ScriptedProvider::default(),
            );

            assert_ok(engine.run_turn());

            let status = engine.field().combatant_at(SlotId::player(0)).unwrap().status;
            if view.contains_message("Snorlax's Static!") {
                paralyzed += 1;
                assert_eq!(status, Some(StatusCondition::Paralysis), "seed {}", seed);
                assert!(view.contains_message("Machamp is paralyzed! It may be unable to move!"));
            } else {
                spared += 1;
                assert_eq!(status, None, "seed {}", seed);
            }
        }

        assert!(paralyzed > 0 && spared > 0, "paralyzed {}, spared {}", paralyzed, spared);
    }

    #[test]
    fn test_entry_weather_resolves_fastest_lead_first() {
        // Machamp (75 Speed) sets sun before Snorlax (50 Speed) replaces it with rain.
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_ability(Ability::Drizzle)
            .build();
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
            .with_ability(Ability::Drought)
            .build();
        let field = create_test_field(vec![snorlax], vec![machamp]);
        let (mut engine, view) =
            create_test_engine(field, ScriptedProvider::default(), ScriptedProvider::default());

        assert_ok(engine.start());

        let weather = engine.field().weather.unwrap();
        assert_eq!(weather.kind, Weather::Rain);
        assert_eq!(weather.turns_remaining, 5);
        let messages = view.messages();
        let sun = messages
            .iter()
            .position(|m| m == "The sunlight turned harsh!")
            .unwrap();
        let rain = messages.iter().position(|m| m == "It started to rain!").unwrap();
        assert!(sun < rain);
    }

    #[test]
    fn test_huge_power_doubles_physical_damage_in_battle() {
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
            .with_ability(Ability::HugePower)
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![machamp], vec![snorlax]);
        let (mut engine, _view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Tackle]),
            ScriptedProvider::default(),
        );

        assert_ok(engine.run_turn());

        // 33 * 2
        let snorlax = engine.field().combatant_at(SlotId::enemy(0)).unwrap();
        assert_eq!(snorlax.current_hp, 169);
    }

    #[test]
    fn test_choice_band_boosts_physical_damage_in_battle() {
        let machamp = TestCombatantBuilder::new(SpeciesId::Machamp, 50)
            .with_item(HeldItem::ChoiceBand)
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![machamp], vec![snorlax]);
        let (mut engine, _view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::Tackle]),
            ScriptedProvider::default(),
        );

        assert_ok(engine.run_turn());

        // 33 * 1.5 = 49
        let snorlax = engine.field().combatant_at(SlotId::enemy(0)).unwrap();
        assert_eq!(snorlax.current_hp, 186);
    }

    #[test]
    fn test_mystic_water_boosts_water_moves_in_battle() {
        // Alakazam: 155 Special Attack into Snorlax's 130 Special Defense.
        let alakazam = TestCombatantBuilder::new(SpeciesId::Alakazam, 50)
            .with_moves(vec![MoveId::WaterGun])
            .with_item(HeldItem::MysticWater)
            .build();
        let snorlax = TestCombatantBuilder::new(SpeciesId::Snorlax, 50).build();
        let field = create_test_field(vec![alakazam], vec![snorlax]);
        let (mut engine, _view) = create_test_engine(
            field,
            ScriptedProvider::moves([MoveId::WaterGun]),
            ScriptedProvider::default(),
        );

        assert_ok(engine.run_turn());

        // floor(floor(22 * 40 * 155 / 130) / 50) + 2 = 22, * 1.2 = 26
        let snorlax = engine.field().combatant_at(SlotId::enemy(0)).unwrap();
        assert_eq!(snorlax.current_hp, 209);
    }
}

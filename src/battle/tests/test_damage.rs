#[cfg(test)]
mod tests {
    use crate::battle::damage::{DamageContext, DamageOutcome, DamagePipeline, DamageStage};
    use crate::battle::field::{BattleField, SideId, SlotId, TimedCondition};
    use crate::battle::tests::common::{
        assert_ok, create_field_with_format, create_test_field, deterministic_config,
        test_catalog, TestCombatantBuilder,
    };
    use crate::combatant::{Combatant, StatusCondition};
    use crate::config::{BattleConfig, BattleFormat};
    use crate::rng::BattleRng;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{Ability, HeldItem, MoveId, ScreenKind, SpeciesId, Stat, Weather};

    /// Electric attacker with 100 Attack, so Earthquake gets no same-type bonus.
    fn attacker() -> Combatant {
        TestCombatantBuilder::new(SpeciesId::Pikachu, 50)
            .with_moves(vec![MoveId::Earthquake])
            .with_stat(Stat::Attack, 100)
            .build()
    }

    /// Normal defender with 100 Defense, neutral to Ground.
    fn defender() -> Combatant {
        TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_stat(Stat::Defense, 100)
            .build()
    }

    /// Same attacker with 100 Special Attack, facing 100 Special Defense.
    fn special_attacker() -> TestCombatantBuilder {
        TestCombatantBuilder::new(SpeciesId::Pikachu, 50)
            .with_stat(Stat::Attack, 100)
            .with_stat(Stat::SpecialAttack, 100)
    }

    fn special_defender() -> Combatant {
        TestCombatantBuilder::new(SpeciesId::Snorlax, 50)
            .with_stat(Stat::Defense, 100)
            .with_stat(Stat::SpecialDefense, 100)
            .build()
    }

    fn calculate(field: &BattleField, move_id: MoveId, config: &BattleConfig) -> DamageOutcome {
        let catalog = test_catalog();
        let move_data = catalog.require_move(move_id).unwrap();
        let dc = DamageContext::new(
            SlotId::player(0),
            SlotId::enemy(0),
            move_data,
            field,
            catalog.as_ref(),
            config,
            1,
        );
        let mut rng = BattleRng::from_seed(7);
        assert_ok(DamagePipeline::standard().calculate(dc, &mut rng))
    }

    fn raise_screens(field: &mut BattleField, screens: &[ScreenKind]) {
        for screen in screens {
            field.side_mut(SideId::Enemy).screens.insert(*screen, 5);
        }
    }

    #[test]
    fn test_base_formula_at_level_fifty() {
        // floor(floor(22 * 100 * 100 / 100) / 50) + 2 = 46
        let field = create_test_field(vec![attacker()], vec![defender()]);

        let outcome = calculate(&field, MoveId::Earthquake, &deterministic_config());

        assert_eq!(outcome.damage, 46);
        assert_eq!(outcome.effectiveness, 1.0);
        assert!(!outcome.critical);
    }

    #[rstest]
    #[case::reflect(&[ScreenKind::Reflect], 23)]
    #[case::veil_does_not_stack(&[ScreenKind::Reflect, ScreenKind::AuroraVeil], 23)]
    #[case::light_screen_ignores_physical(&[ScreenKind::LightScreen], 46)]
    fn test_screens_in_singles(#[case] screens: &[ScreenKind], #[case] expected: u16) {
        let mut field = create_test_field(vec![attacker()], vec![defender()]);
        raise_screens(&mut field, screens);

        let outcome = calculate(&field, MoveId::Earthquake, &deterministic_config());

        assert_eq!(outcome.damage, expected);
    }

    #[test]
    fn test_screens_are_weaker_with_more_slots() {
        let filler = || TestCombatantBuilder::new(SpeciesId::Lapras, 50).build();
        let mut field = create_field_with_format(
            BattleFormat::Doubles,
            vec![attacker(), filler()],
            vec![defender(), filler()],
        );
        raise_screens(&mut field, &[ScreenKind::Reflect]);

        let outcome = calculate(&field, MoveId::Earthquake, &deterministic_config());

        // 46 * 2/3
        assert_eq!(outcome.damage, 30);
    }

    #[test]
    fn test_critical_hit_is_still_screened() {
        let mut field = create_test_field(vec![attacker()], vec![defender()]);
        raise_screens(&mut field, &[ScreenKind::Reflect]);
        let mut config = deterministic_config();
        config.damage_overrides.force_critical = Some(true);

        let outcome = calculate(&field, MoveId::Earthquake, &config);

        // 46 * 1.5 * 0.5
        assert!(outcome.critical);
        assert_eq!(outcome.damage, 34);
    }

    #[test]
    fn test_burn_halves_physical_damage() {
        let burned = TestCombatantBuilder::new(SpeciesId::Pikachu, 50)
            .with_stat(Stat::Attack, 100)
            .with_status(StatusCondition::Burn)
            .build();
        let field = create_test_field(vec![burned], vec![defender()]);

        let outcome = calculate(&field, MoveId::Earthquake, &deterministic_config());

        assert_eq!(outcome.damage, 23);
    }

    #[test]
    fn test_attack_stage_scales_base_damage() {
        let mut field = create_test_field(vec![attacker()], vec![defender()]);
        field.slot_mut(SlotId::player(0)).unwrap().stat_stages[Stat::Attack.index()] = 2;

        let outcome = calculate(&field, MoveId::Earthquake, &deterministic_config());

        // floor(floor(22 * 100 * 200 / 100) / 50) + 2 = 90
        assert_eq!(outcome.damage, 90);
    }

    #[test]
    fn test_damage_floors_at_one_when_not_immune() {
        let feeble = TestCombatantBuilder::new(SpeciesId::Pikachu, 50)
            .with_stat(Stat::Attack, 1)
            .with_status(StatusCondition::Burn)
            .build();
        let wall = TestCombatantBuilder::new(SpeciesId::Tyranitar, 50)
            .with_stat(Stat::Defense, 999)
            .build();
        let field = create_test_field(vec![feeble], vec![wall]);
        let mut config = deterministic_config();
        config.damage_overrides.random_factor = Some(0.85);

        let outcome = calculate(&field, MoveId::Tackle, &config);

        assert_eq!(outcome.damage, 1);
    }

    #[test]
    fn test_immunity_deals_zero() {
        let gengar = TestCombatantBuilder::new(SpeciesId::Gengar, 50).build();
        let field = create_test_field(vec![attacker()], vec![gengar]);

        let outcome = calculate(&field, MoveId::Tackle, &deterministic_config());

        assert_eq!(outcome.damage, 0);
        assert_eq!(outcome.effectiveness, 0.0);
    }

    #[test]
    fn test_standard_stage_order() {
        let names: Vec<&str> = DamagePipeline::standard()
            .stages()
            .iter()
            .map(DamageStage::name)
            .collect();

        assert_eq!(
            names,
            vec![
                "base-power",
                "stab",
                "type-effectiveness",
                "critical",
                "random-variance",
                "attacker-ability",
                "attacker-item",
                "screens",
                "status",
            ]
        );
    }

    #[test]
    fn test_same_type_bonus_uses_either_type() {
        // Charizard is Fire/Flying; floor(floor(22 * 90 * 100 / 100) / 50) + 2 = 41
        let charizard = TestCombatantBuilder::new(SpeciesId::Charizard, 50)
            .with_stat(Stat::SpecialAttack, 100)
            .build();
        let field = create_test_field(vec![charizard], vec![special_defender()]);

        let stab = calculate(&field, MoveId::Flamethrower, &deterministic_config());
        let second_type = calculate(&field, MoveId::AerialAce, &deterministic_config());
        let off_type = calculate(&field, MoveId::DragonClaw, &deterministic_config());

        // 41 * 1.5
        assert_eq!(stab.damage, 61);
        // 104 Attack: (floor(floor(22 * 60 * 104 / 100) / 50) + 2) * 1.5 = 29 * 1.5
        assert_eq!(second_type.damage, 43);
        // 104 Attack: floor(floor(22 * 80 * 104 / 100) / 50) + 2 = 38, no bonus
        assert_eq!(off_type.damage, 38);
    }

    #[test]
    fn test_weather_does_not_scale_move_damage() {
        let attacker = special_attacker().build();
        let mut field = create_test_field(vec![attacker], vec![special_defender()]);
        let clear = calculate(&field, MoveId::Flamethrower, &deterministic_config());
        field.weather = Some(TimedCondition {
            kind: Weather::Sun,
            turns_remaining: 5,
        });

        let sunny = calculate(&field, MoveId::Flamethrower, &deterministic_config());

        assert_eq!(clear.damage, 41);
        assert_eq!(sunny.damage, 41);
    }

    #[rstest]
    #[case::huge_power(Some(Ability::HugePower), None, None, MoveId::Earthquake, 92)]
    #[case::huge_power_ignores_special(Some(Ability::HugePower), None, None, MoveId::Flamethrower, 41)]
    #[case::choice_band(None, Some(HeldItem::ChoiceBand), None, MoveId::Earthquake, 69)]
    #[case::choice_band_ignores_special(None, Some(HeldItem::ChoiceBand), None, MoveId::Flamethrower, 41)]
    #[case::charcoal(None, Some(HeldItem::Charcoal), None, MoveId::Flamethrower, 49)]
    #[case::mystic_water_wrong_type(None, Some(HeldItem::MysticWater), None, MoveId::Flamethrower, 41)]
    #[case::life_orb(None, Some(HeldItem::LifeOrb), None, MoveId::Flamethrower, 53)]
    #[case::blaze_at_full_hp(Some(Ability::Blaze), None, None, MoveId::Flamethrower, 41)]
    #[case::blaze_in_a_pinch(Some(Ability::Blaze), None, Some(36), MoveId::Flamethrower, 61)]
    #[case::ability_and_item_stack(Some(Ability::Blaze), Some(HeldItem::Charcoal), Some(36), MoveId::Flamethrower, 73)]
    fn test_attacker_modifiers(
        #[case] ability: Option<Ability>,
        #[case] item: Option<HeldItem>,
        #[case] hp: Option<u16>,
        #[case] move_id: MoveId,
        #[case] expected: u16,
    ) {
        // Pikachu has 110 max HP, so 36 is under a third.
        let mut builder = special_attacker();
        if let Some(ability) = ability {
            builder = builder.with_ability(ability);
        }
        if let Some(item) = item {
            builder = builder.with_item(item);
        }
        if let Some(hp) = hp {
            builder = builder.with_hp(hp);
        }
        let field = create_test_field(vec![builder.build()], vec![special_defender()]);

        let outcome = calculate(&field, move_id, &deterministic_config());

        assert_eq!(outcome.damage, expected);
    }
}

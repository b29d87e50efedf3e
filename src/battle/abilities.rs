use crate::battle::actions::{BattleAction, EffectSource};
use crate::battle::triggers::{ListenerContext, PassiveEffect, TriggerEvent, TriggerKind, ValueQuery};
use crate::errors::ListenerError;
use crate::rng::BattleRng;
use schema::{AbilityEffect, MoveCategory};

impl PassiveEffect for AbilityEffect {
    fn triggers(&self) -> &'static [TriggerKind] {
        match self {
            AbilityEffect::EntryStatDrop { .. } | AbilityEffect::EntryWeather { .. } => {
                &[TriggerKind::SwitchIn]
            }
            AbilityEffect::TurnEndStatBoost { .. } => &[TriggerKind::TurnEnd],
            AbilityEffect::ContactRecoil { .. } | AbilityEffect::ContactStatus { .. } => {
                &[TriggerKind::ContactReceived]
            }
            AbilityEffect::PinchTypeBoost { .. }
            | AbilityEffect::AttackMultiplier { .. }
            | AbilityEffect::WeatherSpeed { .. } => &[],
        }
    }

    fn can_apply(&self, cx: &ListenerContext<'_>) -> bool {
        match (self, cx.event) {
            (AbilityEffect::EntryStatDrop { .. }, TriggerEvent::SwitchIn { slot }) => {
                cx.is_owner(*slot) && cx.owner_active()
            }
            (AbilityEffect::EntryWeather { weather, .. }, TriggerEvent::SwitchIn { slot }) => {
                cx.is_owner(*slot)
                    && cx.owner_active()
                    && cx.field.current_weather() != Some(*weather)
            }
            (AbilityEffect::TurnEndStatBoost { .. }, TriggerEvent::TurnEnd) => cx.owner_active(),
            // Contact abilities still punish the attacker when the holder was knocked out by the hit.
            (AbilityEffect::ContactRecoil { .. }, TriggerEvent::ContactReceived { defender, attacker }) => {
                cx.is_owner(*defender) && cx.field.is_active(*attacker)
            }
            (
                AbilityEffect::ContactStatus { .. },
                TriggerEvent::ContactReceived { defender, attacker },
            ) => {
                cx.is_owner(*defender)
                    && cx
                        .field
                        .active_combatant(*attacker)
                        .is_some_and(|c| c.status.is_none())
            }
            _ => false,
        }
    }

    fn process(
        &self,
        cx: &ListenerContext<'_>,
        rng: &mut BattleRng,
    ) -> Result<Vec<BattleAction>, ListenerError> {
        let owner = cx.owner()?;
        let holder = cx.listener.owner;
        let actions = match (self, cx.event) {
            (AbilityEffect::EntryStatDrop { stat, stages }, _) => {
                let mut actions = vec![BattleAction::message(format!(
                    "{}'s {} affects the opposing side!",
                    owner.name(),
                    cx.label
                ))];
                actions.extend(cx.field.active_opponents(holder).into_iter().map(|target| {
                    BattleAction::StatChange {
                        target,
                        stat: *stat,
                        stages: *stages,
                    }
                }));
                actions
            }
            (AbilityEffect::EntryWeather { weather, turns }, _) => vec![BattleAction::SetWeather {
                weather: *weather,
                turns: *turns,
                source: Some(holder),
            }],
            (AbilityEffect::TurnEndStatBoost { stat, stages }, _) => vec![BattleAction::StatChange {
                target: holder,
                stat: *stat,
                stages: *stages,
            }],
            (
                AbilityEffect::ContactRecoil { denominator },
                TriggerEvent::ContactReceived { attacker, .. },
            ) => vec![BattleAction::ContactDamage {
                attacker: *attacker,
                holder,
                denominator: *denominator,
                cause: EffectSource::from(cx.listener.source),
            }],
            (
                AbilityEffect::ContactStatus { status, chance },
                TriggerEvent::ContactReceived { attacker, .. },
            ) => {
                if rng.chance(*chance, cx.label) {
                    vec![
                        BattleAction::message(format!("{}'s {}!", owner.name(), cx.label)),
                        BattleAction::ApplyStatus {
                            target: *attacker,
                            status: *status,
                            source: Some(holder),
                        },
                    ]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        };
        Ok(actions)
    }

    fn modify_value(&self, query: &ValueQuery<'_>) -> f64 {
        match (self, query) {
            (
                AbilityEffect::AttackMultiplier {
                    category,
                    multiplier,
                },
                ValueQuery::Damage { move_data, .. },
            ) if move_data.category == *category => *multiplier,
            (
                AbilityEffect::PinchTypeBoost {
                    element,
                    multiplier,
                },
                ValueQuery::Damage {
                    move_data,
                    user_hp_ratio,
                    ..
                },
            ) if move_data.element == *element
                && move_data.category != MoveCategory::Status
                && *user_hp_ratio <= 1.0 / 3.0 =>
            {
                *multiplier
            }
            (
                AbilityEffect::WeatherSpeed {
                    weather,
                    multiplier,
                },
                ValueQuery::Speed {
                    weather: Some(current),
                },
            ) if current == weather => *multiplier,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{ElementType, MoveData, MoveId, Weather};

    fn ember() -> MoveData {
        MoveData::attack(MoveId::Ember, "Ember", ElementType::Fire, MoveCategory::Special, 40, Some(100), 25)
    }

    #[test]
    fn test_pinch_boost_only_below_a_third() {
        let blaze = AbilityEffect::PinchTypeBoost {
            element: ElementType::Fire,
            multiplier: 1.5,
        };
        let ember = ember();
        let healthy = ValueQuery::Damage {
            move_data: &ember,
            effectiveness: 1.0,
            user_hp_ratio: 0.9,
        };
        let pinched = ValueQuery::Damage {
            move_data: &ember,
            effectiveness: 1.0,
            user_hp_ratio: 0.3,
        };
        assert_eq!(blaze.modify_value(&healthy), 1.0);
        assert_eq!(blaze.modify_value(&pinched), 1.5);
    }

    #[test]
    fn test_weather_speed_needs_matching_weather() {
        let swift_swim = AbilityEffect::WeatherSpeed {
            weather: Weather::Rain,
            multiplier: 2.0,
        };
        assert_eq!(
            swift_swim.modify_value(&ValueQuery::Speed {
                weather: Some(Weather::Rain)
            }),
            2.0
        );
        assert_eq!(
            swift_swim.modify_value(&ValueQuery::Speed {
                weather: Some(Weather::Sun)
            }),
            1.0
        );
        assert_eq!(swift_swim.modify_value(&ValueQuery::Speed { weather: None }), 1.0);
    }

    #[test]
    fn test_modifier_only_abilities_listen_to_nothing() {
        let huge_power = AbilityEffect::AttackMultiplier {
            category: MoveCategory::Physical,
            multiplier: 2.0,
        };
        assert!(huge_power.triggers().is_empty());
    }
}

use crate::battle::actions::{BattleAction, EffectSource};
use crate::battle::context::BattleRuntime;
use crate::battle::field::{SideId, SlotId};
use crate::battle::pipeline::{StepSignal, TurnContext, TurnStep};
use crate::battle::triggers::TriggerEvent;
use crate::battle::turn_order::sort_actions;
use crate::combatant::StatusCondition;
use crate::errors::{BattleResult, ContractViolation};
use crate::telemetry::TelemetryEvent;
use crate::view::ViewEvent;
use schema::{ElementType, MoveBehavior, StatusType, Terrain, Weather};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Clears per-turn counters and fires turn-start listeners.
pub struct TurnStartStep;

impl TurnStep for TurnStartStep {
    fn name(&self) -> &'static str {
        "turn-start"
    }

    fn execute(&self, rt: &mut BattleRuntime, turn: &mut TurnContext) -> BattleResult<StepSignal> {
        for side in SideId::BOTH {
            for slot in rt.ctx.field.side_mut(side).slots.iter_mut() {
                slot.reset_turn_counters();
            }
        }
        rt.ctx
            .telemetry
            .publish(&TelemetryEvent::TurnStarted { turn: turn.turn });
        rt.view.present(&ViewEvent::TurnStarted { turn: turn.turn });

        let reactions = rt.ctx.publish(&TriggerEvent::TurnStart);
        let report = rt.run_actions(reactions)?;
        turn.record(report);
        Ok(StepSignal::Continue)
    }
}

/// Polls one action per active slot. Slots locked into a two-turn move get
/// the continuation instead.
pub struct ActionCollectionStep;

impl TurnStep for ActionCollectionStep {
    fn name(&self) -> &'static str {
        "action-collection"
    }

    fn execute(&self, rt: &mut BattleRuntime, turn: &mut TurnContext) -> BattleResult<StepSignal> {
        let catalog = Arc::clone(&rt.ctx.catalog);
        let mut announcements = Vec::new();

        for slot in rt.ctx.field.active_slots() {
            let Some(member) = rt.ctx.field.occupant_member(slot) else {
                continue;
            };
            let forced = rt
                .ctx
                .field
                .slot(slot)
                .and_then(|battle_slot| battle_slot.move_state.forced_move());

            let action = match forced {
                Some((move_id, target)) => BattleAction::UseMove {
                    user: slot,
                    member,
                    move_id,
                    target,
                },
                None => {
                    let provider = &mut rt.providers[slot.side.index()];
                    match provider.choose_action(&rt.ctx.field, slot, catalog.as_ref()) {
                        Some(action) => validate_choice(action, slot, member)?,
                        None => {
                            debug!(%slot, "provider returned no action");
                            continue;
                        }
                    }
                }
            };

            if let BattleAction::UseMove { move_id, .. } = &action {
                let move_data = catalog.require_move(*move_id)?;
                if forced.is_none() && move_data.behavior == MoveBehavior::Focus {
                    if let Some(battle_slot) = rt.ctx.field.slot_mut(slot) {
                        battle_slot.focusing = true;
                    }
                    let name = rt
                        .ctx
                        .field
                        .combatant_at(slot)
                        .map(|c| c.name().to_string())
                        .unwrap_or_default();
                    announcements.push(BattleAction::message(format!(
                        "{} is tightening its focus!",
                        name
                    )));
                }
            }
            turn.collected.push(action);
        }

        if !announcements.is_empty() {
            let report = rt.run_actions(announcements)?;
            turn.record(report);
        }
        Ok(StepSignal::Continue)
    }
}

/// Only moves and switches for the polled slot may be chosen. The member is
/// pinned to whoever is standing in the slot now.
fn validate_choice(action: BattleAction, polled: SlotId, member: usize) -> BattleResult<BattleAction> {
    match action {
        BattleAction::UseMove {
            user,
            move_id,
            target,
            ..
        } => {
            if user != polled {
                return Err(ContractViolation::ForeignAction {
                    polled,
                    owner: Some(user),
                }
                .into());
            }
            Ok(BattleAction::UseMove {
                user,
                member,
                move_id,
                target,
            })
        }
        BattleAction::Switch { slot, member } => {
            if slot != polled {
                return Err(ContractViolation::ForeignAction {
                    polled,
                    owner: Some(slot),
                }
                .into());
            }
            Ok(BattleAction::Switch { slot, member })
        }
        other => Err(ContractViolation::UnselectableAction {
            polled,
            kind: other.kind(),
        }
        .into()),
    }
}

pub struct ActionSortingStep;

impl TurnStep for ActionSortingStep {
    fn name(&self) -> &'static str {
        "action-sorting"
    }

    fn execute(&self, rt: &mut BattleRuntime, turn: &mut TurnContext) -> BattleResult<StepSignal> {
        let catalog = Arc::clone(&rt.ctx.catalog);
        turn.sorted = sort_actions(
            turn.collected.clone(),
            &rt.ctx.field,
            catalog.as_ref(),
            &mut rt.ctx.rng,
        )?;
        Ok(StepSignal::Continue)
    }
}

pub struct ActionExecutionStep;

impl TurnStep for ActionExecutionStep {
    fn name(&self) -> &'static str {
        "action-execution"
    }

    fn execute(&self, rt: &mut BattleRuntime, turn: &mut TurnContext) -> BattleResult<StepSignal> {
        let report = rt.run_actions(turn.sorted.clone())?;
        turn.record(report);
        Ok(StepSignal::Continue)
    }
}

/// Weather and status chip damage, grassy terrain healing, then duration countdowns.
pub struct EndOfTurnFieldStep;

impl EndOfTurnFieldStep {
    fn residual_actions(rt: &BattleRuntime) -> Vec<BattleAction> {
        let field = &rt.ctx.field;
        let weather = field.current_weather();
        let terrain = field.current_terrain();
        let mut actions = Vec::new();

        for slot in field.active_slots() {
            let Some(combatant) = field.active_combatant(slot) else {
                continue;
            };

            let weather_chip = match weather {
                Some(Weather::Sandstorm) => ![ElementType::Rock, ElementType::Ground, ElementType::Steel]
                    .iter()
                    .any(|&element| combatant.has_type(element)),
                Some(Weather::Hail) => !combatant.has_type(ElementType::Ice),
                _ => false,
            };
            if let (true, Some(kind)) = (weather_chip, weather) {
                actions.push(BattleAction::Damage {
                    target: slot,
                    amount: combatant.fraction_of_max_hp(16),
                    source: EffectSource::Weather(kind),
                });
            }

            match combatant.status {
                Some(StatusCondition::Burn) => actions.push(BattleAction::Damage {
                    target: slot,
                    amount: combatant.fraction_of_max_hp(16),
                    source: EffectSource::Status(StatusType::Burn),
                }),
                Some(StatusCondition::Poison) => actions.push(BattleAction::Damage {
                    target: slot,
                    amount: combatant.fraction_of_max_hp(8),
                    source: EffectSource::Status(StatusType::Poison),
                }),
                _ => {}
            }

            if terrain == Some(Terrain::Grassy) && !combatant.is_full_hp() {
                actions.push(BattleAction::Heal {
                    target: slot,
                    amount: combatant.fraction_of_max_hp(16),
                    source: EffectSource::Terrain(Terrain::Grassy),
                });
            }
        }
        actions
    }

    fn tick_durations(rt: &mut BattleRuntime) -> BattleResult<()> {
        let field = &mut rt.ctx.field;

        let mut weather_ended = None;
        if let Some(weather) = field.weather.as_mut() {
            weather.turns_remaining = weather.turns_remaining.saturating_sub(1);
            if weather.turns_remaining == 0 {
                weather_ended = Some(weather.kind);
            }
        }
        if let Some(kind) = weather_ended {
            field.weather = None;
            rt.view.present(&ViewEvent::WeatherEnded(kind));
        }

        let mut terrain_ended = None;
        if let Some(terrain) = rt.ctx.field.terrain.as_mut() {
            terrain.turns_remaining = terrain.turns_remaining.saturating_sub(1);
            if terrain.turns_remaining == 0 {
                terrain_ended = Some(terrain.kind);
            }
        }
        if let Some(kind) = terrain_ended {
            rt.ctx.field.terrain = None;
            rt.view.present(&ViewEvent::TerrainEnded(kind));
        }

        for side in SideId::BOTH {
            let screens = &mut rt.ctx.field.side_mut(side).screens;
            for turns in screens.values_mut() {
                *turns = turns.saturating_sub(1);
            }
            let expired: Vec<_> = screens
                .iter()
                .filter(|(_, turns)| **turns == 0)
                .map(|(screen, _)| *screen)
                .collect();
            for screen in expired {
                screens.remove(&screen);
                rt.view.present(&ViewEvent::ScreenEnded { side, screen });
            }
        }

        if weather_ended.is_some() {
            let reactions = rt.ctx.publish(&TriggerEvent::WeatherChange { weather: None });
            rt.run_actions(reactions)?;
        }
        Ok(())
    }
}

impl TurnStep for EndOfTurnFieldStep {
    fn name(&self) -> &'static str {
        "end-of-turn-field"
    }

    fn execute(&self, rt: &mut BattleRuntime, turn: &mut TurnContext) -> BattleResult<StepSignal> {
        let residual = Self::residual_actions(rt);
        let report = rt.run_actions(residual)?;
        turn.record(report);
        Self::tick_durations(rt)?;
        Ok(StepSignal::Continue)
    }
}

/// Replaces fainted occupants from the bench.
pub struct FaintedCheckStep;

impl TurnStep for FaintedCheckStep {
    fn name(&self) -> &'static str {
        "fainted-check"
    }

    fn execute(&self, rt: &mut BattleRuntime, turn: &mut TurnContext) -> BattleResult<StepSignal> {
        let mut switches = Vec::new();

        for side in SideId::BOTH {
            let mut claimed = BTreeSet::new();
            let fainted_slots: Vec<SlotId> = {
                let battle_side = rt.ctx.field.side(side);
                (0..battle_side.slots.len())
                    .filter(|&index| battle_side.occupant(index).is_some_and(|c| c.is_fainted()))
                    .map(|index| battle_side.slot_id(index))
                    .collect()
            };

            for slot in fainted_slots {
                let bench = rt.ctx.field.side(side).bench();
                if bench.iter().all(|member| claimed.contains(member)) {
                    continue;
                }
                let provider = &mut rt.providers[side.index()];
                let Some(member) = provider.choose_replacement(&rt.ctx.field, slot) else {
                    debug!(%slot, "no replacement chosen");
                    continue;
                };
                if !bench.contains(&member) || !claimed.insert(member) {
                    return Err(ContractViolation::InvalidReplacement { slot, member }.into());
                }
                switches.push(BattleAction::Switch { slot, member });
            }
        }

        if !switches.is_empty() {
            turn.fainted_pending = true;
            let report = rt.run_actions(switches)?;
            turn.record(report);
        }
        Ok(StepSignal::Continue)
    }
}

/// Turn-end listeners such as recurring heals and stat boosts.
pub struct TurnEndTriggersStep;

impl TurnStep for TurnEndTriggersStep {
    fn name(&self) -> &'static str {
        "turn-end-triggers"
    }

    fn runs_when_fainted_pending(&self) -> bool {
        true
    }

    fn execute(&self, rt: &mut BattleRuntime, turn: &mut TurnContext) -> BattleResult<StepSignal> {
        let reactions = rt.ctx.publish(&TriggerEvent::TurnEnd);
        let report = rt.run_actions(reactions)?;
        turn.record(report);
        rt.ctx
            .telemetry
            .publish(&TelemetryEvent::TurnEnded { turn: turn.turn });
        Ok(StepSignal::Continue)
    }
}

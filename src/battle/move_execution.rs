//! Resolution of a single `UseMove` action.
//!
//! Everything a move causes beyond its own bookkeeping (damage, status,
//! stat changes, recoil, field effects) is returned as reactions so it runs
//! through the queue in order.

use crate::battle::actions::{ActionOutcome, BattleAction, EffectSource};
use crate::battle::context::BattleContext;
use crate::battle::damage::DamageContext;
use crate::battle::field::{BattleField, MoveState, SlotId};
use crate::battle::triggers::TriggerEvent;
use crate::battle::turn_order::accuracy_stage_multiplier;
use crate::combatant::StatusCondition;
use crate::errors::{BattleResult, ContractViolation};
use crate::view::ViewEvent;
use schema::{
    EffectTarget, ElementType, MoveBehavior, MoveCategory, MoveData, MoveEffect, MoveId,
    MoveTarget, ScreenKind, SemiInvulnerableKind, Stat, Weather,
};
use std::sync::Arc;
use tracing::debug;

/// Weather, terrain and screens set by moves last this many turns.
pub const FIELD_EFFECT_TURNS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    Executed,
    /// Sleep, freeze or paralysis stopped the user.
    Prevented,
    /// First turn of a two-turn move.
    Charging,
    Failed,
    /// The user was gone by the time the move came up.
    Fizzled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetResult {
    Hit {
        damage: u16,
        critical: bool,
        effectiveness: f64,
    },
    Missed,
    Protected,
    Immune,
    Failed,
}

/// Per-target record of how a move resolved, kept for the turn context.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResolution {
    pub move_id: MoveId,
    pub status: MoveStatus,
    pub targets: Vec<(SlotId, TargetResult)>,
}

impl MoveResolution {
    fn new(move_id: MoveId, status: MoveStatus) -> Self {
        Self {
            move_id,
            status,
            targets: Vec::new(),
        }
    }

    pub fn hit_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|(_, result)| matches!(result, TargetResult::Hit { .. }))
            .count()
    }
}

fn finish(mut outcome: ActionOutcome, resolution: MoveResolution) -> BattleResult<ActionOutcome> {
    outcome.resolution = Some(resolution);
    Ok(outcome)
}

pub(crate) fn execute_move(
    ctx: &mut BattleContext,
    user: SlotId,
    member: usize,
    move_id: MoveId,
    target: Option<SlotId>,
) -> BattleResult<ActionOutcome> {
    let mut outcome = ActionOutcome::default();
    let catalog = Arc::clone(&ctx.catalog);

    // 1. The combatant that chose this move must still be standing in the slot.
    let slot = ctx.field.slot(user).ok_or(ContractViolation::UnknownSlot(user))?;
    if slot.occupant != Some(member) || !ctx.field.is_active(user) {
        debug!(%user, %move_id, "move fizzled: user is gone");
        return finish(outcome, MoveResolution::new(move_id, MoveStatus::Fizzled));
    }
    let forced = slot.move_state.forced_move().map(|(forced_id, _)| forced_id) == Some(move_id);

    let Some(combatant) = ctx.field.combatant_at_mut(user) else {
        return finish(outcome, MoveResolution::new(move_id, MoveStatus::Fizzled));
    };
    let name = combatant.name().to_string();

    // 2. Status that can stop the user acting.
    let prevented = match combatant.status {
        Some(StatusCondition::Sleep(turns)) if turns > 0 => {
            combatant.status = Some(StatusCondition::Sleep(turns - 1));
            outcome.message(format!("{} is fast asleep.", name));
            true
        }
        Some(condition @ StatusCondition::Sleep(_)) => {
            combatant.status = None;
            outcome.notice(ViewEvent::StatusCured {
                target: user,
                name: name.clone(),
                status: condition,
            });
            false
        }
        Some(condition @ StatusCondition::Freeze) => {
            if ctx.rng.chance(20, "thaw") {
                combatant.status = None;
                outcome.notice(ViewEvent::StatusCured {
                    target: user,
                    name: name.clone(),
                    status: condition,
                });
                false
            } else {
                outcome.message(format!("{} is frozen solid!", name));
                true
            }
        }
        Some(StatusCondition::Paralysis) => {
            if ctx.rng.chance(25, "full paralysis") {
                outcome.message(format!("{} is paralyzed! It can't move!", name));
                true
            } else {
                false
            }
        }
        _ => false,
    };
    if prevented {
        reset_user_state(&mut ctx.field, user);
        return finish(outcome, MoveResolution::new(move_id, MoveStatus::Prevented));
    }

    // 3. Focus moves fail once the user has been hit this turn.
    let chosen_data = catalog.require_move(move_id)?;
    if chosen_data.behavior == MoveBehavior::Focus {
        if let Some(slot) = ctx.field.slot_mut(user) {
            let lost_focus = slot.damage_taken_this_turn() > 0;
            slot.focusing = false;
            if lost_focus {
                outcome.message(format!("{} lost its focus and couldn't move!", name));
                return finish(outcome, MoveResolution::new(move_id, MoveStatus::Failed));
            }
        }
    }

    // 4. PP. A forced continuation was paid for on the first turn.
    let mut move_id = move_id;
    if !forced && move_id != MoveId::Struggle {
        let paid = ctx
            .field
            .combatant_at_mut(user)
            .is_some_and(|combatant| combatant.use_pp(move_id));
        if !paid {
            outcome.message(format!("{} has no moves left!", name));
            move_id = MoveId::Struggle;
        }
    }
    let move_data = catalog.require_move(move_id)?;

    // 5. Two-turn moves and protect bookkeeping.
    if let Some(slot) = ctx.field.slot_mut(user) {
        if move_data.behavior != MoveBehavior::Protect {
            slot.protect_streak = 0;
        }
        if forced {
            slot.move_state = MoveState::Idle;
        }
    }
    if !forced {
        match move_data.behavior {
            MoveBehavior::Charge { skip_in }
                if skip_in.is_none() || skip_in != ctx.field.current_weather() =>
            {
                if let Some(slot) = ctx.field.slot_mut(user) {
                    slot.move_state = MoveState::Charging { move_id, target };
                }
                outcome.message(charge_message(&name, move_data));
                return finish(outcome, MoveResolution::new(move_id, MoveStatus::Charging));
            }
            MoveBehavior::SemiInvulnerable(kind) => {
                if let Some(slot) = ctx.field.slot_mut(user) {
                    slot.move_state = MoveState::SemiInvulnerable {
                        move_id,
                        kind,
                        target,
                    };
                }
                outcome.message(match kind {
                    SemiInvulnerableKind::Underground => format!("{} burrowed its way under the ground!", name),
                    SemiInvulnerableKind::Airborne => format!("{} flew up high!", name),
                });
                return finish(outcome, MoveResolution::new(move_id, MoveStatus::Charging));
            }
            _ => {}
        }
    }

    // 6. Before-move listeners get the first reactions.
    let before = ctx.publish(&TriggerEvent::BeforeMove { user, move_id });
    outcome.reactions.extend(before);

    // 7. Announce.
    outcome.notice(ViewEvent::MoveUsed {
        user,
        name: name.clone(),
        move_id,
        move_name: move_data.name.clone(),
    });

    // 8. Targets.
    let targets = resolve_targets(&ctx.field, user, move_data, target);
    let aims_at_others = matches!(
        move_data.target,
        MoveTarget::SingleOpponent | MoveTarget::AllOpponents | MoveTarget::AllOthers
    );
    if aims_at_others && targets.is_empty() {
        outcome.message("But it failed!");
        set_last_move(&mut ctx.field, user, move_id);
        return finish(outcome, MoveResolution::new(move_id, MoveStatus::Failed));
    }

    // 9. Per target.
    let mut resolution = MoveResolution::new(move_id, MoveStatus::Executed);
    let mut total_damage: u32 = 0;
    for &defender in &targets {
        let result = resolve_target(ctx, &mut outcome, user, defender, move_data, targets.len())?;
        if let TargetResult::Hit { damage, .. } = result {
            total_damage += u32::from(damage);
        }
        resolution.targets.push((defender, result));
    }

    // 10. Effects on the user and the field.
    let landed = !move_data.is_damaging() || resolution.hit_count() > 0;
    if landed && !apply_self_effects(ctx, &mut outcome, user, &name, move_data, total_damage) {
        resolution.status = MoveStatus::Failed;
    }

    // 11 and 12.
    set_last_move(&mut ctx.field, user, move_id);
    outcome.react(BattleAction::AfterMove {
        user,
        move_id,
        dealt_damage: total_damage > 0,
    });
    finish(outcome, resolution)
}

fn charge_message(name: &str, move_data: &MoveData) -> String {
    match move_data.element {
        ElementType::Grass => format!("{} absorbed light!", name),
        _ => format!("{} is charging up {}!", name, move_data.name),
    }
}

fn reset_user_state(field: &mut BattleField, user: SlotId) {
    if let Some(slot) = field.slot_mut(user) {
        slot.move_state = MoveState::Idle;
        slot.focusing = false;
    }
}

fn set_last_move(field: &mut BattleField, user: SlotId, move_id: MoveId) {
    if let Some(slot) = field.slot_mut(user) {
        slot.last_move = Some(move_id);
    }
}

/// Works out who a move hits right now. A single target that has left or
/// fainted is replaced by the first live opponent.
fn resolve_targets(
    field: &BattleField,
    user: SlotId,
    move_data: &MoveData,
    chosen: Option<SlotId>,
) -> Vec<SlotId> {
    if let MoveBehavior::Counter(_) = move_data.behavior {
        return field
            .slot(user)
            .and_then(|slot| slot.last_attacker)
            .filter(|&attacker| attacker.side != user.side && field.is_active(attacker))
            .into_iter()
            .collect();
    }
    match move_data.target {
        MoveTarget::SingleOpponent => match chosen {
            Some(slot) if slot != user && field.is_active(slot) => vec![slot],
            _ => field.active_opponents(user).into_iter().take(1).collect(),
        },
        MoveTarget::AllOpponents => field.active_opponents(user),
        MoveTarget::AllOthers => {
            let mut targets = field.active_opponents(user);
            targets.extend(field.active_allies(user));
            targets
        }
        MoveTarget::User | MoveTarget::UserSide | MoveTarget::Field => Vec::new(),
    }
}

fn can_hit_semi_invulnerable(kind: SemiInvulnerableKind, move_id: MoveId) -> bool {
    matches!(
        (kind, move_id),
        (SemiInvulnerableKind::Underground, MoveId::Earthquake)
    )
}

fn resolve_target(
    ctx: &mut BattleContext,
    outcome: &mut ActionOutcome,
    user: SlotId,
    defender: SlotId,
    move_data: &MoveData,
    target_count: usize,
) -> BattleResult<TargetResult> {
    let user_name = ctx
        .field
        .combatant_at(user)
        .map(|c| c.name().to_string())
        .unwrap_or_default();
    let (defender_name, defender_hp, defender_types, defender_slot) = {
        let combatant = ctx
            .field
            .active_combatant(defender)
            .ok_or(ContractViolation::UnknownSlot(defender))?;
        let slot = ctx
            .field
            .slot(defender)
            .ok_or(ContractViolation::UnknownSlot(defender))?;
        (
            combatant.name().to_string(),
            combatant.current_hp,
            combatant.types.clone(),
            slot.clone(),
        )
    };

    if move_data.flags.protectable && defender_slot.protected && defender != user {
        outcome.notice(ViewEvent::Protected {
            target: defender,
            name: defender_name,
        });
        return Ok(TargetResult::Protected);
    }

    if let MoveState::SemiInvulnerable { kind, .. } = defender_slot.move_state {
        if !can_hit_semi_invulnerable(kind, move_data.id) {
            outcome.notice(ViewEvent::MoveMissed {
                user,
                name: user_name,
            });
            return Ok(TargetResult::Missed);
        }
    }

    if let Some(accuracy) = move_data.accuracy {
        let accuracy_stage = ctx
            .field
            .slot(user)
            .map(|slot| slot.stage(Stat::Accuracy))
            .unwrap_or(0);
        let stage = accuracy_stage
            .saturating_sub(defender_slot.stage(Stat::Evasion))
            .clamp(-6, 6);
        let threshold = f64::from(accuracy) * accuracy_stage_multiplier(stage);
        let roll = ctx.rng.roll_percent("accuracy");
        if f64::from(roll) > threshold {
            outcome.notice(ViewEvent::MoveMissed {
                user,
                name: user_name,
            });
            return Ok(TargetResult::Missed);
        }
    }

    let effectiveness = ElementType::effectiveness_against(move_data.element, &defender_types);
    let mut hit = TargetResult::Hit {
        damage: 0,
        critical: false,
        effectiveness,
    };

    if move_data.is_damaging() {
        if effectiveness == 0.0 {
            outcome.message(format!("It doesn't affect {}...", defender_name));
            return Ok(TargetResult::Immune);
        }
        let (damage, critical) = match move_data.behavior {
            MoveBehavior::Counter(category) => {
                let taken = ctx
                    .field
                    .slot(user)
                    .map(|slot| match category {
                        MoveCategory::Special => slot.special_damage_taken,
                        _ => slot.physical_damage_taken,
                    })
                    .unwrap_or(0);
                if taken == 0 {
                    outcome.message("But it failed!");
                    return Ok(TargetResult::Failed);
                }
                (taken.saturating_mul(2), false)
            }
            MoveBehavior::LevelDamage => {
                let level = ctx.field.combatant_at(user).map(|c| c.level).unwrap_or(1);
                (u16::from(level), false)
            }
            _ => {
                let dc = DamageContext::new(
                    user,
                    defender,
                    move_data,
                    &ctx.field,
                    ctx.catalog.as_ref(),
                    &ctx.config,
                    target_count,
                );
                let result = ctx.damage.calculate(dc, &mut ctx.rng)?;
                if result.damage == 0 {
                    outcome.message(format!("It doesn't affect {}...", defender_name));
                    return Ok(TargetResult::Immune);
                }
                if result.critical {
                    outcome.notice(ViewEvent::CriticalHit);
                }
                if result.effectiveness != 1.0 {
                    outcome.notice(ViewEvent::Effectiveness {
                        multiplier: result.effectiveness,
                    });
                }
                (result.damage, result.critical)
            }
        };

        let dealt = damage.min(defender_hp);
        outcome.react(BattleAction::Damage {
            target: defender,
            amount: damage,
            source: EffectSource::Move {
                move_id: move_data.id,
                user,
                category: move_data.category,
                contact: move_data.flags.contact,
            },
        });
        hit = TargetResult::Hit {
            damage: dealt,
            critical,
            effectiveness,
        };
    }

    for effect in &move_data.effects {
        match effect {
            MoveEffect::Status { status, chance } => {
                if ctx.rng.chance(*chance, "secondary status") {
                    outcome.react(BattleAction::ApplyStatus {
                        target: defender,
                        status: *status,
                        source: Some(user),
                    });
                }
            }
            MoveEffect::StatChange {
                target: EffectTarget::Target,
                stat,
                stages,
                chance,
            } => {
                if ctx.rng.chance(*chance, "secondary stat change") {
                    outcome.react(BattleAction::StatChange {
                        target: defender,
                        stat: *stat,
                        stages: *stages,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(hit)
}

/// Effects that land on the user or the field once the targets are done.
/// Returns false if the move failed at this point.
fn apply_self_effects(
    ctx: &mut BattleContext,
    outcome: &mut ActionOutcome,
    user: SlotId,
    name: &str,
    move_data: &MoveData,
    total_damage: u32,
) -> bool {
    let mut succeeded = true;
    let max_hp = ctx.field.combatant_at(user).map(|c| c.max_hp()).unwrap_or(0);
    let percent_of = |amount: u32, percent: u8| -> u16 {
        let value = amount * u32::from(percent) / 100;
        value.clamp(1, u32::from(u16::MAX)) as u16
    };

    for effect in &move_data.effects {
        match effect {
            MoveEffect::Recoil(percent) if total_damage > 0 => {
                outcome.react(BattleAction::Damage {
                    target: user,
                    amount: percent_of(total_damage, *percent),
                    source: EffectSource::Recoil(move_data.id),
                });
            }
            MoveEffect::Drain(percent) if total_damage > 0 => {
                outcome.react(BattleAction::Heal {
                    target: user,
                    amount: percent_of(total_damage, *percent),
                    source: EffectSource::Drain(move_data.id),
                });
            }
            MoveEffect::StatChange {
                target: EffectTarget::User,
                stat,
                stages,
                chance,
            } => {
                if ctx.rng.chance(*chance, "self stat change") {
                    outcome.react(BattleAction::StatChange {
                        target: user,
                        stat: *stat,
                        stages: *stages,
                    });
                }
            }
            MoveEffect::Heal(percent) => {
                outcome.react(BattleAction::Heal {
                    target: user,
                    amount: percent_of(u32::from(max_hp), *percent),
                    source: EffectSource::Move {
                        move_id: move_data.id,
                        user,
                        category: move_data.category,
                        contact: false,
                    },
                });
            }
            MoveEffect::SetWeather(weather) => outcome.react(BattleAction::SetWeather {
                weather: *weather,
                turns: FIELD_EFFECT_TURNS,
                source: Some(user),
            }),
            MoveEffect::SetTerrain(terrain) => outcome.react(BattleAction::SetTerrain {
                terrain: *terrain,
                turns: FIELD_EFFECT_TURNS,
                source: Some(user),
            }),
            MoveEffect::SetScreen(screen) => {
                if *screen == ScreenKind::AuroraVeil
                    && ctx.field.current_weather() != Some(Weather::Hail)
                {
                    outcome.message("But it failed!");
                    succeeded = false;
                } else {
                    outcome.react(BattleAction::SetScreen {
                        side: user.side,
                        screen: *screen,
                        turns: FIELD_EFFECT_TURNS,
                    });
                }
            }
            _ => {}
        }
    }

    if move_data.behavior == MoveBehavior::Protect {
        let streak = ctx.field.slot(user).map(|slot| slot.protect_streak).unwrap_or(0);
        let protected = streak == 0
            || ctx
                .rng
                .probability(1.0 / 3f64.powi(i32::from(streak)), "protect streak");
        if let Some(slot) = ctx.field.slot_mut(user) {
            if protected {
                slot.protected = true;
                slot.protect_streak = slot.protect_streak.saturating_add(1);
            } else {
                slot.protect_streak = 0;
            }
        }
        if protected {
            outcome.message(format!("{} protected itself!", name));
        } else {
            outcome.message("But it failed!");
            succeeded = false;
        }
    }

    succeeded
}

use crate::battle::context::BattleContext;
use crate::battle::field::{SideId, SlotId, TimedCondition};
use crate::battle::move_execution::{self, MoveResolution};
use crate::battle::triggers::{ListenerSource, TriggerEvent};
use crate::catalog::DataCatalog;
use crate::combatant::StatusCondition;
use crate::errors::{BattleResult, CatalogError, ContractViolation};
use crate::telemetry::TelemetryEvent;
use crate::view::ViewEvent;
use schema::{
    Ability, ElementType, HeldItem, ItemEffect, MoveCategory, MoveId, ScreenKind, Stat,
    StatusType, Terrain, Weather,
};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use tracing::debug;

/// Switching always goes before any move.
pub const SWITCH_PRIORITY: i8 = 6;

/// What caused a change in HP.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum EffectSource {
    Move {
        move_id: MoveId,
        user: SlotId,
        category: MoveCategory,
        contact: bool,
    },
    Recoil(MoveId),
    Drain(MoveId),
    Weather(Weather),
    Terrain(Terrain),
    Status(StatusType),
    Ability(Ability),
    Item(HeldItem),
}

impl From<ListenerSource> for EffectSource {
    fn from(source: ListenerSource) -> Self {
        match source {
            ListenerSource::Ability(ability) => EffectSource::Ability(ability),
            ListenerSource::Item(item) => EffectSource::Item(item),
        }
    }
}

/// Atomic unit of simulation. Actions are created by steps, moves and
/// listeners, executed exactly once by the action queue, and may return
/// reactions that run immediately after them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, IntoStaticStr)]
pub enum BattleAction {
    /// `member` is the roster index that chose the move; if someone else is
    /// in the slot by the time it runs, the move fizzles.
    UseMove {
        user: SlotId,
        member: usize,
        move_id: MoveId,
        target: Option<SlotId>,
    },
    Damage {
        target: SlotId,
        amount: u16,
        source: EffectSource,
    },
    Heal {
        target: SlotId,
        amount: u16,
        source: EffectSource,
    },
    ApplyStatus {
        target: SlotId,
        status: StatusType,
        source: Option<SlotId>,
    },
    StatChange {
        target: SlotId,
        stat: Stat,
        stages: i8,
    },
    Switch {
        slot: SlotId,
        member: usize,
    },
    /// Chip damage to an attacker for touching the holder.
    ContactDamage {
        attacker: SlotId,
        holder: SlotId,
        denominator: u16,
        cause: EffectSource,
    },
    Faint {
        target: SlotId,
    },
    SetWeather {
        weather: Weather,
        turns: u8,
        source: Option<SlotId>,
    },
    SetTerrain {
        terrain: Terrain,
        turns: u8,
        source: Option<SlotId>,
    },
    SetScreen {
        side: SideId,
        screen: ScreenKind,
        turns: u8,
    },
    ConsumeItem {
        target: SlotId,
    },
    /// Publishes the after-move trigger once everything the move caused has resolved.
    AfterMove {
        user: SlotId,
        move_id: MoveId,
        dealt_damage: bool,
    },
    Message {
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    pub reactions: Vec<BattleAction>,
    pub notices: Vec<ViewEvent>,
    pub resolution: Option<MoveResolution>,
}

impl ActionOutcome {
    pub fn notice(&mut self, event: ViewEvent) {
        self.notices.push(event);
    }

    pub fn react(&mut self, action: BattleAction) {
        self.reactions.push(action);
    }

    pub fn message(&mut self, text: impl Into<String>) {
        self.notices.push(ViewEvent::Message(text.into()));
    }
}

impl BattleAction {
    pub fn message(text: impl Into<String>) -> Self {
        BattleAction::Message { text: text.into() }
    }

    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// The slot acting, if any. Field-level and bookkeeping actions have none.
    pub fn user(&self) -> Option<SlotId> {
        match self {
            BattleAction::UseMove { user, .. } => Some(*user),
            BattleAction::Switch { slot, .. } => Some(*slot),
            BattleAction::ApplyStatus { source, .. } => *source,
            BattleAction::ContactDamage { holder, .. } => Some(*holder),
            BattleAction::SetWeather { source, .. } => *source,
            BattleAction::SetTerrain { source, .. } => *source,
            BattleAction::AfterMove { user, .. } => Some(*user),
            _ => None,
        }
    }

    /// Priority bracket used by the turn-order resolver.
    pub fn priority(&self, catalog: &dyn DataCatalog) -> Result<i8, CatalogError> {
        match self {
            BattleAction::Switch { .. } => Ok(SWITCH_PRIORITY),
            BattleAction::UseMove { move_id, .. } => Ok(catalog.require_move(*move_id)?.priority),
            _ => Ok(0),
        }
    }

    pub fn execute(&self, ctx: &mut BattleContext) -> BattleResult<ActionOutcome> {
        match self {
            BattleAction::UseMove {
                user,
                member,
                move_id,
                target,
            } => move_execution::execute_move(ctx, *user, *member, *move_id, *target),
            BattleAction::Damage {
                target,
                amount,
                source,
            } => execute_damage(ctx, *target, *amount, *source),
            BattleAction::Heal { target, amount, .. } => Ok(execute_heal(ctx, *target, *amount)),
            BattleAction::ApplyStatus { target, status, .. } => {
                Ok(execute_apply_status(ctx, *target, *status))
            }
            BattleAction::StatChange {
                target,
                stat,
                stages,
            } => Ok(execute_stat_change(ctx, *target, *stat, *stages)),
            BattleAction::Switch { slot, member } => execute_switch(ctx, *slot, *member),
            BattleAction::ContactDamage {
                attacker,
                holder,
                denominator,
                cause,
            } => Ok(execute_contact_damage(ctx, *attacker, *holder, *denominator, *cause)),
            BattleAction::Faint { target } => Ok(execute_faint(ctx, *target)),
            BattleAction::SetWeather { weather, turns, .. } => {
                Ok(execute_set_weather(ctx, *weather, *turns))
            }
            BattleAction::SetTerrain { terrain, turns, .. } => {
                Ok(execute_set_terrain(ctx, *terrain, *turns))
            }
            BattleAction::SetScreen {
                side,
                screen,
                turns,
            } => Ok(execute_set_screen(ctx, *side, *screen, *turns)),
            BattleAction::ConsumeItem { target } => execute_consume_item(ctx, *target),
            BattleAction::AfterMove {
                user,
                move_id,
                dealt_damage,
            } => {
                let mut outcome = ActionOutcome::default();
                outcome.reactions = ctx.publish(&TriggerEvent::AfterMove {
                    user: *user,
                    move_id: *move_id,
                    dealt_damage: *dealt_damage,
                });
                Ok(outcome)
            }
            BattleAction::Message { text } => {
                let mut outcome = ActionOutcome::default();
                outcome.message(text.clone());
                Ok(outcome)
            }
        }
    }
}

/// Whether `status` can land on whoever is in `target` right now.
pub fn can_receive_status(ctx: &BattleContext, target: SlotId, status: StatusType) -> bool {
    let Some(combatant) = ctx.field.active_combatant(target) else {
        return false;
    };
    if combatant.status.is_some() {
        return false;
    }
    let immune_type = match status {
        StatusType::Burn => combatant.has_type(ElementType::Fire),
        StatusType::Paralysis => combatant.has_type(ElementType::Electric),
        StatusType::Poison => {
            combatant.has_type(ElementType::Poison) || combatant.has_type(ElementType::Steel)
        }
        StatusType::Freeze => {
            combatant.has_type(ElementType::Ice) || ctx.field.current_weather() == Some(Weather::Sun)
        }
        StatusType::Sleep => ctx.field.current_terrain() == Some(Terrain::Electric),
    };
    !immune_type && ctx.field.current_terrain() != Some(Terrain::Misty)
}

fn execute_damage(
    ctx: &mut BattleContext,
    target: SlotId,
    amount: u16,
    source: EffectSource,
) -> BattleResult<ActionOutcome> {
    let mut outcome = ActionOutcome::default();
    let turn = ctx.field.turn;
    let Some(combatant) = ctx.field.combatant_at_mut(target) else {
        debug!(%target, "damage fizzled: slot is empty");
        return Ok(outcome);
    };
    if combatant.is_fainted() {
        debug!(%target, "damage fizzled: target already fainted");
        return Ok(outcome);
    }

    let dealt = combatant.take_damage(amount);
    let name = combatant.name().to_string();
    let remaining_hp = combatant.current_hp;
    let max_hp = combatant.max_hp();
    let fainted = combatant.is_fainted();

    let attacker = match source {
        EffectSource::Move {
            user, category, ..
        } => {
            let slot = ctx
                .field
                .slot_mut(target)
                .ok_or(ContractViolation::UnknownSlot(target))?;
            match category {
                MoveCategory::Physical => {
                    slot.physical_damage_taken = slot.physical_damage_taken.saturating_add(dealt)
                }
                MoveCategory::Special => {
                    slot.special_damage_taken = slot.special_damage_taken.saturating_add(dealt)
                }
                MoveCategory::Status => {}
            }
            slot.last_attacker = Some(user);
            Some(user)
        }
        _ => None,
    };

    match source {
        EffectSource::Weather(weather) => {
            outcome.message(format!("{} is buffeted by the {}!", name, weather))
        }
        EffectSource::Status(StatusType::Burn) => {
            outcome.message(format!("{} is hurt by its burn!", name))
        }
        EffectSource::Status(StatusType::Poison) => {
            outcome.message(format!("{} is hurt by poison!", name))
        }
        EffectSource::Recoil(_) => outcome.message(format!("{} is damaged by recoil!", name)),
        _ => {}
    }

    outcome.notice(ViewEvent::Damaged {
        target,
        name,
        amount: dealt,
        remaining_hp,
        max_hp,
    });
    ctx.telemetry.publish(&TelemetryEvent::DamageApplied {
        turn,
        target,
        amount: dealt,
    });

    if fainted {
        outcome.react(BattleAction::Faint { target });
    }
    if dealt == 0 {
        return Ok(outcome);
    }

    let taken = ctx.publish(&TriggerEvent::DamageTaken {
        target,
        amount: dealt,
        attacker,
    });
    outcome.reactions.extend(taken);

    if let EffectSource::Move {
        move_id,
        user,
        contact,
        ..
    } = source
    {
        let dealt_event = TriggerEvent::DamageDealt {
            attacker: user,
            target,
            amount: dealt,
            move_id,
        };
        let reactions = ctx.publish(&dealt_event);
        outcome.reactions.extend(reactions);
        if contact {
            let reactions = ctx.publish(&TriggerEvent::ContactReceived {
                defender: target,
                attacker: user,
            });
            outcome.reactions.extend(reactions);
        }
    }

    Ok(outcome)
}

fn execute_heal(ctx: &mut BattleContext, target: SlotId, amount: u16) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    let Some(combatant) = ctx.field.combatant_at_mut(target) else {
        return outcome;
    };
    let healed = combatant.heal(amount);
    if healed > 0 {
        outcome.notice(ViewEvent::Healed {
            target,
            name: combatant.name().to_string(),
            amount: healed,
            remaining_hp: combatant.current_hp,
            max_hp: combatant.max_hp(),
        });
    }
    outcome
}

fn execute_apply_status(ctx: &mut BattleContext, target: SlotId, status: StatusType) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    if !can_receive_status(ctx, target, status) {
        debug!(%target, ?status, "status fizzled");
        return outcome;
    }
    let sleep_turns = if status == StatusType::Sleep {
        ctx.rng.range(1, 3, "sleep duration")
    } else {
        0
    };
    let condition = StatusCondition::from_kind(status, sleep_turns);
    if let Some(combatant) = ctx.field.combatant_at_mut(target) {
        combatant.status = Some(condition);
        outcome.notice(ViewEvent::StatusApplied {
            target,
            name: combatant.name().to_string(),
            status: condition,
        });
    }
    outcome
}

fn execute_stat_change(ctx: &mut BattleContext, target: SlotId, stat: Stat, stages: i8) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    let Some(name) = ctx.field.active_combatant(target).map(|c| c.name().to_string()) else {
        return outcome;
    };
    let Some(slot) = ctx.field.slot_mut(target) else {
        return outcome;
    };
    let change = slot.change_stage(stat, stages);
    if change == 0 {
        outcome.notice(ViewEvent::StatChangeBlocked {
            target,
            name,
            stat,
            rising: stages > 0,
        });
    } else {
        outcome.notice(ViewEvent::StatChanged {
            target,
            name,
            stat,
            change,
        });
    }
    outcome
}

fn execute_switch(ctx: &mut BattleContext, slot: SlotId, member: usize) -> BattleResult<ActionOutcome> {
    let mut outcome = ActionOutcome::default();
    let side = ctx.field.side(slot.side);
    if slot.index >= side.slots.len() {
        return Err(ContractViolation::UnknownSlot(slot).into());
    }
    let Some(incoming) = side.roster.get(member) else {
        return Err(ContractViolation::UnknownRosterMember {
            side: slot.side,
            member,
        }
        .into());
    };
    if incoming.is_fainted() || side.is_in_slot(member) {
        debug!(%slot, member, "switch fizzled: member unavailable");
        return Ok(outcome);
    }

    let name = incoming.name().to_string();
    let previous = side
        .occupant(slot.index)
        .filter(|c| !c.is_fainted())
        .map(|c| c.name().to_string());

    if let Some(battle_slot) = ctx.field.slot_mut(slot) {
        battle_slot.replace_occupant(member);
    }
    ctx.rebuild_listeners();

    outcome.notice(ViewEvent::SwitchedIn {
        slot,
        name,
        previous,
    });
    outcome.reactions = ctx.publish(&TriggerEvent::SwitchIn { slot });
    Ok(outcome)
}

fn execute_contact_damage(
    ctx: &mut BattleContext,
    attacker: SlotId,
    holder: SlotId,
    denominator: u16,
    cause: EffectSource,
) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    let Some(victim) = ctx.field.active_combatant(attacker) else {
        return outcome;
    };
    let amount = victim.fraction_of_max_hp(denominator);
    let victim_name = victim.name().to_string();
    let holder_name = ctx
        .field
        .combatant_at(holder)
        .map(|c| c.name().to_string())
        .unwrap_or_default();
    let label = match cause {
        EffectSource::Ability(ability) => ctx
            .catalog
            .ability(ability)
            .map(|data| data.name.clone())
            .unwrap_or_else(|| ability.to_string()),
        EffectSource::Item(item) => ctx
            .catalog
            .item(item)
            .map(|data| data.name.clone())
            .unwrap_or_else(|| item.to_string()),
        _ => String::from("contact"),
    };
    outcome.message(format!("{} was hurt by {}'s {}!", victim_name, holder_name, label));
    outcome.react(BattleAction::Damage {
        target: attacker,
        amount,
        source: cause,
    });
    outcome
}

fn execute_faint(ctx: &mut BattleContext, target: SlotId) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    let Some(combatant) = ctx.field.combatant_at(target) else {
        return outcome;
    };
    if !combatant.is_fainted() {
        return outcome;
    }
    let name = combatant.name().to_string();
    if let Some(slot) = ctx.field.slot_mut(target) {
        slot.move_state = Default::default();
        slot.focusing = false;
        slot.protected = false;
    }
    ctx.rebuild_listeners();
    outcome.notice(ViewEvent::Fainted { target, name });
    outcome
}

fn execute_set_weather(ctx: &mut BattleContext, weather: Weather, turns: u8) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    if ctx.field.current_weather() == Some(weather) {
        outcome.message("But it failed!");
        return outcome;
    }
    ctx.field.weather = Some(TimedCondition {
        kind: weather,
        turns_remaining: turns,
    });
    outcome.notice(ViewEvent::WeatherStarted(weather));
    outcome.reactions = ctx.publish(&TriggerEvent::WeatherChange {
        weather: Some(weather),
    });
    outcome
}

fn execute_set_terrain(ctx: &mut BattleContext, terrain: Terrain, turns: u8) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    if ctx.field.current_terrain() == Some(terrain) {
        outcome.message("But it failed!");
        return outcome;
    }
    ctx.field.terrain = Some(TimedCondition {
        kind: terrain,
        turns_remaining: turns,
    });
    outcome.notice(ViewEvent::TerrainStarted(terrain));
    outcome
}

fn execute_set_screen(ctx: &mut BattleContext, side: SideId, screen: ScreenKind, turns: u8) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    let battle_side = ctx.field.side_mut(side);
    if battle_side.has_screen(screen) {
        outcome.message("But it failed!");
        return outcome;
    }
    battle_side.screens.insert(screen, turns);
    outcome.notice(ViewEvent::ScreenRaised { side, screen });
    outcome
}

fn execute_consume_item(ctx: &mut BattleContext, target: SlotId) -> BattleResult<ActionOutcome> {
    let mut outcome = ActionOutcome::default();
    let Some(combatant) = ctx.field.combatant_at_mut(target) else {
        return Ok(outcome);
    };
    if combatant.is_fainted() {
        return Ok(outcome);
    }
    let Some(item) = combatant.item.take() else {
        return Ok(outcome);
    };
    let name = combatant.name().to_string();
    let item_data = ctx.catalog.require_item(item)?;
    let heal_denominator = match &item_data.effect {
        ItemEffect::PinchHeal {
            heal_denominator, ..
        } => Some(*heal_denominator),
        _ => None,
    };
    let item_name = item_data.name.clone();
    outcome.message(format!("{} used its {}!", name, item_name));

    if let Some(denominator) = heal_denominator {
        if let Some(combatant) = ctx.field.combatant_at(target) {
            outcome.react(BattleAction::Heal {
                target,
                amount: combatant.fraction_of_max_hp(denominator),
                source: EffectSource::Item(item),
            });
        }
    }
    ctx.rebuild_listeners();
    Ok(outcome)
}

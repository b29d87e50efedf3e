//! Trigger dispatch for abilities and held items.
//!
//! Each active combatant registers one listener for its ability and one for
//! its held item. Listeners read the static definition from the catalog and
//! return reaction actions; the caller enqueues them. A failing listener is
//! logged and skipped without affecting the others.

use crate::battle::actions::BattleAction;
use crate::battle::field::{BattleField, SlotId};
use crate::catalog::DataCatalog;
use crate::combatant::Combatant;
use crate::errors::ListenerError;
use crate::rng::BattleRng;
use schema::{Ability, HeldItem, MoveData, MoveId, Weather};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    SwitchIn,
    TurnStart,
    TurnEnd,
    DamageTaken,
    DamageDealt,
    BeforeMove,
    AfterMove,
    WeatherChange,
    ContactReceived,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TriggerEvent {
    SwitchIn {
        slot: SlotId,
    },
    TurnStart,
    TurnEnd,
    DamageTaken {
        target: SlotId,
        amount: u16,
        attacker: Option<SlotId>,
    },
    DamageDealt {
        attacker: SlotId,
        target: SlotId,
        amount: u16,
        move_id: MoveId,
    },
    BeforeMove {
        user: SlotId,
        move_id: MoveId,
    },
    AfterMove {
        user: SlotId,
        move_id: MoveId,
        dealt_damage: bool,
    },
    WeatherChange {
        weather: Option<Weather>,
    },
    ContactReceived {
        defender: SlotId,
        attacker: SlotId,
    },
}

impl TriggerEvent {
    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerEvent::SwitchIn { .. } => TriggerKind::SwitchIn,
            TriggerEvent::TurnStart => TriggerKind::TurnStart,
            TriggerEvent::TurnEnd => TriggerKind::TurnEnd,
            TriggerEvent::DamageTaken { .. } => TriggerKind::DamageTaken,
            TriggerEvent::DamageDealt { .. } => TriggerKind::DamageDealt,
            TriggerEvent::BeforeMove { .. } => TriggerKind::BeforeMove,
            TriggerEvent::AfterMove { .. } => TriggerKind::AfterMove,
            TriggerEvent::WeatherChange { .. } => TriggerKind::WeatherChange,
            TriggerEvent::ContactReceived { .. } => TriggerKind::ContactReceived,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerSource {
    Ability(Ability),
    Item(HeldItem),
}

/// A registration: which slot owns it, which roster member put it there,
/// and what it comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub owner: SlotId,
    pub member: usize,
    pub source: ListenerSource,
}

/// What a listener sees when it is invoked.
pub struct ListenerContext<'a> {
    pub event: &'a TriggerEvent,
    pub listener: &'a Listener,
    pub field: &'a BattleField,
    /// Display name of the ability or item.
    pub label: &'a str,
}

impl<'a> ListenerContext<'a> {
    /// The combatant that registered this listener. Errors if the slot is gone.
    pub fn owner(&self) -> Result<&'a Combatant, ListenerError> {
        let slot = self
            .field
            .slot(self.listener.owner)
            .ok_or(ListenerError::MissingOwner(self.listener.owner))?;
        if slot.occupant != Some(self.listener.member) {
            return Err(ListenerError::MissingOwner(self.listener.owner));
        }
        self.field
            .side(self.listener.owner.side)
            .roster
            .get(self.listener.member)
            .ok_or(ListenerError::MissingOwner(self.listener.owner))
    }

    /// True if the owner is still in its slot and able to fight.
    pub fn owner_active(&self) -> bool {
        self.field.occupant_member(self.listener.owner) == Some(self.listener.member)
            && self.field.is_active(self.listener.owner)
    }

    pub fn is_owner(&self, slot: SlotId) -> bool {
        slot == self.listener.owner
    }
}

/// Inputs to passive stat and damage modifiers.
#[derive(Debug, Clone, Copy)]
pub enum ValueQuery<'a> {
    Speed {
        weather: Option<Weather>,
    },
    Damage {
        move_data: &'a MoveData,
        effectiveness: f64,
        user_hp_ratio: f64,
    },
}

/// Capability set shared by every ability and item behavior.
pub trait PassiveEffect {
    /// Events this effect listens for.
    fn triggers(&self) -> &'static [TriggerKind];

    fn can_apply(&self, cx: &ListenerContext<'_>) -> bool;

    fn process(
        &self,
        cx: &ListenerContext<'_>,
        rng: &mut BattleRng,
    ) -> Result<Vec<BattleAction>, ListenerError>;

    /// Multiplier this effect contributes to a queried value. 1.0 when it
    /// does not apply.
    fn modify_value(&self, _query: &ValueQuery<'_>) -> f64 {
        1.0
    }
}

fn run_effect<E: PassiveEffect + ?Sized>(
    effect: &E,
    cx: &ListenerContext<'_>,
    rng: &mut BattleRng,
) -> Result<Vec<BattleAction>, ListenerError> {
    if !effect.triggers().contains(&cx.event.kind()) {
        return Ok(Vec::new());
    }
    // A listener outliving its owner is an error, not a quiet no-op.
    cx.owner()?;
    if !effect.can_apply(cx) {
        return Ok(Vec::new());
    }
    effect.process(cx, rng)
}

#[derive(Debug, Clone, Default)]
pub struct TriggerDispatcher {
    listeners: Vec<Listener>,
}

impl TriggerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one listener per ability and held item of every active
    /// combatant, in slot order.
    pub fn rebuild(&mut self, field: &BattleField) {
        self.listeners.clear();
        for slot in field.active_slots() {
            let (Some(member), Some(combatant)) =
                (field.occupant_member(slot), field.active_combatant(slot))
            else {
                continue;
            };
            if let Some(ability) = combatant.ability {
                self.listeners.push(Listener {
                    owner: slot,
                    member,
                    source: ListenerSource::Ability(ability),
                });
            }
            if let Some(item) = combatant.item {
                self.listeners.push(Listener {
                    owner: slot,
                    member,
                    source: ListenerSource::Item(item),
                });
            }
        }
    }

    pub fn register(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Invokes every listener for `event` and gathers their reactions.
    /// Listener failures are logged and do not stop the others.
    pub fn publish(
        &self,
        event: &TriggerEvent,
        field: &BattleField,
        catalog: &dyn DataCatalog,
        rng: &mut BattleRng,
    ) -> Vec<BattleAction> {
        let mut reactions = Vec::new();
        for listener in &self.listeners {
            match Self::invoke(listener, event, field, catalog, rng) {
                Ok(actions) => {
                    if !actions.is_empty() {
                        trace!(owner = %listener.owner, source = ?listener.source, count = actions.len(), "listener reacted");
                    }
                    reactions.extend(actions);
                }
                Err(err) => {
                    warn!(
                        owner = %listener.owner,
                        source = ?listener.source,
                        event = ?event.kind(),
                        error = %err,
                        "listener failed; continuing dispatch"
                    );
                }
            }
        }
        reactions
    }

    fn invoke(
        listener: &Listener,
        event: &TriggerEvent,
        field: &BattleField,
        catalog: &dyn DataCatalog,
        rng: &mut BattleRng,
    ) -> Result<Vec<BattleAction>, ListenerError> {
        match listener.source {
            ListenerSource::Ability(ability) => {
                let data = catalog.require_ability(ability)?;
                let cx = ListenerContext {
                    event,
                    listener,
                    field,
                    label: &data.name,
                };
                run_effect(&data.effect, &cx, rng)
            }
            ListenerSource::Item(item) => {
                let data = catalog.require_item(item)?;
                let cx = ListenerContext {
                    event,
                    listener,
                    field,
                    label: &data.name,
                };
                run_effect(&data.effect, &cx, rng)
            }
        }
    }
}

/// Multiplier from the ability of whoever is in `slot`.
pub fn ability_multiplier(
    query: &ValueQuery<'_>,
    slot: SlotId,
    field: &BattleField,
    catalog: &dyn DataCatalog,
) -> f64 {
    let Some(ability) = field.combatant_at(slot).and_then(|c| c.ability) else {
        return 1.0;
    };
    match catalog.require_ability(ability) {
        Ok(data) => data.effect.modify_value(query),
        Err(err) => {
            warn!(%slot, error = %err, "ability modifier skipped");
            1.0
        }
    }
}

/// Multiplier from the held item of whoever is in `slot`.
pub fn item_multiplier(
    query: &ValueQuery<'_>,
    slot: SlotId,
    field: &BattleField,
    catalog: &dyn DataCatalog,
) -> f64 {
    let Some(item) = field.combatant_at(slot).and_then(|c| c.item) else {
        return 1.0;
    };
    match catalog.require_item(item) {
        Ok(data) => data.effect.modify_value(query),
        Err(err) => {
            warn!(%slot, error = %err, "item modifier skipped");
            1.0
        }
    }
}

use crate::combatant::Combatant;
use crate::config::BattleFormat;
use crate::errors::ContractViolation;
use schema::{MoveId, ScreenKind, SemiInvulnerableKind, Stat, Terrain, Weather};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SideId {
    Player,
    Enemy,
}

impl SideId {
    pub const BOTH: [SideId; 2] = [SideId::Player, SideId::Enemy];

    pub fn index(self) -> usize {
        match self {
            SideId::Player => 0,
            SideId::Enemy => 1,
        }
    }

    pub fn opponent(self) -> SideId {
        match self {
            SideId::Player => SideId::Enemy,
            SideId::Enemy => SideId::Player,
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideId::Player => write!(f, "player side"),
            SideId::Enemy => write!(f, "enemy side"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId {
    pub side: SideId,
    pub index: usize,
}

impl SlotId {
    pub fn new(side: SideId, index: usize) -> Self {
        Self { side, index }
    }

    pub fn player(index: usize) -> Self {
        Self::new(SideId::Player, index)
    }

    pub fn enemy(index: usize) -> Self {
        Self::new(SideId::Enemy, index)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            SideId::Player => "player",
            SideId::Enemy => "enemy",
        };
        write!(f, "{}#{}", side, self.index)
    }
}

/// Multi-turn move bookkeeping. Charging and being semi-invulnerable are
/// mutually exclusive, so they share one field.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Charging {
        move_id: MoveId,
        target: Option<SlotId>,
    },
    SemiInvulnerable {
        move_id: MoveId,
        kind: SemiInvulnerableKind,
        target: Option<SlotId>,
    },
}

impl MoveState {
    /// The move a locked-in slot must use next turn, if any.
    pub fn forced_move(&self) -> Option<(MoveId, Option<SlotId>)> {
        match *self {
            MoveState::Idle => None,
            MoveState::Charging { move_id, target } => Some((move_id, target)),
            MoveState::SemiInvulnerable { move_id, target, .. } => Some((move_id, target)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleSlot {
    /// Roster index of the combatant standing here.
    pub occupant: Option<usize>,
    pub stat_stages: [i8; Stat::COUNT],
    pub physical_damage_taken: u16,
    pub special_damage_taken: u16,
    pub last_attacker: Option<SlotId>,
    pub focusing: bool,
    pub protected: bool,
    pub protect_streak: u8,
    pub move_state: MoveState,
    pub last_move: Option<MoveId>,
}

impl BattleSlot {
    pub fn new(occupant: Option<usize>) -> Self {
        Self {
            occupant,
            stat_stages: [0; Stat::COUNT],
            physical_damage_taken: 0,
            special_damage_taken: 0,
            last_attacker: None,
            focusing: false,
            protected: false,
            protect_streak: 0,
            move_state: MoveState::Idle,
            last_move: None,
        }
    }

    pub fn stage(&self, stat: Stat) -> i8 {
        self.stat_stages[stat.index()]
    }

    /// Shifts a stage by `delta`, clamped to [-6, 6]. Returns the change that
    /// actually happened.
    pub fn change_stage(&mut self, stat: Stat, delta: i8) -> i8 {
        let current = self.stat_stages[stat.index()];
        let next = current.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
        self.stat_stages[stat.index()] = next;
        next - current
    }

    pub fn damage_taken_this_turn(&self) -> u16 {
        self.physical_damage_taken
            .saturating_add(self.special_damage_taken)
    }

    /// Clears the counters that only live for one turn.
    pub fn reset_turn_counters(&mut self) {
        self.physical_damage_taken = 0;
        self.special_damage_taken = 0;
        self.last_attacker = None;
        self.focusing = false;
        self.protected = false;
    }

    /// Puts a new occupant in the slot, dropping everything the previous one left behind.
    pub fn replace_occupant(&mut self, occupant: usize) {
        *self = BattleSlot::new(Some(occupant));
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedCondition<T> {
    pub kind: T,
    pub turns_remaining: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleSide {
    pub id: SideId,
    pub roster: Vec<Combatant>,
    pub slots: Vec<BattleSlot>,
    pub screens: BTreeMap<ScreenKind, u8>,
}

impl BattleSide {
    /// Fills `slot_count` slots with the first healthy roster members.
    pub fn new(
        id: SideId,
        roster: Vec<Combatant>,
        slot_count: usize,
    ) -> Result<Self, ContractViolation> {
        if slot_count == 0 {
            return Err(ContractViolation::NoSlots);
        }
        if roster.is_empty() {
            return Err(ContractViolation::EmptyRoster { side: id });
        }

        let mut leads = roster
            .iter()
            .enumerate()
            .filter(|(_, combatant)| !combatant.is_fainted())
            .map(|(index, _)| index);
        let slots = (0..slot_count)
            .map(|_| BattleSlot::new(leads.next()))
            .collect();

        Ok(Self {
            id,
            roster,
            slots,
            screens: BTreeMap::new(),
        })
    }

    pub fn slot_id(&self, index: usize) -> SlotId {
        SlotId::new(self.id, index)
    }

    pub fn occupant(&self, index: usize) -> Option<&Combatant> {
        let member = self.slots.get(index)?.occupant?;
        self.roster.get(member)
    }

    pub fn occupant_mut(&mut self, index: usize) -> Option<&mut Combatant> {
        let member = self.slots.get(index)?.occupant?;
        self.roster.get_mut(member)
    }

    /// Slot indices holding a combatant that can still fight.
    pub fn active_slot_indices(&self) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&index| self.occupant(index).is_some_and(|c| !c.is_fainted()))
            .collect()
    }

    pub fn is_in_slot(&self, member: usize) -> bool {
        self.slots.iter().any(|slot| slot.occupant == Some(member))
    }

    /// Healthy roster members that are not standing in a slot.
    pub fn bench(&self) -> Vec<usize> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(index, combatant)| !combatant.is_fainted() && !self.is_in_slot(*index))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn has_screen(&self, screen: ScreenKind) -> bool {
        self.screens.contains_key(&screen)
    }
}

/// The whole mutable world of one battle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleField {
    pub format: BattleFormat,
    sides: [BattleSide; 2],
    pub weather: Option<TimedCondition<Weather>>,
    pub terrain: Option<TimedCondition<Terrain>>,
    pub turn: u32,
}

impl BattleField {
    pub fn new(
        format: BattleFormat,
        player_roster: Vec<Combatant>,
        enemy_roster: Vec<Combatant>,
    ) -> Result<Self, ContractViolation> {
        let player = BattleSide::new(SideId::Player, player_roster, format.slots_for(SideId::Player))?;
        let enemy = BattleSide::new(SideId::Enemy, enemy_roster, format.slots_for(SideId::Enemy))?;
        Ok(Self {
            format,
            sides: [player, enemy],
            weather: None,
            terrain: None,
            turn: 0,
        })
    }

    pub fn side(&self, side: SideId) -> &BattleSide {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: SideId) -> &mut BattleSide {
        &mut self.sides[side.index()]
    }

    pub fn sides(&self) -> &[BattleSide; 2] {
        &self.sides
    }

    pub fn slot(&self, id: SlotId) -> Option<&BattleSlot> {
        self.side(id.side).slots.get(id.index)
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut BattleSlot> {
        self.side_mut(id.side).slots.get_mut(id.index)
    }

    /// Whoever occupies the slot, fainted or not.
    pub fn combatant_at(&self, id: SlotId) -> Option<&Combatant> {
        self.side(id.side).occupant(id.index)
    }

    pub fn combatant_at_mut(&mut self, id: SlotId) -> Option<&mut Combatant> {
        self.side_mut(id.side).occupant_mut(id.index)
    }

    /// The occupant, only if it can still fight.
    pub fn active_combatant(&self, id: SlotId) -> Option<&Combatant> {
        self.combatant_at(id).filter(|c| !c.is_fainted())
    }

    pub fn is_active(&self, id: SlotId) -> bool {
        self.active_combatant(id).is_some()
    }

    pub fn occupant_member(&self, id: SlotId) -> Option<usize> {
        self.slot(id)?.occupant
    }

    /// Every active slot, player side first.
    pub fn active_slots(&self) -> Vec<SlotId> {
        SideId::BOTH
            .iter()
            .flat_map(|&side| {
                let battle_side = self.side(side);
                battle_side
                    .active_slot_indices()
                    .into_iter()
                    .map(move |index| SlotId::new(side, index))
            })
            .collect()
    }

    pub fn active_opponents(&self, id: SlotId) -> Vec<SlotId> {
        let side = self.side(id.side.opponent());
        side.active_slot_indices()
            .into_iter()
            .map(|index| side.slot_id(index))
            .collect()
    }

    pub fn active_allies(&self, id: SlotId) -> Vec<SlotId> {
        let side = self.side(id.side);
        side.active_slot_indices()
            .into_iter()
            .filter(|&index| index != id.index)
            .map(|index| side.slot_id(index))
            .collect()
    }

    pub fn current_weather(&self) -> Option<Weather> {
        self.weather.map(|condition| condition.kind)
    }

    pub fn current_terrain(&self) -> Option<Terrain> {
        self.terrain.map(|condition| condition.kind)
    }

    /// Number of slots on a side, used to pick single or multi-battle constants.
    pub fn slots_per_side(&self, side: SideId) -> usize {
        self.side(side).slots.len()
    }
}

use crate::battle::field::{BattleField, BattleSide, SideId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the battle stands, from the player's point of view.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Ongoing,
    Victory,
    Defeat,
    Draw,
}

impl BattleOutcome {
    pub fn is_decided(&self) -> bool {
        !matches!(self, BattleOutcome::Ongoing)
    }
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BattleOutcome::Ongoing => "ongoing",
            BattleOutcome::Victory => "victory",
            BattleOutcome::Defeat => "defeat",
            BattleOutcome::Draw => "draw",
        };
        write!(f, "{}", text)
    }
}

/// A side is out once nothing stands in its slots and nobody is left to send in.
pub fn is_defeated(side: &BattleSide) -> bool {
    side.active_slot_indices().is_empty() && side.bench().is_empty()
}

/// Classifies the field without touching it.
pub fn check_outcome(field: &BattleField) -> BattleOutcome {
    let player_out = is_defeated(field.side(SideId::Player));
    let enemy_out = is_defeated(field.side(SideId::Enemy));
    match (player_out, enemy_out) {
        (true, true) => BattleOutcome::Draw,
        (false, true) => BattleOutcome::Victory,
        (true, false) => BattleOutcome::Defeat,
        (false, false) => BattleOutcome::Ongoing,
    }
}

use crate::catalog::DataCatalog;
use crate::errors::CatalogError;
use schema::{Ability, BaseStats, ElementType, HeldItem, MoveId, SpeciesData, SpeciesId, Stat, StatusType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A live major status. Only one can be held at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCondition {
    Burn,
    Paralysis,
    Poison,
    /// Turns left before waking up.
    Sleep(u8),
    Freeze,
}

impl StatusCondition {
    pub fn kind(&self) -> StatusType {
        match self {
            StatusCondition::Burn => StatusType::Burn,
            StatusCondition::Paralysis => StatusType::Paralysis,
            StatusCondition::Poison => StatusType::Poison,
            StatusCondition::Sleep(_) => StatusType::Sleep,
            StatusCondition::Freeze => StatusType::Freeze,
        }
    }

    pub fn from_kind(kind: StatusType, sleep_turns: u8) -> Self {
        match kind {
            StatusType::Burn => StatusCondition::Burn,
            StatusType::Paralysis => StatusCondition::Paralysis,
            StatusType::Poison => StatusCondition::Poison,
            StatusType::Sleep => StatusCondition::Sleep(sleep_turns),
            StatusType::Freeze => StatusCondition::Freeze,
        }
    }
}

impl fmt::Display for StatusCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            StatusCondition::Burn => "burn",
            StatusCondition::Paralysis => "paralysis",
            StatusCondition::Poison => "poison",
            StatusCondition::Sleep(_) => "sleep",
            StatusCondition::Freeze => "freeze",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub move_id: MoveId,
    pub pp: u8,
    pub max_pp: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

impl Stats {
    /// Level formula with perfect IVs and no EVs.
    pub fn at_level(base: &BaseStats, level: u8) -> Self {
        let level = level as u32;
        let scaled = |base: u8| (2 * base as u32 + 31) * level / 100;
        let other = |base: u8| (scaled(base) + 5) as u16;
        Self {
            hp: (scaled(base.hp) + level + 10) as u16,
            attack: other(base.attack),
            defense: other(base.defense),
            sp_attack: other(base.sp_attack),
            sp_defense: other(base.sp_defense),
            speed: other(base.speed),
        }
    }

    /// Raw value of a stat. Accuracy and evasion have no raw value.
    pub fn get(&self, stat: Stat) -> Option<u16> {
        match stat {
            Stat::Attack => Some(self.attack),
            Stat::Defense => Some(self.defense),
            Stat::SpecialAttack => Some(self.sp_attack),
            Stat::SpecialDefense => Some(self.sp_defense),
            Stat::Speed => Some(self.speed),
            Stat::Accuracy | Stat::Evasion => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub nickname: String,
    pub species: SpeciesId,
    pub level: u8,
    pub types: Vec<ElementType>,
    pub stats: Stats,
    pub current_hp: u16,
    pub status: Option<StatusCondition>,
    pub moves: Vec<MoveSlot>,
    pub ability: Option<Ability>,
    pub item: Option<HeldItem>,
}

impl Combatant {
    /// Builds a full-health combatant from species data, looking up PP for
    /// each move in the catalog.
    pub fn new(
        species: &SpeciesData,
        level: u8,
        moves: &[MoveId],
        catalog: &dyn DataCatalog,
    ) -> Result<Self, CatalogError> {
        let stats = Stats::at_level(&species.base_stats, level);
        let moves = moves
            .iter()
            .map(|&move_id| {
                let data = catalog.require_move(move_id)?;
                Ok(MoveSlot {
                    move_id,
                    pp: data.max_pp,
                    max_pp: data.max_pp,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Self {
            nickname: species.name.clone(),
            species: species.id,
            level,
            types: species.types.clone(),
            stats,
            current_hp: stats.hp,
            status: None,
            moves,
            ability: None,
            item: None,
        })
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(ability);
        self
    }

    pub fn with_item(mut self, item: HeldItem) -> Self {
        self.item = Some(item);
        self
    }

    pub fn name(&self) -> &str {
        &self.nickname
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.current_hp >= self.stats.hp
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.stats.hp == 0 {
            return 0.0;
        }
        self.current_hp as f64 / self.stats.hp as f64
    }

    /// 1/denominator of max HP, never less than 1.
    pub fn fraction_of_max_hp(&self, denominator: u16) -> u16 {
        (self.stats.hp / denominator.max(1)).max(1)
    }

    pub fn has_type(&self, element: ElementType) -> bool {
        self.types.contains(&element)
    }

    pub fn move_slot(&self, move_id: MoveId) -> Option<&MoveSlot> {
        self.moves.iter().find(|slot| slot.move_id == move_id)
    }

    /// Removes HP and returns how much was actually lost.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        if self.current_hp == 0 {
            self.status = None;
        }
        dealt
    }

    /// Restores HP up to the maximum and returns how much was actually gained.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let healed = amount.min(self.stats.hp.saturating_sub(self.current_hp));
        self.current_hp += healed;
        healed
    }

    /// Spends one PP of the given move. Returns false if the move has no PP left
    /// or is not known.
    pub fn use_pp(&mut self, move_id: MoveId) -> bool {
        match self.moves.iter_mut().find(|slot| slot.move_id == move_id) {
            Some(slot) if slot.pp > 0 => {
                slot.pp -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves.iter().any(|slot| slot.pp > 0)
    }
}

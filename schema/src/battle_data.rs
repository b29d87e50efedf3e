use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoStaticStr};

/// The seven stats that carry battle stages.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr,
)]
pub enum Stat {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Accuracy,
    Evasion,
}

impl Stat {
    pub const COUNT: usize = 7;

    pub const ALL: [Stat; Stat::COUNT] = [
        Stat::Attack,
        Stat::Defense,
        Stat::SpecialAttack,
        Stat::SpecialDefense,
        Stat::Speed,
        Stat::Accuracy,
        Stat::Evasion,
    ];

    pub fn index(self) -> usize {
        match self {
            Stat::Attack => 0,
            Stat::Defense => 1,
            Stat::SpecialAttack => 2,
            Stat::SpecialDefense => 3,
            Stat::Speed => 4,
            Stat::Accuracy => 5,
            Stat::Evasion => 6,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Stat::Attack => "Attack",
            Stat::Defense => "Defense",
            Stat::SpecialAttack => "Special Attack",
            Stat::SpecialDefense => "Special Defense",
            Stat::Speed => "Speed",
            Stat::Accuracy => "accuracy",
            Stat::Evasion => "evasiveness",
        };
        write!(f, "{}", display_name)
    }
}

/// Major status a move or ability can inflict. The engine turns this into a
/// live condition (sleep gets its turn counter there).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusType {
    Burn,
    Paralysis,
    Poison,
    Sleep,
    Freeze,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weather {
    Sun,
    Rain,
    Sandstorm,
    Hail,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Weather::Sun => "harsh sunlight",
            Weather::Rain => "rain",
            Weather::Sandstorm => "sandstorm",
            Weather::Hail => "hail",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Electric,
    Grassy,
    Psychic,
    Misty,
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Terrain::Electric => "Electric Terrain",
            Terrain::Grassy => "Grassy Terrain",
            Terrain::Psychic => "Psychic Terrain",
            Terrain::Misty => "Misty Terrain",
        };
        write!(f, "{}", display_name)
    }
}

/// Side-wide damage reduction barriers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScreenKind {
    Reflect,
    LightScreen,
    AuroraVeil,
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            ScreenKind::Reflect => "Reflect",
            ScreenKind::LightScreen => "Light Screen",
            ScreenKind::AuroraVeil => "Aurora Veil",
        };
        write!(f, "{}", display_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemiInvulnerableKind {
    Underground,
    Airborne,
}

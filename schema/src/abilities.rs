use crate::{ElementType, MoveCategory, Stat, StatusType, Weather};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Ability {
    Intimidate,
    Blaze,
    Torrent,
    Overgrow,
    HugePower,
    SpeedBoost,
    RoughSkin,
    Static,
    Drizzle,
    Drought,
    SandStream,
    SwiftSwim,
    Chlorophyll,
}

/// The closed set of behaviors an ability definition can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Lowers a stat of every opposing active combatant on switch-in.
    EntryStatDrop { stat: Stat, stages: i8 },
    /// Boosts moves of one type while the holder is at or below a third of its HP.
    PinchTypeBoost { element: ElementType, multiplier: f64 },
    AttackMultiplier { category: MoveCategory, multiplier: f64 },
    TurnEndStatBoost { stat: Stat, stages: i8 },
    /// Damages an attacker that makes contact by 1/denominator of its max HP.
    ContactRecoil { denominator: u16 },
    ContactStatus { status: StatusType, chance: u8 },
    EntryWeather { weather: Weather, turns: u8 },
    WeatherSpeed { weather: Weather, multiplier: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityData {
    pub id: Ability,
    pub name: String,
    pub description: String,
    pub effect: AbilityEffect,
}

fn ability(id: Ability, name: &str, description: &str, effect: AbilityEffect) -> AbilityData {
    AbilityData {
        id,
        name: name.to_string(),
        description: description.to_string(),
        effect,
    }
}

/// The built-in ability table.
pub fn builtin_abilities() -> Vec<AbilityData> {
    use AbilityEffect::*;

    vec![
        ability(
            Ability::Intimidate,
            "Intimidate",
            "Lowers the Attack of opposing combatants on entry.",
            EntryStatDrop {
                stat: Stat::Attack,
                stages: -1,
            },
        ),
        ability(
            Ability::Blaze,
            "Blaze",
            "Powers up Fire moves in a pinch.",
            PinchTypeBoost {
                element: ElementType::Fire,
                multiplier: 1.5,
            },
        ),
        ability(
            Ability::Torrent,
            "Torrent",
            "Powers up Water moves in a pinch.",
            PinchTypeBoost {
                element: ElementType::Water,
                multiplier: 1.5,
            },
        ),
        ability(
            Ability::Overgrow,
            "Overgrow",
            "Powers up Grass moves in a pinch.",
            PinchTypeBoost {
                element: ElementType::Grass,
                multiplier: 1.5,
            },
        ),
        ability(
            Ability::HugePower,
            "Huge Power",
            "Doubles the power of physical moves.",
            AttackMultiplier {
                category: MoveCategory::Physical,
                multiplier: 2.0,
            },
        ),
        ability(
            Ability::SpeedBoost,
            "Speed Boost",
            "Raises Speed at the end of every turn.",
            TurnEndStatBoost {
                stat: Stat::Speed,
                stages: 1,
            },
        ),
        ability(
            Ability::RoughSkin,
            "Rough Skin",
            "Hurts attackers that make contact.",
            ContactRecoil { denominator: 8 },
        ),
        ability(
            Ability::Static,
            "Static",
            "Contact may paralyze the attacker.",
            ContactStatus {
                status: StatusType::Paralysis,
                chance: 30,
            },
        ),
        ability(
            Ability::Drizzle,
            "Drizzle",
            "Summons rain on entry.",
            EntryWeather {
                weather: Weather::Rain,
                turns: 5,
            },
        ),
        ability(
            Ability::Drought,
            "Drought",
            "Summons harsh sunlight on entry.",
            EntryWeather {
                weather: Weather::Sun,
                turns: 5,
            },
        ),
        ability(
            Ability::SandStream,
            "Sand Stream",
            "Summons a sandstorm on entry.",
            EntryWeather {
                weather: Weather::Sandstorm,
                turns: 5,
            },
        ),
        ability(
            Ability::SwiftSwim,
            "Swift Swim",
            "Doubles Speed in rain.",
            WeatherSpeed {
                weather: Weather::Rain,
                multiplier: 2.0,
            },
        ),
        ability(
            Ability::Chlorophyll,
            "Chlorophyll",
            "Doubles Speed in harsh sunlight.",
            WeatherSpeed {
                weather: Weather::Sun,
                multiplier: 2.0,
            },
        ),
    ]
}

use crate::ElementType;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum SpeciesId {
    Pikachu,
    Jolteon,
    Charizard,
    Blastoise,
    Venusaur,
    Gyarados,
    Kingdra,
    Snorlax,
    Gengar,
    Alakazam,
    Machamp,
    Lapras,
    Garchomp,
    Tyranitar,
    Ninjask,
    Lucario,
    Sylveon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: SpeciesId,
    pub name: String,
    pub types: Vec<ElementType>,
    pub base_stats: BaseStats,
}

fn species(
    id: SpeciesId,
    name: &str,
    types: &[ElementType],
    [hp, attack, defense, sp_attack, sp_defense, speed]: [u8; 6],
) -> SpeciesData {
    SpeciesData {
        id,
        name: name.to_string(),
        types: types.to_vec(),
        base_stats: BaseStats {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        },
    }
}

/// The built-in species table.
pub fn builtin_species() -> Vec<SpeciesData> {
    use ElementType::*;
    use SpeciesId as S;

    vec![
        species(S::Pikachu, "Pikachu", &[Electric], [35, 55, 40, 50, 50, 90]),
        species(S::Jolteon, "Jolteon", &[Electric], [65, 65, 60, 110, 95, 130]),
        species(S::Charizard, "Charizard", &[Fire, Flying], [78, 84, 78, 109, 85, 100]),
        species(S::Blastoise, "Blastoise", &[Water], [79, 83, 100, 85, 105, 78]),
        species(S::Venusaur, "Venusaur", &[Grass, Poison], [80, 82, 83, 100, 100, 80]),
        species(S::Gyarados, "Gyarados", &[Water, Flying], [95, 125, 79, 60, 100, 81]),
        species(S::Kingdra, "Kingdra", &[Water, Dragon], [75, 95, 95, 95, 95, 85]),
        species(S::Snorlax, "Snorlax", &[Normal], [160, 110, 65, 65, 110, 30]),
        species(S::Gengar, "Gengar", &[Ghost, Poison], [60, 65, 60, 130, 75, 110]),
        species(S::Alakazam, "Alakazam", &[Psychic], [55, 50, 45, 135, 95, 120]),
        species(S::Machamp, "Machamp", &[Fighting], [90, 130, 80, 65, 85, 55]),
        species(S::Lapras, "Lapras", &[Water, Ice], [130, 85, 80, 85, 95, 60]),
        species(S::Garchomp, "Garchomp", &[Dragon, Ground], [108, 130, 95, 80, 85, 102]),
        species(S::Tyranitar, "Tyranitar", &[Rock, Dark], [100, 134, 110, 95, 100, 61]),
        species(S::Ninjask, "Ninjask", &[Bug, Flying], [61, 90, 45, 50, 50, 160]),
        species(S::Lucario, "Lucario", &[Fighting, Steel], [70, 110, 70, 115, 70, 90]),
        species(S::Sylveon, "Sylveon", &[Fairy], [95, 65, 65, 110, 130, 60]),
    ]
}

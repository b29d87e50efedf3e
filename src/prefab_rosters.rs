use crate::catalog::DataCatalog;
use crate::combatant::Combatant;
use crate::errors::CatalogError;
use schema::{Ability, HeldItem, MoveId, SpeciesId};
use serde::{Deserialize, Serialize};

/// A predefined roster used by the simulator binary and in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefabRoster {
    pub id: String,
    pub name: String,
    pub description: String,
    pub members: Vec<PrefabMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefabMember {
    pub species: SpeciesId,
    pub level: u8,
    pub moves: Vec<MoveId>,
    pub ability: Option<Ability>,
    pub item: Option<HeldItem>,
}

impl PrefabMember {
    fn new(species: SpeciesId, moves: &[MoveId], ability: Option<Ability>, item: Option<HeldItem>) -> Self {
        Self {
            species,
            level: 50,
            moves: moves.to_vec(),
            ability,
            item,
        }
    }

    pub fn build(&self, catalog: &dyn DataCatalog) -> Result<Combatant, CatalogError> {
        let species = catalog.require_species(self.species)?;
        let mut combatant = Combatant::new(species, self.level, &self.moves, catalog)?;
        combatant.ability = self.ability;
        combatant.item = self.item;
        Ok(combatant)
    }
}

impl PrefabRoster {
    pub fn build(&self, catalog: &dyn DataCatalog) -> Result<Vec<Combatant>, CatalogError> {
        self.members.iter().map(|member| member.build(catalog)).collect()
    }
}

/// All built-in rosters.
pub fn prefab_rosters() -> Vec<PrefabRoster> {
    use Ability as A;
    use HeldItem as I;
    use MoveId as M;
    use SpeciesId as S;

    vec![
        PrefabRoster {
            id: "sun".to_string(),
            name: "Sun Team".to_string(),
            description: "Drought sets the sun for Chlorophyll sweepers and instant Solar Beams".to_string(),
            members: vec![
                PrefabMember::new(S::Charizard, &[M::Flamethrower, M::AerialAce, M::SolarBeam, M::Protect], Some(A::Drought), Some(I::Charcoal)),
                PrefabMember::new(S::Venusaur, &[M::SolarBeam, M::SludgeBomb, M::GigaDrain, M::Spore], Some(A::Chlorophyll), Some(I::LifeOrb)),
                PrefabMember::new(S::Lucario, &[M::CloseCombat, M::FlashCannon, M::ExtremeSpeed, M::SwordsDance], None, Some(I::ChoiceBand)),
            ],
        },
        PrefabRoster {
            id: "rain".to_string(),
            name: "Rain Team".to_string(),
            description: "Drizzle with Swift Swim attackers and Mystic Water boosted Surf".to_string(),
            members: vec![
                PrefabMember::new(S::Blastoise, &[M::Surf, M::IceBeam, M::RainDance, M::Protect], Some(A::Drizzle), Some(I::MysticWater)),
                PrefabMember::new(S::Kingdra, &[M::Surf, M::DragonClaw, M::IceBeam, M::RainDance], Some(A::SwiftSwim), Some(I::ExpertBelt)),
                PrefabMember::new(S::Gyarados, &[M::WaterGun, M::Crunch, M::Earthquake, M::Protect], Some(A::Intimidate), Some(I::SitrusBerry)),
            ],
        },
        PrefabRoster {
            id: "bulk".to_string(),
            name: "Bulky Team".to_string(),
            description: "Slow, sturdy combatants that punish contact and outlast the opponent".to_string(),
            members: vec![
                PrefabMember::new(S::Snorlax, &[M::BodySlam, M::Counter, M::Recover, M::Earthquake], None, Some(I::Leftovers)),
                PrefabMember::new(S::Garchomp, &[M::Earthquake, M::DragonClaw, M::Dig, M::SwordsDance], Some(A::RoughSkin), Some(I::RockyHelmet)),
                PrefabMember::new(S::Tyranitar, &[M::RockSlide, M::Crunch, M::Earthquake, M::FocusPunch], Some(A::SandStream), Some(I::Leftovers)),
            ],
        },
        PrefabRoster {
            id: "speed".to_string(),
            name: "Speed Team".to_string(),
            description: "Fast special attackers with Choice Scarf and Speed Boost".to_string(),
            members: vec![
                PrefabMember::new(S::Jolteon, &[M::Thunderbolt, M::ThunderWave, M::ShadowBall, M::LightScreen], Some(A::Static), Some(I::ChoiceScarf)),
                PrefabMember::new(S::Ninjask, &[M::AerialAce, M::SwordsDance, M::Protect, M::Dig], Some(A::SpeedBoost), None),
                PrefabMember::new(S::Alakazam, &[M::Psychic, M::ShadowBall, M::Reflect, M::NastyPlot], None, Some(I::ChoiceSpecs)),
                PrefabMember::new(S::Gengar, &[M::ShadowBall, M::SludgeBomb, M::WillOWisp, M::Moonblast], None, Some(I::LifeOrb)),
            ],
        },
        PrefabRoster {
            id: "hail".to_string(),
            name: "Hail Team".to_string(),
            description: "Hail with Aurora Veil support".to_string(),
            members: vec![
                PrefabMember::new(S::Lapras, &[M::Hail, M::AuroraVeil, M::IceBeam, M::Surf], None, Some(I::Leftovers)),
                PrefabMember::new(S::Machamp, &[M::CloseCombat, M::RockSlide, M::SeismicToss, M::FocusPunch], None, Some(I::ChoiceBand)),
                PrefabMember::new(S::Sylveon, &[M::Moonblast, M::HyperVoice, M::Recover, M::Growl], None, Some(I::Leftovers)),
                PrefabMember::new(S::Pikachu, &[M::Thunderbolt, M::QuickAttack, M::ElectricTerrain, M::ThunderShock], Some(A::Static), Some(I::LifeOrb)),
            ],
        },
    ]
}

pub fn find_prefab_roster(id: &str) -> Option<PrefabRoster> {
    prefab_rosters().into_iter().find(|roster| roster.id == id)
}

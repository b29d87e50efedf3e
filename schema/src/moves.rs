use crate::{ElementType, ScreenKind, SemiInvulnerableKind, Stat, StatusType, Terrain, Weather};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum MoveId {
    // Normal
    Tackle,
    Scratch,
    QuickAttack,
    ExtremeSpeed,
    BodySlam,
    DoubleEdge,
    HyperVoice,
    Protect,
    Recover,
    SwordsDance,
    Growl,
    Struggle,
    // Fire
    Ember,
    Flamethrower,
    WillOWisp,
    SunnyDay,
    // Water
    WaterGun,
    Surf,
    RainDance,
    // Electric
    ThunderShock,
    Thunderbolt,
    ThunderWave,
    ElectricTerrain,
    // Grass
    GigaDrain,
    SolarBeam,
    Spore,
    GrassyTerrain,
    // Ice
    IceBeam,
    Hail,
    AuroraVeil,
    // Fighting
    CloseCombat,
    Counter,
    FocusPunch,
    SeismicToss,
    // Poison
    SludgeBomb,
    PoisonPowder,
    // Ground
    Earthquake,
    Dig,
    // Flying
    Fly,
    AerialAce,
    // Psychic
    Psychic,
    MirrorCoat,
    Reflect,
    LightScreen,
    // Rock
    RockSlide,
    Sandstorm,
    // Ghost
    ShadowBall,
    // Dragon
    DragonClaw,
    // Dark
    Crunch,
    NastyPlot,
    // Steel
    FlashCannon,
    // Fairy
    Moonblast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Which slots a move reaches when it is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveTarget {
    SingleOpponent,
    AllOpponents,
    AllOthers,
    User,
    UserSide,
    Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveFlags {
    pub contact: bool,
    pub protectable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveBehavior {
    #[default]
    Standard,
    /// Spends one turn charging, strikes on the next. Skips the charge in the given weather.
    Charge { skip_in: Option<Weather> },
    /// Vanishes for a turn, strikes on the next.
    SemiInvulnerable(SemiInvulnerableKind),
    Protect,
    /// Returns double the damage of the given category taken this turn.
    Counter(MoveCategory),
    /// Fails if the user was hit earlier in the turn.
    Focus,
    /// Deals damage equal to the user's level.
    LevelDamage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    User,
    Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveEffect {
    Status { status: StatusType, chance: u8 },
    StatChange { target: EffectTarget, stat: Stat, stages: i8, chance: u8 },
    Recoil(u8), // % of damage dealt
    Drain(u8),  // % of damage dealt
    Heal(u8),   // % of user's max HP
    SetWeather(Weather),
    SetTerrain(Terrain),
    SetScreen(ScreenKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub id: MoveId,
    pub name: String,
    pub element: ElementType,
    pub category: MoveCategory,
    pub power: Option<u16>,
    pub accuracy: Option<u8>, // None never misses
    pub max_pp: u8,
    #[serde(default)]
    pub priority: i8,
    pub target: MoveTarget,
    #[serde(default)]
    pub flags: MoveFlags,
    #[serde(default)]
    pub behavior: MoveBehavior,
    #[serde(default)]
    pub effects: Vec<MoveEffect>,
}

impl MoveData {
    /// A damaging move aimed at one opponent. Physical moves make contact by default.
    pub fn attack(
        id: MoveId,
        name: &str,
        element: ElementType,
        category: MoveCategory,
        power: u16,
        accuracy: Option<u8>,
        max_pp: u8,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            element,
            category,
            power: Some(power),
            accuracy,
            max_pp,
            priority: 0,
            target: MoveTarget::SingleOpponent,
            flags: MoveFlags {
                contact: category == MoveCategory::Physical,
                protectable: true,
            },
            behavior: MoveBehavior::Standard,
            effects: Vec::new(),
        }
    }

    pub fn status(
        id: MoveId,
        name: &str,
        element: ElementType,
        accuracy: Option<u8>,
        max_pp: u8,
        target: MoveTarget,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            element,
            category: MoveCategory::Status,
            power: None,
            accuracy,
            max_pp,
            priority: 0,
            target,
            flags: MoveFlags {
                contact: false,
                protectable: matches!(
                    target,
                    MoveTarget::SingleOpponent | MoveTarget::AllOpponents | MoveTarget::AllOthers
                ),
            },
            behavior: MoveBehavior::Standard,
            effects: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_target(mut self, target: MoveTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_contact(mut self, contact: bool) -> Self {
        self.flags.contact = contact;
        self
    }

    pub fn unprotectable(mut self) -> Self {
        self.flags.protectable = false;
        self
    }

    pub fn with_behavior(mut self, behavior: MoveBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_effect(mut self, effect: MoveEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status
    }

    pub fn hits_multiple_targets(&self) -> bool {
        matches!(self.target, MoveTarget::AllOpponents | MoveTarget::AllOthers)
    }
}

/// The built-in move table.
pub fn builtin_moves() -> Vec<MoveData> {
    use ElementType::*;
    use MoveCategory::{Physical, Special};
    use MoveId as M;

    let lower = |stat: Stat, stages: i8, chance: u8| MoveEffect::StatChange {
        target: EffectTarget::Target,
        stat,
        stages,
        chance,
    };
    let raise = |stat: Stat, stages: i8| MoveEffect::StatChange {
        target: EffectTarget::User,
        stat,
        stages,
        chance: 100,
    };
    let inflict = |status: StatusType, chance: u8| MoveEffect::Status { status, chance };

    vec![
        // Normal
        MoveData::attack(M::Tackle, "Tackle", Normal, Physical, 40, Some(100), 35),
        MoveData::attack(M::Scratch, "Scratch", Normal, Physical, 40, Some(100), 35),
        MoveData::attack(M::QuickAttack, "Quick Attack", Normal, Physical, 40, Some(100), 30)
            .with_priority(1),
        MoveData::attack(M::ExtremeSpeed, "Extreme Speed", Normal, Physical, 80, Some(100), 5)
            .with_priority(2),
        MoveData::attack(M::BodySlam, "Body Slam", Normal, Physical, 85, Some(100), 15)
            .with_effect(inflict(StatusType::Paralysis, 30)),
        MoveData::attack(M::DoubleEdge, "Double-Edge", Normal, Physical, 120, Some(100), 15)
            .with_effect(MoveEffect::Recoil(33)),
        MoveData::attack(M::HyperVoice, "Hyper Voice", Normal, Special, 90, Some(100), 10)
            .with_target(MoveTarget::AllOpponents),
        MoveData::status(M::Protect, "Protect", Normal, None, 10, MoveTarget::User)
            .with_priority(4)
            .with_behavior(MoveBehavior::Protect),
        MoveData::status(M::Recover, "Recover", Normal, None, 5, MoveTarget::User)
            .with_effect(MoveEffect::Heal(50)),
        MoveData::status(M::SwordsDance, "Swords Dance", Normal, None, 20, MoveTarget::User)
            .with_effect(raise(Stat::Attack, 2)),
        MoveData::status(M::Growl, "Growl", Normal, Some(100), 40, MoveTarget::AllOpponents)
            .with_effect(lower(Stat::Attack, -1, 100)),
        MoveData::attack(M::Struggle, "Struggle", Typeless, Physical, 50, None, 1)
            .with_effect(MoveEffect::Recoil(25)),
        // Fire
        MoveData::attack(M::Ember, "Ember", Fire, Special, 40, Some(100), 25)
            .with_effect(inflict(StatusType::Burn, 10)),
        MoveData::attack(M::Flamethrower, "Flamethrower", Fire, Special, 90, Some(100), 15)
            .with_effect(inflict(StatusType::Burn, 10)),
        MoveData::status(M::WillOWisp, "Will-O-Wisp", Fire, Some(85), 15, MoveTarget::SingleOpponent)
            .with_effect(inflict(StatusType::Burn, 100)),
        MoveData::status(M::SunnyDay, "Sunny Day", Fire, None, 5, MoveTarget::Field)
            .with_effect(MoveEffect::SetWeather(Weather::Sun)),
        // Water
        MoveData::attack(M::WaterGun, "Water Gun", Water, Special, 40, Some(100), 25),
        MoveData::attack(M::Surf, "Surf", Water, Special, 90, Some(100), 15)
            .with_target(MoveTarget::AllOthers),
        MoveData::status(M::RainDance, "Rain Dance", Water, None, 5, MoveTarget::Field)
            .with_effect(MoveEffect::SetWeather(Weather::Rain)),
        // Electric
        MoveData::attack(M::ThunderShock, "Thunder Shock", Electric, Special, 40, Some(100), 30)
            .with_effect(inflict(StatusType::Paralysis, 10)),
        MoveData::attack(M::Thunderbolt, "Thunderbolt", Electric, Special, 90, Some(100), 15)
            .with_effect(inflict(StatusType::Paralysis, 10)),
        MoveData::status(M::ThunderWave, "Thunder Wave", Electric, Some(90), 20, MoveTarget::SingleOpponent)
            .with_effect(inflict(StatusType::Paralysis, 100)),
        MoveData::status(M::ElectricTerrain, "Electric Terrain", Electric, None, 10, MoveTarget::Field)
            .with_effect(MoveEffect::SetTerrain(Terrain::Electric)),
        // Grass
        MoveData::attack(M::GigaDrain, "Giga Drain", Grass, Special, 75, Some(100), 10)
            .with_effect(MoveEffect::Drain(50)),
        MoveData::attack(M::SolarBeam, "Solar Beam", Grass, Special, 120, Some(100), 10)
            .with_behavior(MoveBehavior::Charge {
                skip_in: Some(Weather::Sun),
            }),
        MoveData::status(M::Spore, "Spore", Grass, Some(100), 15, MoveTarget::SingleOpponent)
            .with_effect(inflict(StatusType::Sleep, 100)),
        MoveData::status(M::GrassyTerrain, "Grassy Terrain", Grass, None, 10, MoveTarget::Field)
            .with_effect(MoveEffect::SetTerrain(Terrain::Grassy)),
        // Ice
        MoveData::attack(M::IceBeam, "Ice Beam", Ice, Special, 90, Some(100), 10)
            .with_effect(inflict(StatusType::Freeze, 10)),
        MoveData::status(M::Hail, "Hail", Ice, None, 10, MoveTarget::Field)
            .with_effect(MoveEffect::SetWeather(Weather::Hail)),
        MoveData::status(M::AuroraVeil, "Aurora Veil", Ice, None, 20, MoveTarget::UserSide)
            .with_effect(MoveEffect::SetScreen(ScreenKind::AuroraVeil)),
        // Fighting
        MoveData::attack(M::CloseCombat, "Close Combat", Fighting, Physical, 120, Some(100), 5)
            .with_effect(raise(Stat::Defense, -1))
            .with_effect(raise(Stat::SpecialDefense, -1)),
        MoveData::attack(M::Counter, "Counter", Fighting, Physical, 1, Some(100), 20)
            .with_priority(-5)
            .with_behavior(MoveBehavior::Counter(MoveCategory::Physical)),
        MoveData::attack(M::FocusPunch, "Focus Punch", Fighting, Physical, 150, Some(100), 20)
            .with_priority(-3)
            .with_behavior(MoveBehavior::Focus),
        MoveData::attack(M::SeismicToss, "Seismic Toss", Fighting, Physical, 1, Some(100), 20)
            .with_behavior(MoveBehavior::LevelDamage),
        // Poison
        MoveData::attack(M::SludgeBomb, "Sludge Bomb", Poison, Special, 90, Some(100), 10)
            .with_effect(inflict(StatusType::Poison, 30)),
        MoveData::status(M::PoisonPowder, "Poison Powder", Poison, Some(75), 35, MoveTarget::SingleOpponent)
            .with_effect(inflict(StatusType::Poison, 100)),
        // Ground
        MoveData::attack(M::Earthquake, "Earthquake", Ground, Physical, 100, Some(100), 10)
            .with_target(MoveTarget::AllOthers)
            .with_contact(false),
        MoveData::attack(M::Dig, "Dig", Ground, Physical, 80, Some(100), 10)
            .with_behavior(MoveBehavior::SemiInvulnerable(SemiInvulnerableKind::Underground)),
        // Flying
        MoveData::attack(M::Fly, "Fly", Flying, Physical, 90, Some(95), 15)
            .with_behavior(MoveBehavior::SemiInvulnerable(SemiInvulnerableKind::Airborne)),
        MoveData::attack(M::AerialAce, "Aerial Ace", Flying, Physical, 60, None, 20),
        // Psychic
        MoveData::attack(M::Psychic, "Psychic", Psychic, Special, 90, Some(100), 10)
            .with_effect(lower(Stat::SpecialDefense, -1, 10)),
        MoveData::attack(M::MirrorCoat, "Mirror Coat", Psychic, Special, 1, Some(100), 20)
            .with_priority(-5)
            .with_behavior(MoveBehavior::Counter(MoveCategory::Special)),
        MoveData::status(M::Reflect, "Reflect", Psychic, None, 20, MoveTarget::UserSide)
            .with_effect(MoveEffect::SetScreen(ScreenKind::Reflect)),
        MoveData::status(M::LightScreen, "Light Screen", Psychic, None, 30, MoveTarget::UserSide)
            .with_effect(MoveEffect::SetScreen(ScreenKind::LightScreen)),
        // Rock
        MoveData::attack(M::RockSlide, "Rock Slide", Rock, Physical, 75, Some(90), 10)
            .with_target(MoveTarget::AllOpponents)
            .with_contact(false),
        MoveData::status(M::Sandstorm, "Sandstorm", Rock, None, 10, MoveTarget::Field)
            .with_effect(MoveEffect::SetWeather(Weather::Sandstorm)),
        // Ghost
        MoveData::attack(M::ShadowBall, "Shadow Ball", Ghost, Special, 80, Some(100), 15)
            .with_effect(lower(Stat::SpecialDefense, -1, 20)),
        // Dragon
        MoveData::attack(M::DragonClaw, "Dragon Claw", Dragon, Physical, 80, Some(100), 15),
        // Dark
        MoveData::attack(M::Crunch, "Crunch", Dark, Physical, 80, Some(100), 15)
            .with_effect(lower(Stat::Defense, -1, 20)),
        MoveData::status(M::NastyPlot, "Nasty Plot", Dark, None, 20, MoveTarget::User)
            .with_effect(raise(Stat::SpecialAttack, 2)),
        // Steel
        MoveData::attack(M::FlashCannon, "Flash Cannon", Steel, Special, 80, Some(100), 10)
            .with_effect(lower(Stat::SpecialDefense, -1, 10)),
        // Fairy
        MoveData::attack(M::Moonblast, "Moonblast", Fairy, Special, 95, Some(100), 15)
            .with_effect(lower(Stat::SpecialAttack, -1, 30)),
    ]
}

use crate::{ElementType, MoveCategory};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum HeldItem {
    Leftovers,
    ChoiceScarf,
    ChoiceBand,
    ChoiceSpecs,
    LifeOrb,
    RockyHelmet,
    SitrusBerry,
    Charcoal,
    MysticWater,
    ExpertBelt,
}

/// The closed set of behaviors a held item definition can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemEffect {
    /// Restores 1/denominator of max HP at the end of every turn.
    TurnEndHeal { denominator: u16 },
    SpeedMultiplier(f64),
    AttackMultiplier { category: MoveCategory, multiplier: f64 },
    /// Boosts damage; the holder loses 1/denominator of max HP after dealing it.
    BoostWithRecoil { multiplier: f64, recoil_denominator: u16 },
    ContactRecoil { denominator: u16 },
    /// Single use: heals 1/heal_denominator once HP falls to threshold_percent or lower.
    PinchHeal { threshold_percent: u8, heal_denominator: u16 },
    TypeBoost { element: ElementType, multiplier: f64 },
    SuperEffectiveBoost(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub id: HeldItem,
    pub name: String,
    pub effect: ItemEffect,
    #[serde(default)]
    pub consumable: bool,
}

fn item(id: HeldItem, name: &str, effect: ItemEffect) -> ItemData {
    ItemData {
        id,
        name: name.to_string(),
        effect,
        consumable: false,
    }
}

/// The built-in held item table.
pub fn builtin_items() -> Vec<ItemData> {
    use ItemEffect::*;

    vec![
        item(HeldItem::Leftovers, "Leftovers", TurnEndHeal { denominator: 16 }),
        item(HeldItem::ChoiceScarf, "Choice Scarf", SpeedMultiplier(1.5)),
        item(
            HeldItem::ChoiceBand,
            "Choice Band",
            AttackMultiplier {
                category: MoveCategory::Physical,
                multiplier: 1.5,
            },
        ),
        item(
            HeldItem::ChoiceSpecs,
            "Choice Specs",
            AttackMultiplier {
                category: MoveCategory::Special,
                multiplier: 1.5,
            },
        ),
        item(
            HeldItem::LifeOrb,
            "Life Orb",
            BoostWithRecoil {
                multiplier: 1.3,
                recoil_denominator: 10,
            },
        ),
        item(
            HeldItem::RockyHelmet,
            "Rocky Helmet",
            ContactRecoil { denominator: 6 },
        ),
        ItemData {
            consumable: true,
            ..item(
                HeldItem::SitrusBerry,
                "Sitrus Berry",
                PinchHeal {
                    threshold_percent: 50,
                    heal_denominator: 4,
                },
            )
        },
        item(
            HeldItem::Charcoal,
            "Charcoal",
            TypeBoost {
                element: ElementType::Fire,
                multiplier: 1.2,
            },
        ),
        item(
            HeldItem::MysticWater,
            "Mystic Water",
            TypeBoost {
                element: ElementType::Water,
                multiplier: 1.2,
            },
        ),
        item(HeldItem::ExpertBelt, "Expert Belt", SuperEffectiveBoost(1.2)),
    ]
}

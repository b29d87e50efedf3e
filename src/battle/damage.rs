//! Move damage as an ordered list of stages over one `DamageContext`.
//!
//! Later stages multiply an already power/type/crit adjusted value, so the
//! order in `DamagePipeline::standard` is part of the result.

use crate::battle::field::{BattleField, SlotId};
use crate::battle::triggers::{ability_multiplier, item_multiplier, ValueQuery};
use crate::battle::turn_order::stat_stage_multiplier;
use crate::catalog::DataCatalog;
use crate::combatant::{Combatant, StatusCondition};
use crate::config::BattleConfig;
use crate::errors::{BattleResult, ContractViolation};
use crate::rng::BattleRng;
use schema::{ElementType, MoveCategory, MoveData, ScreenKind, Stat};
use tracing::trace;

/// Spread moves hitting more than one target.
pub const SPREAD_MULTIPLIER: f64 = 0.75;
pub const STAB_MULTIPLIER: f64 = 1.5;
pub const SINGLE_SCREEN_MULTIPLIER: f64 = 0.5;
pub const MULTI_SCREEN_MULTIPLIER: f64 = 2.0 / 3.0;
pub const BURN_MULTIPLIER: f64 = 0.5;

/// Scratch record for one damage calculation.
#[derive(Clone)]
pub struct DamageContext<'a> {
    pub attacker: SlotId,
    pub defender: SlotId,
    pub move_data: &'a MoveData,
    pub field: &'a BattleField,
    pub catalog: &'a dyn DataCatalog,
    pub config: &'a BattleConfig,
    pub target_count: usize,
    pub base_damage: f64,
    pub multiplier: f64,
    pub effectiveness: f64,
    pub critical: bool,
    pub random_factor: f64,
    pub final_damage: u16,
}

impl<'a> DamageContext<'a> {
    pub fn new(
        attacker: SlotId,
        defender: SlotId,
        move_data: &'a MoveData,
        field: &'a BattleField,
        catalog: &'a dyn DataCatalog,
        config: &'a BattleConfig,
        target_count: usize,
    ) -> Self {
        Self {
            attacker,
            defender,
            move_data,
            field,
            catalog,
            config,
            target_count,
            base_damage: 0.0,
            multiplier: 1.0,
            effectiveness: 1.0,
            critical: false,
            random_factor: 1.0,
            final_damage: 0,
        }
    }

    fn attacker_combatant(&self) -> BattleResult<&'a Combatant> {
        Ok(self
            .field
            .combatant_at(self.attacker)
            .ok_or(ContractViolation::UnknownSlot(self.attacker))?)
    }

    fn defender_combatant(&self) -> BattleResult<&'a Combatant> {
        Ok(self
            .field
            .combatant_at(self.defender)
            .ok_or(ContractViolation::UnknownSlot(self.defender))?)
    }

    fn stage(&self, slot: SlotId, stat: Stat) -> i8 {
        self.field.slot(slot).map(|s| s.stage(stat)).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u16,
    pub effectiveness: f64,
    pub critical: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageStage {
    BasePower,
    SameTypeBonus,
    TypeEffectiveness,
    Critical,
    RandomVariance,
    AttackerAbility,
    AttackerItem,
    Screens,
    Status,
}

impl DamageStage {
    pub fn name(&self) -> &'static str {
        match self {
            DamageStage::BasePower => "base-power",
            DamageStage::SameTypeBonus => "stab",
            DamageStage::TypeEffectiveness => "type-effectiveness",
            DamageStage::Critical => "critical",
            DamageStage::RandomVariance => "random-variance",
            DamageStage::AttackerAbility => "attacker-ability",
            DamageStage::AttackerItem => "attacker-item",
            DamageStage::Screens => "screens",
            DamageStage::Status => "status",
        }
    }

    pub fn apply(&self, dc: &mut DamageContext<'_>, rng: &mut BattleRng) -> BattleResult<()> {
        match self {
            DamageStage::BasePower => apply_base_power(dc),
            DamageStage::SameTypeBonus => {
                if dc.attacker_combatant()?.has_type(dc.move_data.element)
                    && dc.move_data.element != ElementType::Typeless
                {
                    dc.multiplier *= STAB_MULTIPLIER;
                }
                Ok(())
            }
            DamageStage::TypeEffectiveness => {
                let defender = dc.defender_combatant()?;
                dc.effectiveness =
                    ElementType::effectiveness_against(dc.move_data.element, &defender.types);
                dc.multiplier *= dc.effectiveness;
                Ok(())
            }
            DamageStage::Critical => {
                dc.critical = match dc.config.damage_overrides.force_critical {
                    Some(forced) => forced,
                    None => rng.probability(dc.config.critical_hit_chance, "critical hit"),
                };
                if dc.critical {
                    dc.multiplier *= dc.config.critical_multiplier;
                }
                Ok(())
            }
            DamageStage::RandomVariance => {
                dc.random_factor = match dc.config.damage_overrides.random_factor {
                    Some(factor) => factor,
                    None => rng.uniform(0.85, 1.0, "damage variance"),
                };
                dc.multiplier *= dc.random_factor;
                Ok(())
            }
            DamageStage::AttackerAbility => {
                let query = damage_query(dc)?;
                dc.multiplier *= ability_multiplier(&query, dc.attacker, dc.field, dc.catalog);
                Ok(())
            }
            DamageStage::AttackerItem => {
                let query = damage_query(dc)?;
                dc.multiplier *= item_multiplier(&query, dc.attacker, dc.field, dc.catalog);
                Ok(())
            }
            DamageStage::Screens => {
                dc.multiplier *= screen_multiplier(dc);
                Ok(())
            }
            DamageStage::Status => {
                let attacker = dc.attacker_combatant()?;
                if attacker.status == Some(StatusCondition::Burn)
                    && dc.move_data.category == MoveCategory::Physical
                {
                    dc.multiplier *= BURN_MULTIPLIER;
                }
                Ok(())
            }
        }
    }
}

fn apply_base_power(dc: &mut DamageContext<'_>) -> BattleResult<()> {
    let attacker = dc.attacker_combatant()?;
    let defender = dc.defender_combatant()?;
    let (attack_stat, defense_stat) = match dc.move_data.category {
        MoveCategory::Special => (Stat::SpecialAttack, Stat::SpecialDefense),
        _ => (Stat::Attack, Stat::Defense),
    };

    let raw_attack = attacker.stats.get(attack_stat).unwrap_or(1) as f64;
    let raw_defense = defender.stats.get(defense_stat).unwrap_or(1) as f64;
    let attack = (raw_attack * stat_stage_multiplier(dc.stage(dc.attacker, attack_stat)))
        .floor()
        .max(1.0);
    let defense = (raw_defense * stat_stage_multiplier(dc.stage(dc.defender, defense_stat)))
        .floor()
        .max(1.0);

    let level = attacker.level as f64;
    let power = dc.move_data.power.unwrap_or(0) as f64;
    let level_factor = (2.0 * level / 5.0 + 2.0).floor();
    dc.base_damage = ((level_factor * power * attack / defense).floor() / 50.0).floor() + 2.0;

    if dc.target_count > 1 {
        dc.multiplier *= SPREAD_MULTIPLIER;
    }
    Ok(())
}

fn damage_query<'a>(dc: &DamageContext<'a>) -> BattleResult<ValueQuery<'a>> {
    Ok(ValueQuery::Damage {
        move_data: dc.move_data,
        effectiveness: dc.effectiveness,
        user_hp_ratio: dc.attacker_combatant()?.hp_ratio(),
    })
}

/// Aurora Veil covers both categories and replaces Reflect and Light Screen
/// rather than stacking with them.
fn screen_multiplier(dc: &DamageContext<'_>) -> f64 {
    let side = dc.field.side(dc.defender.side);
    let category = dc.move_data.category;
    let screened = if side.has_screen(ScreenKind::AuroraVeil) {
        category != MoveCategory::Status
    } else {
        (category == MoveCategory::Physical && side.has_screen(ScreenKind::Reflect))
            || (category == MoveCategory::Special && side.has_screen(ScreenKind::LightScreen))
    };
    if !screened {
        return 1.0;
    }
    if dc.field.slots_per_side(dc.defender.side) > 1 {
        MULTI_SCREEN_MULTIPLIER
    } else {
        SINGLE_SCREEN_MULTIPLIER
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamagePipeline {
    stages: Vec<DamageStage>,
}

impl Default for DamagePipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl DamagePipeline {
    pub fn standard() -> Self {
        Self {
            stages: vec![
                DamageStage::BasePower,
                DamageStage::SameTypeBonus,
                DamageStage::TypeEffectiveness,
                DamageStage::Critical,
                DamageStage::RandomVariance,
                DamageStage::AttackerAbility,
                DamageStage::AttackerItem,
                DamageStage::Screens,
                DamageStage::Status,
            ],
        }
    }

    pub fn stages(&self) -> &[DamageStage] {
        &self.stages
    }

    pub fn calculate(
        &self,
        mut dc: DamageContext<'_>,
        rng: &mut BattleRng,
    ) -> BattleResult<DamageOutcome> {
        for stage in &self.stages {
            stage.apply(&mut dc, rng)?;
            trace!(
                stage = stage.name(),
                base = dc.base_damage,
                multiplier = dc.multiplier,
                "damage stage"
            );
        }

        let raw = (dc.base_damage * dc.multiplier).floor();
        dc.final_damage = if dc.multiplier <= 0.0 || dc.base_damage <= 0.0 {
            0
        } else {
            raw.clamp(1.0, u16::MAX as f64) as u16
        };

        Ok(DamageOutcome {
            damage: dc.final_damage,
            effectiveness: dc.effectiveness,
            critical: dc.critical,
        })
    }
}

use crate::battle::actions::BattleAction;
use crate::battle::field::{BattleField, SlotId};
use crate::battle::triggers::{ability_multiplier, item_multiplier, ValueQuery};
use crate::catalog::DataCatalog;
use crate::combatant::StatusCondition;
use crate::errors::CatalogError;
use crate::rng::BattleRng;
use ordered_float::OrderedFloat;
use schema::Stat;
use std::cmp::Reverse;

/// Multiplier for a stat stage: (2 + s) / 2 for s >= 0, 2 / (2 - s) below.
pub fn stat_stage_multiplier(stage: i8) -> f64 {
    let stage = stage.clamp(-6, 6) as f64;
    if stage >= 0.0 {
        (2.0 + stage) / 2.0
    } else {
        2.0 / (2.0 - stage)
    }
}

/// Accuracy and evasion use thirds instead of halves.
pub fn accuracy_stage_multiplier(stage: i8) -> f64 {
    let stage = stage.clamp(-6, 6) as f64;
    if stage >= 0.0 {
        (3.0 + stage) / 3.0
    } else {
        3.0 / (3.0 - stage)
    }
}

/// Speed used for ordering: raw speed × stage multiplier × paralysis ×
/// held item × ability. An empty or fainted slot has speed 0.
pub fn effective_speed(field: &BattleField, slot: SlotId, catalog: &dyn DataCatalog) -> f64 {
    let (Some(combatant), Some(battle_slot)) = (field.active_combatant(slot), field.slot(slot)) else {
        return 0.0;
    };

    let mut speed = combatant.stats.speed as f64 * stat_stage_multiplier(battle_slot.stage(Stat::Speed));
    if combatant.status == Some(StatusCondition::Paralysis) {
        speed *= 0.5;
    }
    let query = ValueQuery::Speed {
        weather: field.current_weather(),
    };
    speed *= item_multiplier(&query, slot, field, catalog);
    speed *= ability_multiplier(&query, slot, field, catalog);
    speed
}

/// Sorts a batch into execution order: priority bracket descending, then
/// effective speed descending, then a random tie-breaker. Tie-breakers are
/// drawn for every action in input order, so a fixed seed gives a fixed order.
pub fn sort_actions(
    actions: Vec<BattleAction>,
    field: &BattleField,
    catalog: &dyn DataCatalog,
    rng: &mut BattleRng,
) -> Result<Vec<BattleAction>, CatalogError> {
    let mut keyed = actions
        .into_iter()
        .map(|action| {
            let priority = action.priority(catalog)?;
            let speed = action
                .user()
                .map(|user| effective_speed(field, user, catalog))
                .unwrap_or(0.0);
            let tie_breaker = rng.tie_breaker();
            Ok(((priority, OrderedFloat(speed), tie_breaker), action))
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;

    keyed.sort_by_key(|(key, _)| Reverse(*key));
    Ok(keyed.into_iter().map(|(_, action)| action).collect())
}

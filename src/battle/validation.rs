use crate::battle::field::{BattleField, MAX_STAGE, MIN_STAGE};
use crate::errors::{InvariantReport, InvariantViolation};
use schema::Stat;
use std::collections::BTreeSet;

/// Checks the battlefield for states no sequence of legal actions can reach.
/// Every violation is collected; nothing is repaired.
pub fn validate_field(field: &BattleField) -> Result<(), InvariantReport> {
    let mut report = InvariantReport::default();

    for side in field.sides() {
        if side.slots.is_empty() {
            report
                .violations
                .push(InvariantViolation::SideWithoutSlots { side: side.id });
        }

        let mut seen = BTreeSet::new();
        for (index, slot) in side.slots.iter().enumerate() {
            let slot_id = side.slot_id(index);
            for stat in Stat::ALL {
                let stage = slot.stage(stat);
                if !(MIN_STAGE..=MAX_STAGE).contains(&stage) {
                    report.violations.push(InvariantViolation::StageOutOfRange {
                        slot: slot_id,
                        stat,
                        stage,
                    });
                }
            }

            let Some(member) = slot.occupant else {
                continue;
            };
            if member >= side.roster.len() {
                report
                    .violations
                    .push(InvariantViolation::PhantomOccupant { slot: slot_id, member });
            } else if !seen.insert(member) {
                report
                    .violations
                    .push(InvariantViolation::DuplicateOccupant { side: side.id, member });
            }
        }

        for (member, combatant) in side.roster.iter().enumerate() {
            if combatant.current_hp > combatant.max_hp() {
                report.violations.push(InvariantViolation::HpAboveMax {
                    side: side.id,
                    member,
                    hp: combatant.current_hp,
                    max: combatant.max_hp(),
                });
            }
        }

        for (screen, turns) in &side.screens {
            if *turns == 0 {
                report.violations.push(InvariantViolation::LingeringScreen {
                    side: side.id,
                    screen: *screen,
                });
            }
        }
    }

    if field.weather.is_some_and(|weather| weather.turns_remaining == 0) {
        report.violations.push(InvariantViolation::LingeringWeather);
    }
    if field.terrain.is_some_and(|terrain| terrain.turns_remaining == 0) {
        report.violations.push(InvariantViolation::LingeringTerrain);
    }

    if report.is_empty() {
        Ok(())
    } else {
        Err(report)
    }
}

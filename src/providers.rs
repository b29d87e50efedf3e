//! Action providers: the AI and scripted sources that pick what each active
//! slot does on a turn.

use crate::battle::actions::BattleAction;
use crate::battle::field::{BattleField, SlotId};
use crate::catalog::DataCatalog;
use crate::combatant::Combatant;
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{
    EffectTarget, ElementType, MoveBehavior, MoveCategory, MoveData, MoveEffect, MoveId,
    MoveTarget,
};
use std::collections::VecDeque;

/// A source of decisions for one side. Called once per active slot during
/// action collection, and once per fainted slot when a replacement is needed.
pub trait ActionProvider: Send {
    /// Picks a move or a switch for `slot`, or nothing at all.
    fn choose_action(
        &mut self,
        field: &BattleField,
        slot: SlotId,
        catalog: &dyn DataCatalog,
    ) -> Option<BattleAction>;

    /// Roster index to send into a slot whose occupant fainted.
    fn choose_replacement(&mut self, field: &BattleField, slot: SlotId) -> Option<usize> {
        field.side(slot.side).bench().first().copied()
    }
}

fn use_move(field: &BattleField, slot: SlotId, move_id: MoveId, target: Option<SlotId>) -> BattleAction {
    BattleAction::UseMove {
        user: slot,
        member: field.occupant_member(slot).unwrap_or_default(),
        move_id,
        target,
    }
}

/// Scores each usable move against each opponent and picks the best.
pub struct ScoringAi {
    rng: StdRng,
}

impl ScoringAi {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn score_move(
        &self,
        field: &BattleField,
        slot: SlotId,
        attacker: &Combatant,
        defender: &Combatant,
        defender_slot: SlotId,
        move_data: &MoveData,
    ) -> f64 {
        // Damage: power × STAB × effectiveness, scaled by accuracy.
        let mut damage_score = 0.0;
        if move_data.is_damaging() {
            let effectiveness =
                ElementType::effectiveness_against(move_data.element, &defender.types);
            if effectiveness < 0.1 {
                return -1.0;
            }
            let power = match move_data.behavior {
                MoveBehavior::LevelDamage => f64::from(attacker.level),
                MoveBehavior::Counter(_) => 0.0,
                _ => f64::from(move_data.power.unwrap_or(0)),
            };
            let stab = if attacker.has_type(move_data.element) {
                1.5
            } else {
                1.0
            };
            let accuracy = f64::from(move_data.accuracy.unwrap_or(101)) / 100.0;
            damage_score = power * stab * effectiveness * accuracy;
        }

        // Utility from secondary effects.
        let mut utility_score = 0.0;
        for effect in &move_data.effects {
            match effect {
                MoveEffect::StatChange {
                    target: EffectTarget::User,
                    stat,
                    stages,
                    chance,
                } if *stages > 0 => {
                    let current = field.slot(slot).map(|s| s.stage(*stat)).unwrap_or(0);
                    if current < 6 {
                        let potential_gain = 1.0 - f64::from(current) / 6.0;
                        utility_score +=
                            20.0 * f64::from(*stages) * potential_gain * f64::from(*chance) / 100.0;
                    }
                }
                MoveEffect::StatChange {
                    target: EffectTarget::Target,
                    stat,
                    stages,
                    chance,
                } if *stages < 0 => {
                    let current = field.slot(defender_slot).map(|s| s.stage(*stat)).unwrap_or(0);
                    if current > -6 {
                        utility_score += 15.0 * f64::from(stages.unsigned_abs()) * f64::from(*chance) / 100.0;
                    }
                }
                MoveEffect::Status { chance, .. } if defender.status.is_none() => {
                    utility_score += 45.0 * f64::from(*chance) / 100.0;
                }
                MoveEffect::Heal(_) if attacker.hp_ratio() < 0.5 => utility_score += 40.0,
                MoveEffect::SetWeather(weather) if field.current_weather() != Some(*weather) => {
                    utility_score += 10.0
                }
                MoveEffect::SetTerrain(terrain) if field.current_terrain() != Some(*terrain) => {
                    utility_score += 10.0
                }
                MoveEffect::SetScreen(screen) if !field.side(slot.side).has_screen(*screen) => {
                    utility_score += 12.0
                }
                _ => {}
            }
        }

        if move_data.category == MoveCategory::Status && utility_score < 1.0 {
            return -1.0;
        }
        damage_score + utility_score
    }
}

impl ActionProvider for ScoringAi {
    fn choose_action(
        &mut self,
        field: &BattleField,
        slot: SlotId,
        catalog: &dyn DataCatalog,
    ) -> Option<BattleAction> {
        let attacker = field.active_combatant(slot)?;
        let opponents = field.active_opponents(slot);
        if opponents.is_empty() {
            return None;
        }

        let mut best: Option<(OrderedFloat<f64>, MoveId, Option<SlotId>)> = None;
        for move_slot in attacker.moves.iter().filter(|m| m.pp > 0) {
            let Some(move_data) = catalog.move_data(move_slot.move_id) else {
                continue;
            };
            for &opponent in &opponents {
                let Some(defender) = field.active_combatant(opponent) else {
                    continue;
                };
                let jitter = 1.0 + (self.rng.random::<f64>() * 0.1 - 0.05);
                let score = self.score_move(field, slot, attacker, defender, opponent, move_data) * jitter;
                let target = match move_data.target {
                    MoveTarget::SingleOpponent => Some(opponent),
                    _ => None,
                };
                let better = match best {
                    Some((current, _, _)) => OrderedFloat(score) > current,
                    None => true,
                };
                if better {
                    best = Some((OrderedFloat(score), move_slot.move_id, target));
                }
            }
        }

        let (move_id, target) = match best {
            Some((_, move_id, target)) => (move_id, target),
            None => (MoveId::Struggle, opponents.first().copied()),
        };
        Some(use_move(field, slot, move_id, target))
    }

    /// Sends in the healthiest bench member.
    fn choose_replacement(&mut self, field: &BattleField, slot: SlotId) -> Option<usize> {
        let side = field.side(slot.side);
        side.bench()
            .into_iter()
            .max_by_key(|&member| {
                let hp = side.roster.get(member).map(|c| c.hp_ratio()).unwrap_or(0.0);
                (OrderedFloat(hp), std::cmp::Reverse(member))
            })
    }
}

/// Always uses the first move with PP left on the first opponent.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstMoveProvider;

impl ActionProvider for FirstMoveProvider {
    fn choose_action(
        &mut self,
        field: &BattleField,
        slot: SlotId,
        _catalog: &dyn DataCatalog,
    ) -> Option<BattleAction> {
        let combatant = field.active_combatant(slot)?;
        let target = field.active_opponents(slot).first().copied();
        let move_id = combatant
            .moves
            .iter()
            .find(|m| m.pp > 0)
            .map(|m| m.move_id)
            .unwrap_or(MoveId::Struggle);
        Some(use_move(field, slot, move_id, target))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedChoice {
    Move {
        move_id: MoveId,
        target: Option<SlotId>,
    },
    Switch {
        member: usize,
    },
    /// Produce no action this time.
    Pass,
}

/// Plays back a fixed list of choices, one per poll, in order. An exhausted
/// script passes.
#[derive(Debug, Default, Clone)]
pub struct ScriptedProvider {
    choices: VecDeque<ScriptedChoice>,
    replacements: VecDeque<usize>,
}

impl ScriptedProvider {
    pub fn new(choices: impl IntoIterator<Item = ScriptedChoice>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            replacements: VecDeque::new(),
        }
    }

    /// A script that uses the same moves in order, each at the first opponent.
    pub fn moves(moves: impl IntoIterator<Item = MoveId>) -> Self {
        Self::new(moves.into_iter().map(|move_id| ScriptedChoice::Move {
            move_id,
            target: None,
        }))
    }

    pub fn with_replacements(mut self, replacements: impl IntoIterator<Item = usize>) -> Self {
        self.replacements = replacements.into_iter().collect();
        self
    }

    pub fn push(&mut self, choice: ScriptedChoice) {
        self.choices.push_back(choice);
    }

    pub fn remaining(&self) -> usize {
        self.choices.len()
    }
}

impl ActionProvider for ScriptedProvider {
    fn choose_action(
        &mut self,
        field: &BattleField,
        slot: SlotId,
        _catalog: &dyn DataCatalog,
    ) -> Option<BattleAction> {
        match self.choices.pop_front()? {
            ScriptedChoice::Move { move_id, target } => {
                let target = target.or_else(|| field.active_opponents(slot).first().copied());
                Some(use_move(field, slot, move_id, target))
            }
            ScriptedChoice::Switch { member } => Some(BattleAction::Switch { slot, member }),
            ScriptedChoice::Pass => None,
        }
    }

    fn choose_replacement(&mut self, field: &BattleField, slot: SlotId) -> Option<usize> {
        self.replacements
            .pop_front()
            .or_else(|| field.side(slot.side).bench().first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StandardCatalog;
    use crate::config::BattleFormat;
    use schema::SpeciesId;

    fn combatant(catalog: &StandardCatalog, species: SpeciesId, moves: &[MoveId]) -> Combatant {
        let data = catalog.require_species(species).unwrap();
        Combatant::new(data, 50, moves, catalog).unwrap()
    }

    #[test]
    fn test_scoring_ai_prefers_super_effective_move() {
        let catalog = StandardCatalog::builtin();
        let pikachu = combatant(&catalog, SpeciesId::Pikachu, &[MoveId::Tackle, MoveId::Thunderbolt]);
        let blastoise = combatant(&catalog, SpeciesId::Blastoise, &[MoveId::Tackle]);
        let field = BattleField::new(BattleFormat::Singles, vec![pikachu], vec![blastoise]).unwrap();

        let mut ai = ScoringAi::new(1);
        let action = ai.choose_action(&field, SlotId::player(0), &catalog).unwrap();
        match action {
            BattleAction::UseMove { move_id, target, .. } => {
                assert_eq!(move_id, MoveId::Thunderbolt);
                assert_eq!(target, Some(SlotId::enemy(0)));
            }
            other => panic!("expected a move, got {:?}", other),
        }
    }

    #[test]
    fn test_scoring_ai_avoids_immune_target() {
        let catalog = StandardCatalog::builtin();
        let pikachu = combatant(&catalog, SpeciesId::Pikachu, &[MoveId::Thunderbolt, MoveId::Tackle]);
        let garchomp = combatant(&catalog, SpeciesId::Garchomp, &[MoveId::Tackle]);
        let field = BattleField::new(BattleFormat::Singles, vec![pikachu], vec![garchomp]).unwrap();

        let mut ai = ScoringAi::new(9);
        let action = ai.choose_action(&field, SlotId::player(0), &catalog).unwrap();
        assert!(matches!(
            action,
            BattleAction::UseMove {
                move_id: MoveId::Tackle,
                ..
            }
        ));
    }

    #[test]
    fn test_scripted_provider_plays_back_in_order_then_passes() {
        let catalog = StandardCatalog::builtin();
        let pikachu = combatant(&catalog, SpeciesId::Pikachu, &[MoveId::Tackle]);
        let blastoise = combatant(&catalog, SpeciesId::Blastoise, &[MoveId::Tackle]);
        let field = BattleField::new(BattleFormat::Singles, vec![pikachu], vec![blastoise]).unwrap();

        let mut script = ScriptedProvider::new([
            ScriptedChoice::Move {
                move_id: MoveId::Tackle,
                target: None,
            },
            ScriptedChoice::Pass,
        ]);
        let first = script.choose_action(&field, SlotId::player(0), &catalog);
        assert_eq!(
            first,
            Some(BattleAction::UseMove {
                user: SlotId::player(0),
                member: 0,
                move_id: MoveId::Tackle,
                target: Some(SlotId::enemy(0)),
            })
        );
        assert_eq!(script.choose_action(&field, SlotId::player(0), &catalog), None);
        assert_eq!(script.choose_action(&field, SlotId::player(0), &catalog), None);
    }
}

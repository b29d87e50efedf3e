//! The per-turn step list.
//!
//! A turn is an ordered list of named steps sharing one `TurnContext`. After
//! every step the arbiter is consulted and the turn ends early once the
//! battle is decided. New mechanics are added by inserting a step.

use crate::battle::action_queue::{ActionId, ExecutedAction, QueueReport};
use crate::battle::actions::BattleAction;
use crate::battle::arbiter::{check_outcome, BattleOutcome};
use crate::battle::context::BattleRuntime;
use crate::battle::steps::{
    ActionCollectionStep, ActionExecutionStep, ActionSortingStep, EndOfTurnFieldStep,
    FaintedCheckStep, TurnEndTriggersStep, TurnStartStep,
};
use crate::errors::BattleResult;
use crate::telemetry::TelemetryEvent;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSignal {
    Continue,
    /// Skip the remaining steps of this turn.
    Stop,
}

/// Scratch state for one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    pub turn: u32,
    pub collected: Vec<BattleAction>,
    pub sorted: Vec<BattleAction>,
    pub results: BTreeMap<ActionId, ExecutedAction>,
    pub fainted_pending: bool,
}

impl TurnContext {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            ..Self::default()
        }
    }

    pub fn record(&mut self, report: QueueReport) {
        for entry in report.executed {
            self.results.insert(entry.id, entry);
        }
    }
}

pub trait TurnStep: Send {
    fn name(&self) -> &'static str;

    /// Whether the step still runs once a fainted combatant has been replaced
    /// this turn.
    fn runs_when_fainted_pending(&self) -> bool {
        false
    }

    fn execute(&self, rt: &mut BattleRuntime, turn: &mut TurnContext) -> BattleResult<StepSignal>;
}

pub struct TurnPipeline {
    steps: Vec<Box<dyn TurnStep>>,
}

impl Default for TurnPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl TurnPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.push(Box::new(TurnStartStep));
        pipeline.push(Box::new(ActionCollectionStep));
        pipeline.push(Box::new(ActionSortingStep));
        pipeline.push(Box::new(ActionExecutionStep));
        pipeline.push(Box::new(EndOfTurnFieldStep));
        pipeline.push(Box::new(FaintedCheckStep));
        pipeline.push(Box::new(TurnEndTriggersStep));
        pipeline
    }

    pub fn push(&mut self, step: Box<dyn TurnStep>) {
        self.steps.push(step);
    }

    /// Inserts `step` ahead of the step called `before`. Returns false and
    /// leaves the pipeline untouched if there is no such step.
    pub fn insert_before(&mut self, before: &str, step: Box<dyn TurnStep>) -> bool {
        match self.steps.iter().position(|existing| existing.name() == before) {
            Some(index) => {
                self.steps.insert(index, step);
                true
            }
            None => false,
        }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    pub fn run_turn(&self, rt: &mut BattleRuntime) -> BattleResult<BattleOutcome> {
        let mut turn = TurnContext::new(rt.ctx.field.turn);

        for step in &self.steps {
            if turn.fainted_pending && !step.runs_when_fainted_pending() {
                debug!(turn = turn.turn, step = step.name(), "skipping step: replacement pending");
                continue;
            }

            debug!(turn = turn.turn, step = step.name(), "running step");
            rt.ctx.telemetry.publish(&TelemetryEvent::StepStarted {
                turn: turn.turn,
                step: step.name().to_string(),
            });
            let signal = step.execute(rt, &mut turn)?;
            rt.ctx.telemetry.publish(&TelemetryEvent::StepFinished {
                turn: turn.turn,
                step: step.name().to_string(),
            });

            let outcome = check_outcome(&rt.ctx.field);
            if outcome.is_decided() {
                debug!(turn = turn.turn, step = step.name(), %outcome, "battle decided");
                return Ok(outcome);
            }
            if signal == StepSignal::Stop {
                break;
            }
        }

        Ok(check_outcome(&rt.ctx.field))
    }
}

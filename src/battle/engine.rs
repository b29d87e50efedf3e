use crate::battle::action_queue::ActionQueue;
use crate::battle::arbiter::{check_outcome, BattleOutcome};
use crate::battle::context::{BattleContext, BattleRuntime};
use crate::battle::field::{BattleField, SlotId};
use crate::battle::pipeline::TurnPipeline;
use crate::battle::triggers::TriggerEvent;
use crate::battle::turn_order::effective_speed;
use crate::battle::validation::validate_field;
use crate::catalog::DataCatalog;
use crate::config::BattleConfig;
use crate::errors::BattleResult;
use crate::providers::ActionProvider;
use crate::telemetry::{TelemetryEvent, TelemetryObserver};
use crate::view::{BattleView, ViewEvent};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Lets another thread stop a battle. The flag is only read between turns.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum BattleConclusion {
    Decided(BattleOutcome),
    TurnLimit,
    /// A fatal error or an external abort ended the battle.
    Aborted { diagnostic: String },
}

impl fmt::Display for BattleConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleConclusion::Decided(outcome) => write!(f, "{}", outcome),
            BattleConclusion::TurnLimit => write!(f, "turn-limit"),
            BattleConclusion::Aborted { .. } => write!(f, "aborted"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BattleReport {
    pub conclusion: BattleConclusion,
    pub turns: u32,
}

/// Owns one battle from lead switch-in to conclusion.
pub struct BattleEngine {
    runtime: BattleRuntime,
    pipeline: TurnPipeline,
    abort: AbortHandle,
    started: bool,
}

impl BattleEngine {
    pub fn new(
        field: BattleField,
        config: BattleConfig,
        catalog: Arc<dyn DataCatalog>,
        providers: [Box<dyn ActionProvider>; 2],
        view: Box<dyn BattleView>,
    ) -> BattleResult<Self> {
        config.validate()?;
        let ctx = BattleContext::new(field, config, catalog);
        Ok(Self {
            runtime: BattleRuntime::new(ctx, view, providers),
            pipeline: TurnPipeline::standard(),
            abort: AbortHandle::default(),
            started: false,
        })
    }

    pub fn with_pipeline(mut self, pipeline: TurnPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn TelemetryObserver>) {
        self.runtime.ctx.telemetry.subscribe(observer);
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn field(&self) -> &BattleField {
        &self.runtime.ctx.field
    }

    pub fn field_mut(&mut self) -> &mut BattleField {
        &mut self.runtime.ctx.field
    }

    pub fn context(&self) -> &BattleContext {
        &self.runtime.ctx
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.runtime.queue
    }

    pub fn pipeline(&self) -> &TurnPipeline {
        &self.pipeline
    }

    pub fn outcome(&self) -> BattleOutcome {
        check_outcome(&self.runtime.ctx.field)
    }

    /// Announces the leads and resolves their switch-in listeners, fastest first.
    pub fn start(&mut self) -> BattleResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        let rt = &mut self.runtime;
        rt.ctx.telemetry.publish(&TelemetryEvent::BattleStarted {
            format: rt.ctx.field.format,
            seed: rt.ctx.config.seed,
        });
        info!(format = ?rt.ctx.field.format, seed = ?rt.ctx.config.seed, "battle started");
        rt.ctx.rebuild_listeners();

        let catalog = Arc::clone(&rt.ctx.catalog);
        let mut leads: Vec<(OrderedFloat<f64>, u64, SlotId)> = rt
            .ctx
            .field
            .active_slots()
            .into_iter()
            .map(|slot| {
                let speed = effective_speed(&rt.ctx.field, slot, catalog.as_ref());
                (OrderedFloat(speed), rt.ctx.rng.tie_breaker(), slot)
            })
            .collect();
        leads.sort_by_key(|&(speed, tie_breaker, _)| Reverse((speed, tie_breaker)));

        for (_, _, slot) in leads {
            if let Some(combatant) = rt.ctx.field.active_combatant(slot) {
                rt.view.present(&ViewEvent::SwitchedIn {
                    slot,
                    name: combatant.name().to_string(),
                    previous: None,
                });
            }
            let reactions = rt.ctx.publish(&TriggerEvent::SwitchIn { slot });
            rt.run_actions(reactions)?;
        }
        Ok(())
    }

    /// Runs one full turn and validates the field afterwards.
    pub fn run_turn(&mut self) -> BattleResult<BattleOutcome> {
        self.start()?;
        let outcome = self.outcome();
        if outcome.is_decided() {
            return Ok(outcome);
        }

        self.runtime.ctx.field.turn += 1;
        let outcome = self.pipeline.run_turn(&mut self.runtime)?;
        if self.runtime.ctx.config.validate_each_turn {
            validate_field(&self.runtime.ctx.field)?;
        }
        Ok(outcome)
    }

    /// Plays turns until the battle is decided, the turn limit is hit, or the
    /// abort handle fires. Fatal errors end the battle with a diagnostic.
    pub fn run(&mut self) -> BattleReport {
        let conclusion = loop {
            if self.abort.is_aborted() {
                break BattleConclusion::Aborted {
                    diagnostic: String::from("aborted by caller"),
                };
            }
            if self.runtime.ctx.field.turn >= self.runtime.ctx.config.max_turns {
                break BattleConclusion::TurnLimit;
            }
            match self.run_turn() {
                Ok(outcome) if outcome.is_decided() => break BattleConclusion::Decided(outcome),
                Ok(_) => {}
                Err(err) => {
                    error!(turn = self.runtime.ctx.field.turn, error = %err, "battle aborted");
                    break BattleConclusion::Aborted {
                        diagnostic: err.to_string(),
                    };
                }
            }
        };

        let turns = self.runtime.ctx.field.turn;
        self.runtime.ctx.telemetry.publish(&TelemetryEvent::BattleEnded {
            turns,
            conclusion: conclusion.to_string(),
        });
        info!(turns, %conclusion, "battle ended");
        BattleReport { conclusion, turns }
    }
}

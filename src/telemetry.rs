//! Structured events for statistics and debugging. Observers are isolated:
//! a failing observer is logged and skipped, and nothing they do changes how
//! the battle proceeds.

use crate::battle::field::SlotId;
use crate::config::BattleFormat;
use crate::errors::TelemetryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    BattleStarted {
        format: BattleFormat,
        seed: Option<u64>,
    },
    TurnStarted {
        turn: u32,
    },
    TurnEnded {
        turn: u32,
    },
    StepStarted {
        turn: u32,
        step: String,
    },
    StepFinished {
        turn: u32,
        step: String,
    },
    ActionExecuted {
        turn: u32,
        action_id: u64,
        kind: String,
        user: Option<SlotId>,
    },
    DamageApplied {
        turn: u32,
        target: SlotId,
        amount: u16,
    },
    BattleEnded {
        turns: u32,
        conclusion: String,
    },
}

pub trait TelemetryObserver: Send {
    fn name(&self) -> &str;
    fn observe(&mut self, event: &TelemetryEvent) -> Result<(), TelemetryError>;
}

#[derive(Default)]
pub struct TelemetryBus {
    observers: Vec<Box<dyn TelemetryObserver>>,
}

impl TelemetryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn TelemetryObserver>) {
        self.observers.push(observer);
    }

    pub fn publish(&mut self, event: &TelemetryEvent) {
        for observer in &mut self.observers {
            if let Err(err) = observer.observe(event) {
                warn!(observer = observer.name(), error = %err, "telemetry observer failed");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for TelemetryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.observers.iter().map(|o| o.name()).collect();
        f.debug_struct("TelemetryBus").field("observers", &names).finish()
    }
}

/// Writes one JSON object per event.
pub struct JsonLinesObserver<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> TelemetryObserver for JsonLinesObserver<W> {
    fn name(&self) -> &str {
        "json-lines"
    }

    fn observe(&mut self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BattleStatistics {
    pub battles: u64,
    pub turns: u64,
    pub actions_by_kind: BTreeMap<String, u64>,
    pub total_damage: u64,
    pub conclusions: BTreeMap<String, u64>,
}

impl BattleStatistics {
    pub fn record(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::TurnEnded { .. } => self.turns += 1,
            TelemetryEvent::ActionExecuted { kind, .. } => {
                *self.actions_by_kind.entry(kind.clone()).or_insert(0) += 1;
            }
            TelemetryEvent::DamageApplied { amount, .. } => self.total_damage += *amount as u64,
            TelemetryEvent::BattleEnded { conclusion, .. } => {
                self.battles += 1;
                *self.conclusions.entry(conclusion.clone()).or_insert(0) += 1;
            }
            _ => {}
        }
    }

    pub fn average_turns(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.turns as f64 / self.battles as f64
    }
}

/// Aggregates events into shared `BattleStatistics`. Several collectors can
/// feed the same handle, one per battle in a batch.
#[derive(Debug, Clone, Default)]
pub struct StatisticsCollector {
    stats: Arc<Mutex<BattleStatistics>>,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sharing(stats: Arc<Mutex<BattleStatistics>>) -> Self {
        Self { stats }
    }

    pub fn handle(&self) -> Arc<Mutex<BattleStatistics>> {
        Arc::clone(&self.stats)
    }
}

impl TelemetryObserver for StatisticsCollector {
    fn name(&self) -> &str {
        "statistics"
    }

    fn observe(&mut self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        let mut stats = self.stats.lock().map_err(|_| TelemetryError::Poisoned)?;
        stats.record(event);
        Ok(())
    }
}

use std::collections::VecDeque;

use crate::battle::actions::BattleAction;
use crate::battle::context::BattleContext;
use crate::battle::field::SlotId;
use crate::battle::move_execution::MoveResolution;
use crate::errors::{BattleEngineError, BattleResult};
use crate::telemetry::TelemetryEvent;
use crate::view::BattleView;
use tracing::{debug, error};

/// Identity of an action for the lifetime of a battle, assigned on enqueue.
pub type ActionId = u64;

#[derive(Debug, Clone)]
struct QueuedAction {
    id: ActionId,
    action: BattleAction,
}

/// One executed action, as reported back from a drain.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedAction {
    pub id: ActionId,
    pub kind: &'static str,
    pub user: Option<SlotId>,
    pub reactions: usize,
    pub resolution: Option<MoveResolution>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueReport {
    pub executed: Vec<ExecutedAction>,
}

impl QueueReport {
    pub fn len(&self) -> usize {
        self.executed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executed.is_empty()
    }

    /// Kinds in execution order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.executed.iter().map(|entry| entry.kind).collect()
    }

    pub fn extend(&mut self, other: QueueReport) {
        self.executed.extend(other.executed);
    }
}

/// The worklist of pending actions. Siblings run in the order they were
/// enqueued; reactions returned by an action run immediately after it, in
/// the order they were returned, ahead of anything already waiting.
#[derive(Debug)]
pub struct ActionQueue {
    actions: VecDeque<QueuedAction>,
    next_id: ActionId,
    max_iterations: usize,
}

impl ActionQueue {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            actions: VecDeque::new(),
            next_id: 0,
            max_iterations,
        }
    }

    fn allocate_id(&mut self) -> ActionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Adds an action to the end of the queue.
    pub fn enqueue(&mut self, action: BattleAction) -> ActionId {
        let id = self.allocate_id();
        self.actions.push_back(QueuedAction { id, action });
        id
    }

    /// Adds actions to the end of the queue, keeping their order.
    pub fn enqueue_range(&mut self, actions: impl IntoIterator<Item = BattleAction>) -> Vec<ActionId> {
        actions
            .into_iter()
            .map(|action| self.enqueue(action))
            .collect()
    }

    /// Puts reactions at the front so the first one runs next.
    fn push_reactions(&mut self, reactions: Vec<BattleAction>) {
        let ids: Vec<ActionId> = reactions.iter().map(|_| self.allocate_id()).collect();
        for (id, action) in ids.into_iter().zip(reactions).rev() {
            self.actions.push_front(QueuedAction { id, action });
        }
    }

    pub fn peek(&self) -> Option<&BattleAction> {
        self.actions.front().map(|entry| &entry.action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleAction> {
        self.actions.iter().map(|entry| &entry.action)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Executes actions until the queue is empty. Each action runs against
    /// the current field, its notices go to the view, the view gets one
    /// suspension point, and its reactions are scheduled next.
    pub fn process_queue(
        &mut self,
        ctx: &mut BattleContext,
        view: &mut dyn BattleView,
    ) -> BattleResult<QueueReport> {
        let mut report = QueueReport::default();
        let mut iterations = 0usize;

        while let Some(QueuedAction { id, action }) = self.actions.pop_front() {
            iterations += 1;
            if iterations > self.max_iterations {
                error!(
                    limit = self.max_iterations,
                    pending = self.actions.len() + 1,
                    "action queue did not drain; dropping pending actions"
                );
                self.actions.clear();
                return Err(BattleEngineError::RunawayQueue {
                    limit: self.max_iterations,
                });
            }

            debug!(action_id = id, kind = action.kind(), user = ?action.user(), "executing action");
            let outcome = action.execute(ctx)?;

            for notice in &outcome.notices {
                view.present(notice);
            }
            view.suspend();

            ctx.telemetry.publish(&TelemetryEvent::ActionExecuted {
                turn: ctx.field.turn,
                action_id: id,
                kind: action.kind().to_string(),
                user: action.user(),
            });

            report.executed.push(ExecutedAction {
                id,
                kind: action.kind(),
                user: action.user(),
                reactions: outcome.reactions.len(),
                resolution: outcome.resolution,
            });
            self.push_reactions(outcome.reactions);
        }

        Ok(report)
    }
}

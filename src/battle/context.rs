use crate::battle::action_queue::{ActionQueue, QueueReport};
use crate::battle::actions::BattleAction;
use crate::battle::damage::DamagePipeline;
use crate::battle::field::{BattleField, SideId};
use crate::battle::triggers::{TriggerDispatcher, TriggerEvent};
use crate::catalog::DataCatalog;
use crate::config::BattleConfig;
use crate::errors::BattleResult;
use crate::providers::ActionProvider;
use crate::rng::BattleRng;
use crate::telemetry::TelemetryBus;
use crate::view::BattleView;
use std::sync::Arc;

/// Everything an action may read or mutate while it executes. One context
/// exists per battle and it is passed down explicitly; there is no global
/// state.
pub struct BattleContext {
    pub field: BattleField,
    pub rng: BattleRng,
    pub catalog: Arc<dyn DataCatalog>,
    pub config: BattleConfig,
    pub dispatcher: TriggerDispatcher,
    pub damage: DamagePipeline,
    pub telemetry: TelemetryBus,
}

impl BattleContext {
    pub fn new(field: BattleField, config: BattleConfig, catalog: Arc<dyn DataCatalog>) -> Self {
        let rng = BattleRng::from_optional_seed(config.seed);
        let mut dispatcher = TriggerDispatcher::new();
        dispatcher.rebuild(&field);
        Self {
            field,
            rng,
            catalog,
            config,
            dispatcher,
            damage: DamagePipeline::standard(),
            telemetry: TelemetryBus::new(),
        }
    }

    /// Runs every listener for `event` and returns their reactions. The
    /// caller decides when to enqueue them.
    pub fn publish(&mut self, event: &TriggerEvent) -> Vec<BattleAction> {
        self.dispatcher
            .publish(event, &self.field, self.catalog.as_ref(), &mut self.rng)
    }

    /// Re-registers ability and item listeners after the occupants changed.
    pub fn rebuild_listeners(&mut self) {
        self.dispatcher.rebuild(&self.field);
    }
}

/// The state a turn step works with: the context plus the queue, the view
/// and the two action providers.
pub struct BattleRuntime {
    pub ctx: BattleContext,
    pub queue: ActionQueue,
    pub view: Box<dyn BattleView>,
    pub providers: [Box<dyn ActionProvider>; 2],
}

impl BattleRuntime {
    pub fn new(
        ctx: BattleContext,
        view: Box<dyn BattleView>,
        providers: [Box<dyn ActionProvider>; 2],
    ) -> Self {
        let queue = ActionQueue::new(ctx.config.max_queue_iterations);
        Self {
            ctx,
            queue,
            view,
            providers,
        }
    }

    pub fn provider(&mut self, side: SideId) -> &mut dyn ActionProvider {
        self.providers[side.index()].as_mut()
    }

    /// Drains the queue against the context, presenting to the view.
    pub fn drain(&mut self) -> BattleResult<QueueReport> {
        self.queue.process_queue(&mut self.ctx, self.view.as_mut())
    }

    /// Enqueues `actions` at the back and drains.
    pub fn run_actions(&mut self, actions: Vec<BattleAction>) -> BattleResult<QueueReport> {
        self.queue.enqueue_range(actions);
        self.drain()
    }
}

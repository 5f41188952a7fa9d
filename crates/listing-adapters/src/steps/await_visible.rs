use std::sync::Arc;

use listing_core::adapter::ObjectStore;
use listing_core::{ExecutionContext, ExistencePoller, FlowError, InputSlot, PollPolicy, StepDefinition, StepKind,
                   StepOutputs, StepRunResult};

use super::{AWAIT_VISIBLE, TRANSFER};

/// Sensor: espera a que la key transferida sea visible en el store.
pub struct AwaitVisibleStep {
    store: Arc<dyn ObjectStore>,
    poller: ExistencePoller,
}

impl AwaitVisibleStep {
    pub const OUTPUTS: &'static [&'static str] = &["visible_key", "checks"];

    pub fn new(store: Arc<dyn ObjectStore>, policy: PollPolicy) -> Self {
        Self { store,
               poller: ExistencePoller::new(policy) }
    }

    fn wait(&self, ctx: &ExecutionContext<'_>) -> Result<StepOutputs, FlowError> {
        let key: String = ctx.input_as(TRANSFER, "landed_key")?;
        let vis = self.poller.require_visible(self.store.as_ref(), &key, ctx.clock, ctx.cancel)?;
        StepOutputs::new().with("visible_key", &key)?.with("checks", &vis.checks())
    }
}

impl StepDefinition for AwaitVisibleStep {
    fn id(&self) -> &str {
        AWAIT_VISIBLE
    }

    fn kind(&self) -> StepKind {
        StepKind::Sensor
    }

    fn inputs(&self) -> Vec<InputSlot> {
        vec![InputSlot::new(TRANSFER, "landed_key")]
    }

    fn outputs(&self) -> &[&'static str] {
        Self::OUTPUTS
    }

    fn run(&self, ctx: &ExecutionContext<'_>) -> StepRunResult {
        self.wait(ctx).into()
    }
}

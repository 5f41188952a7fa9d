//! TransferStep: mueve el artifact de staging al área de aterrizaje.

use std::sync::Arc;

use listing_core::adapter::{ObjectStore, StoreError};
use listing_core::{ArtifactRef, ExecutionContext, FlowError, InputSlot, StepDefinition, StepKind, StepOutputs,
                   StepRunResult};
use log::{info, warn};

use super::{EXTRACT, TRANSFER};

pub struct TransferStep {
    store: Arc<dyn ObjectStore>,
    landing_prefix: String,
}

impl TransferStep {
    pub const OUTPUTS: &'static [&'static str] = &["landed_key"];

    pub fn new(store: Arc<dyn ObjectStore>, landing_prefix: impl Into<String>) -> Self {
        Self { store,
               landing_prefix: landing_prefix.into() }
    }

    fn transfer(&self, ctx: &ExecutionContext<'_>) -> Result<StepOutputs, FlowError> {
        let artifact: ArtifactRef = ctx.input_as(EXTRACT, "artifact")?;
        let staging_key: String = ctx.input_as(EXTRACT, "staging_key")?;
        let landed_key = format!("{}{}", self.landing_prefix, artifact.key);

        match self.store.move_object(&staging_key, &landed_key) {
            Ok(()) => info!("moved {staging_key} -> {landed_key}"),
            // Un intento anterior ya movió el objeto pero falló después.
            Err(StoreError::NotFound(_)) if self.store.exists(&landed_key).unwrap_or(false) => {
                warn!("{staging_key} already moved to {landed_key}")
            }
            Err(e) => return Err(FlowError::StoreWriteFailed(format!("move {staging_key} -> {landed_key}: {e}"))),
        }
        StepOutputs::new().with("landed_key", &landed_key)
    }
}

impl StepDefinition for TransferStep {
    fn id(&self) -> &str {
        TRANSFER
    }

    fn kind(&self) -> StepKind {
        StepKind::Transfer
    }

    fn inputs(&self) -> Vec<InputSlot> {
        vec![InputSlot::new(EXTRACT, "artifact"), InputSlot::new(EXTRACT, "staging_key")]
    }

    fn outputs(&self) -> &[&'static str] {
        Self::OUTPUTS
    }

    fn run(&self, ctx: &ExecutionContext<'_>) -> StepRunResult {
        self.transfer(ctx).into()
    }
}

//! SelectLatestStep: elige el artifact más reciente del área de aterrizaje.
//!
//! No lee la key de su predecesor: lista todo lo que hay bajo el prefijo de
//! descubrimiento. Puede elegir un artifact de otro run si es más nuevo.

use std::sync::Arc;

use listing_core::adapter::ObjectStore;
use listing_core::{select_latest_conforming, ArtifactNaming, ExecutionContext, FlowError, MalformedKeyPolicy,
                   StepDefinition, StepKind, StepOutputs, StepRunResult};
use log::info;

use super::{AWAIT_VISIBLE, SELECT_LATEST};

pub struct SelectLatestStep {
    store: Arc<dyn ObjectStore>,
    naming: ArtifactNaming,
    discovery_prefix: String,
    malformed: MalformedKeyPolicy,
}

impl SelectLatestStep {
    pub const OUTPUTS: &'static [&'static str] = &["selected_key", "candidate_count"];

    pub fn new(store: Arc<dyn ObjectStore>, naming: ArtifactNaming, landing_prefix: &str, malformed: MalformedKeyPolicy) -> Self {
        let discovery_prefix = format!("{landing_prefix}{}", naming.prefix());
        Self { store,
               naming,
               discovery_prefix,
               malformed }
    }

    pub fn discovery_prefix(&self) -> &str {
        &self.discovery_prefix
    }

    fn select(&self) -> Result<StepOutputs, FlowError> {
        let candidates = self.store
                             .list(&self.discovery_prefix)
                             .map_err(|e| FlowError::AdapterError(format!("list {}: {e}", self.discovery_prefix)))?;
        let selected = select_latest_conforming(&self.naming, &candidates, self.malformed)?;
        info!("selected {selected} among {} candidates", candidates.len());
        StepOutputs::new().with("selected_key", &selected)?.with("candidate_count", &candidates.len())
    }
}

impl StepDefinition for SelectLatestStep {
    fn id(&self) -> &str {
        SELECT_LATEST
    }

    fn kind(&self) -> StepKind {
        StepKind::Resolve
    }

    fn after(&self) -> Vec<String> {
        vec![AWAIT_VISIBLE.to_string()]
    }

    fn outputs(&self) -> &[&'static str] {
        Self::OUTPUTS
    }

    fn run(&self, _ctx: &ExecutionContext<'_>) -> StepRunResult {
        self.select().into()
    }
}

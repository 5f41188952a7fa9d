//! Definición del flujo de listings a partir de settings y adapters.

use std::sync::Arc;
use std::time::Duration;

use listing_core::adapter::{CopyOptions, ListingsSource, ObjectStore, WarehouseLoader};
use listing_core::{ArtifactNaming, FlowDefinition, FlowError, MalformedKeyPolicy, PollPolicy, RetryPolicy};
use serde::{Deserialize, Serialize};

use crate::steps::{AwaitVisibleStep, ExtractStep, LoadStep, SelectLatestStep, TransferStep};

/// Parámetros del pipeline independientes de los adapters concretos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub naming: ArtifactNaming,
    /// Prefijo donde el extract deja la respuesta cruda.
    pub staging_prefix: String,
    /// Prefijo del área donde se aterriza, se espera y se descubre.
    pub landing_prefix: String,
    pub poll: PollPolicy,
    /// Política aplicada a cada step.
    pub retry: RetryPolicy,
    pub malformed_keys: MalformedKeyPolicy,
    pub schema: String,
    pub table: String,
    pub copy_options: CopyOptions,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { naming: ArtifactNaming::new("response_data", "csv"),
               staging_prefix: "staging/".into(),
               landing_prefix: String::new(),
               poll: PollPolicy::default(),
               retry: RetryPolicy::new(2, Duration::from_secs(15)),
               malformed_keys: MalformedKeyPolicy::default(),
               schema: "PUBLIC".into(),
               table: "zillowdata".into(),
               copy_options: CopyOptions::default() }
    }
}

/// Colaboradores externos del pipeline.
#[derive(Clone)]
pub struct Adapters {
    pub source: Arc<dyn ListingsSource>,
    pub store: Arc<dyn ObjectStore>,
    pub warehouse: Arc<dyn WarehouseLoader>,
}

/// Extract -> Transfer -> AwaitVisible -> SelectLatest -> Load.
pub fn listings_flow(settings: &PipelineSettings, adapters: &Adapters) -> Result<FlowDefinition, FlowError> {
    let retry = settings.retry;
    FlowDefinition::builder().add_step(ExtractStep::new(adapters.source.clone(),
                                                        adapters.store.clone(),
                                                        settings.naming.clone(),
                                                        settings.staging_prefix.clone()),
                                       retry)
                             .add_step(TransferStep::new(adapters.store.clone(), settings.landing_prefix.clone()), retry)
                             .add_step(AwaitVisibleStep::new(adapters.store.clone(), settings.poll), retry)
                             .add_step(SelectLatestStep::new(adapters.store.clone(),
                                                             settings.naming.clone(),
                                                             &settings.landing_prefix,
                                                             settings.malformed_keys),
                                       retry)
                             .add_step(LoadStep::new(adapters.warehouse.clone(),
                                                     settings.schema.clone(),
                                                     settings.table.clone(),
                                                     settings.copy_options.clone()),
                                       retry)
                             .build()
}

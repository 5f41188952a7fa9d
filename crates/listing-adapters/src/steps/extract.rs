//! ExtractStep (Source)
//!
//! Pide los listados al origen y deja la respuesta en `staging/<key>`. La key
//! sale del timestamp lógico del run, así un reintento reescribe el mismo
//! objeto.

use std::sync::Arc;

use chrono::Utc;
use listing_core::adapter::{ListingsSource, ObjectStore};
use listing_core::{ArtifactNaming, ArtifactRef, ExecutionContext, FlowError, StepDefinition, StepKind, StepOutputs,
                   StepRunResult};
use log::info;
use sha2::{Digest, Sha256};

use super::EXTRACT;

pub struct ExtractStep {
    source: Arc<dyn ListingsSource>,
    store: Arc<dyn ObjectStore>,
    naming: ArtifactNaming,
    staging_prefix: String,
}

impl ExtractStep {
    pub const OUTPUTS: &'static [&'static str] = &["artifact", "staging_key"];

    pub fn new(source: Arc<dyn ListingsSource>,
               store: Arc<dyn ObjectStore>,
               naming: ArtifactNaming,
               staging_prefix: impl Into<String>)
               -> Self {
        Self { source,
               store,
               naming,
               staging_prefix: staging_prefix.into() }
    }

    fn extract(&self, ctx: &ExecutionContext<'_>) -> Result<StepOutputs, FlowError> {
        let body = self.source.fetch().map_err(|e| FlowError::SourceFetchFailed(e.to_string()))?;
        let key = self.naming.key_for(&ctx.run.logical_ts);
        let staging_key = format!("{}{key}", self.staging_prefix);
        self.store
            .put(&staging_key, &body)
            .map_err(|e| FlowError::StoreWriteFailed(format!("{staging_key}: {e}")))?;

        let artifact = ArtifactRef { key,
                                     location: staging_key.clone(),
                                     size_bytes: body.len() as u64,
                                     content_digest: format!("{:x}", Sha256::digest(&body)),
                                     created_at: Utc::now() };
        info!("extracted {} bytes into {staging_key}", artifact.size_bytes);
        StepOutputs::new().with("artifact", &artifact)?.with("staging_key", &staging_key)
    }
}

impl StepDefinition for ExtractStep {
    fn id(&self) -> &str {
        EXTRACT
    }

    fn kind(&self) -> StepKind {
        StepKind::Source
    }

    fn outputs(&self) -> &[&'static str] {
        Self::OUTPUTS
    }

    fn run(&self, ctx: &ExecutionContext<'_>) -> StepRunResult {
        self.extract(ctx).into()
    }
}

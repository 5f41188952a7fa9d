use std::sync::Arc;

use listing_core::adapter::{CopyOptions, LoadRequest, WarehouseLoader};
use listing_core::{ExecutionContext, FlowError, InputSlot, StepDefinition, StepKind, StepOutputs, StepRunResult};

use super::{LOAD, SELECT_LATEST};

/// Sink: carga la key seleccionada en `schema.table`.
pub struct LoadStep {
    warehouse: Arc<dyn WarehouseLoader>,
    schema: String,
    table: String,
    options: CopyOptions,
}

impl LoadStep {
    pub const OUTPUTS: &'static [&'static str] = &["table", "rows_loaded"];

    pub fn new(warehouse: Arc<dyn WarehouseLoader>, schema: impl Into<String>, table: impl Into<String>, options: CopyOptions) -> Self {
        Self { warehouse,
               schema: schema.into(),
               table: table.into(),
               options }
    }

    fn load(&self, ctx: &ExecutionContext<'_>) -> Result<StepOutputs, FlowError> {
        let source_key: String = ctx.input_as(SELECT_LATEST, "selected_key")?;
        let request = LoadRequest { schema: self.schema.clone(),
                                    table: self.table.clone(),
                                    source_key,
                                    options: self.options.clone() };
        let summary = self.warehouse
                          .load(&request)
                          .map_err(|e| FlowError::LoadFailed(format!("{} -> {}.{}: {e}", request.source_key, self.schema, self.table)))?;
        StepOutputs::new().with("table", &format!("{}.{}", self.schema, self.table))?
                          .with("rows_loaded", &summary.rows_loaded)
    }
}

impl StepDefinition for LoadStep {
    fn id(&self) -> &str {
        LOAD
    }

    fn kind(&self) -> StepKind {
        StepKind::Sink
    }

    fn inputs(&self) -> Vec<InputSlot> {
        vec![InputSlot::new(SELECT_LATEST, "selected_key")]
    }

    fn outputs(&self) -> &[&'static str] {
        Self::OUTPUTS
    }

    fn run(&self, ctx: &ExecutionContext<'_>) -> StepRunResult {
        self.load(ctx).into()
    }
}

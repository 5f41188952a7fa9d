pub mod types;
pub use types::{FlowRepository, RunOutcome, RunReport, StepSlot};
pub use types::{FlowDefinition, FlowDefinitionBuilder, InMemoryFlowRepository, StepNode};

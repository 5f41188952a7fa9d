//! Modelos neutrales (Run, ArtifactRef, StepOutputs, ExecutionContext).

pub mod artifact;
pub mod context;
pub mod outputs;
pub mod run;

pub use artifact::ArtifactRef;
pub use context::{ExecutionContext, InputSlot, ResolvedInputs};
pub use outputs::StepOutputs;
pub use run::Run;

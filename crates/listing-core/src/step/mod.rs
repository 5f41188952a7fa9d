//! Definiciones relacionadas a Steps.
//!
//! Un Step es una unidad de trabajo orquestada: declara qué campos de sus
//! predecesores consume (`InputSlot`) y qué campos produce. Este módulo
//! define:
//! - `StepDefinition`: interfaz usada por el engine.
//! - `StepRunResult`: resultado de un intento.
//! - `StepStatus`: máquina de estados por step.
//! - `RetryPolicy` / `RetryState`: política de reintentos inspeccionable.

pub mod definition;
pub mod retry;
mod run_result;
mod status;

pub use definition::{StepDefinition, StepKind};
pub use retry::{RetryDecision, RetryPolicy, RetryState};
pub use run_result::StepRunResult;
pub use status::StepStatus;

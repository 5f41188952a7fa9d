use serde::{Deserialize, Serialize};

use super::run_result::StepRunResult;
use crate::model::{ExecutionContext, InputSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind { Source, Transfer, Sensor, Resolve, Sink }

/// Trait que define un Step.
///
/// `run` debe poder repetirse desde cero: el engine no reanuda intentos
/// parciales, vuelve a llamar a `run` con un contexto nuevo.
pub trait StepDefinition: Send + Sync {
    /// Identificador estable y único dentro del Flow.
    fn id(&self) -> &str;

    /// Tipo general del step.
    fn kind(&self) -> StepKind;

    /// Campos de predecesores que el step consume. Cada slot implica una
    /// dependencia sobre `slot.step`.
    fn inputs(&self) -> Vec<InputSlot> {
        Vec::new()
    }

    /// Dependencias de orden que no transportan datos.
    fn after(&self) -> Vec<String> {
        Vec::new()
    }

    /// Campos que el step promete producir en caso de éxito.
    fn outputs(&self) -> &[&'static str] {
        &[]
    }

    /// Ejecución de un intento.
    fn run(&self, ctx: &ExecutionContext<'_>) -> StepRunResult;
}

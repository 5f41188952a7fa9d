use serde::{Deserialize, Serialize};

/// Estado de un Step dentro de un run.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Running`
/// - `Running` -> `Succeeded`
/// - `Running` -> `Failed`
/// - `Failed` -> `Running` (reintento, mientras quede presupuesto)
///
/// Un step cuyo predecesor falló de forma terminal queda en `Pending` y se
/// reporta como omitido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// El paso está pendiente de ejecución.
    Pending,
    /// El paso está en ejecución.
    Running,
    /// El paso finalizó correctamente.
    Succeeded,
    /// El paso falló.
    Failed,
}

impl StepStatus {
    pub fn can_transition_to(self, next: StepStatus) -> bool {
        use StepStatus::*;
        matches!((self, next), (Pending, Running) | (Running, Succeeded) | (Running, Failed) | (Failed, Running))
    }
}

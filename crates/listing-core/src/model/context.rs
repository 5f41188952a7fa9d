use std::fmt;

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::Run;
use crate::clock::{CancelToken, Clock};
use crate::errors::FlowError;

/// Referencia a un campo del output de un step predecesor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSlot {
    pub step: String,
    pub field: String,
}

impl InputSlot {
    pub fn new(step: impl Into<String>, field: impl Into<String>) -> Self {
        Self { step: step.into(),
               field: field.into() }
    }
}

impl fmt::Display for InputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.step, self.field)
    }
}

/// Inputs ya resueltos por el engine: sólo los slots declarados por el step.
pub type ResolvedInputs = IndexMap<InputSlot, Value>;

/// Contexto de ejecución entregado a `StepDefinition::run`.
pub struct ExecutionContext<'a> {
    pub run: &'a Run,
    /// Intento actual, empezando en 1.
    pub attempt: u32,
    pub inputs: ResolvedInputs,
    pub clock: &'a dyn Clock,
    pub cancel: &'a CancelToken,
}

impl ExecutionContext<'_> {
    pub fn input(&self, step: &str, field: &str) -> Option<&Value> {
        self.inputs
            .iter()
            .find(|(slot, _)| slot.step == step && slot.field == field)
            .map(|(_, v)| v)
    }

    /// Decodifica un input declarado al tipo pedido.
    pub fn input_as<T: DeserializeOwned>(&self, step: &str, field: &str) -> Result<T, FlowError> {
        let v = self.input(step, field)
                    .ok_or_else(|| FlowError::DependencyContractViolation(format!("undeclared input {step}.{field}")))?;
        serde_json::from_value(v.clone()).map_err(|e| FlowError::DependencyContractViolation(format!("input {step}.{field}: {e}")))
    }
}

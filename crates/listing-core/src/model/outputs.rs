//! Outputs de un step: mapa ordenado campo -> valor JSON.
//!
//! Cada step declara de antemano los campos que produce; los dependientes
//! sólo pueden referenciar esos campos (validado al construir la definición).
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::errors::FlowError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutputs(IndexMap<String, Value>);

impl StepOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Serialize + ?Sized>(&mut self, field: &str, value: &T) -> Result<(), FlowError> {
        let v = serde_json::to_value(value).map_err(|e| FlowError::Internal(format!("serialize output '{field}': {e}")))?;
        self.0.insert(field.to_string(), v);
        Ok(())
    }

    /// Variante encadenable de `insert`.
    pub fn with<T: Serialize + ?Sized>(mut self, field: &str, value: &T) -> Result<Self, FlowError> {
        self.insert(field, value)?;
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<T, FlowError> {
        let v = self.get(field)
                    .ok_or_else(|| FlowError::DependencyContractViolation(format!("missing output field '{field}'")))?;
        serde_json::from_value(v.clone()).map_err(|e| FlowError::DependencyContractViolation(format!("field '{field}': {e}")))
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

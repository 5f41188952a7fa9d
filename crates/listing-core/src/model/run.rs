use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::naming::RunTimestamp;

/// Una ejecución programada. Inmutable; el timestamp lógico se fija al
/// dispararla y se reutiliza en todos los reintentos del run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub logical_ts: RunTimestamp,
}

impl Run {
    pub fn new(logical_ts: RunTimestamp) -> Self {
        Self { id: Uuid::new_v4(),
               logical_ts }
    }
}

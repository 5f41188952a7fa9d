//! Descriptor del artifact producido por un run.
//!
//! El contenido es opaco: el motor sólo conoce la key, el tamaño y un digest
//! calculado por quien lo escribió. El descriptor viaja entre steps como un
//! campo de `StepOutputs`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Nombre final del artifact (`<prefix>_<stamp>.<ext>`).
    pub key: String,
    /// Ubicación actual dentro del store.
    pub location: String,
    pub size_bytes: u64,
    pub content_digest: String,
    pub created_at: DateTime<Utc>,
}

//! Tipos de evento de un run y estructura `RunEvent`.
//!
//! Rol en el flujo:
//! - Cada ejecución del `FlowEngine` emite eventos a un `EventStore`
//!   append-only.
//! - El `FlowRepository` reconstruye el estado del run (replay) a partir de
//!   estos eventos; el `RunReport` que ve el caller sale de ese replay.
//! - `RunEventKind` es el contrato observable del motor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ErrorKind, FlowError};
use crate::model::StepOutputs;
use crate::naming::RunTimestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Algún predecesor (directo o transitivo) falló de forma terminal.
    UpstreamFailed { steps: Vec<String> },
    /// El run fue cancelado antes de empezar el step.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Primer evento de un `run_id`: fija la definición y el timestamp lógico.
    RunInitialized { definition_hash: String, step_count: usize, logical_ts: RunTimestamp },
    /// Comienza un intento de step. No implica éxito.
    StepStarted { step_index: usize, step_id: String, attempt: u32 },
    /// Intento exitoso, con outputs y fingerprint.
    StepFinished {
        step_index: usize,
        step_id: String,
        attempt: u32,
        outputs: StepOutputs,
        fingerprint: String,
    },
    /// Intento fallido. Con `will_retry == false` el fallo es terminal.
    StepFailed {
        step_index: usize,
        step_id: String,
        attempt: u32,
        error: FlowError,
        will_retry: bool,
    },
    /// Reintento agendado tras `delay_ms`.
    RetryScheduled { step_index: usize, step_id: String, next_attempt: u32, delay_ms: u64 },
    /// El step nunca se ejecutará en este run; su estado queda `Pending`.
    StepSkipped { step_index: usize, step_id: String, reason: SkipReason },
    /// Todos los steps terminaron bien.
    RunCompleted { run_fingerprint: String },
    /// Primer step con fallo terminal y su clase de error.
    RunFailed { step_id: String, kind: ErrorKind },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprints)
}

//! Taxonomía de errores del motor.
//!
//! `FlowError` es el único tipo de error que cruza la frontera step -> engine.
//! Los adapters externos tienen sus propios errores (ver `adapter`) y los
//! steps los traducen a una variante de esta taxonomía.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum FlowError {
    #[error("source fetch failed: {0}")] SourceFetchFailed(String),
    #[error("store write failed: {0}")] StoreWriteFailed(String),
    #[error("artifact not visible after {waited_ms}ms ({checks} checks): {key}")]
    ArtifactNotVisible { key: String, waited_ms: u64, checks: u32 },
    #[error("adapter error: {0}")] AdapterError(String),
    #[error("no candidate artifacts under prefix '{0}'")] EmptyCandidateSet(String),
    #[error("dependency contract violation: {0}")] DependencyContractViolation(String),
    #[error("load failed: {0}")] LoadFailed(String),
    #[error("run cancelled")] Cancelled,
    #[error("malformed artifact key: {0}")] MalformedArtifactKey(String),
    #[error("invalid run timestamp: {0}")] InvalidTimestamp(String),
    #[error("internal: {0}")] Internal(String),
}

/// Clase de error, sin payload. Es lo que se reporta junto al step fallido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    SourceFetchFailed,
    StoreWriteFailed,
    ArtifactNotVisible,
    AdapterError,
    EmptyCandidateSet,
    DependencyContractViolation,
    LoadFailed,
    Cancelled,
    MalformedArtifactKey,
    InvalidTimestamp,
    Internal,
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlowError::SourceFetchFailed(_) => ErrorKind::SourceFetchFailed,
            FlowError::StoreWriteFailed(_) => ErrorKind::StoreWriteFailed,
            FlowError::ArtifactNotVisible { .. } => ErrorKind::ArtifactNotVisible,
            FlowError::AdapterError(_) => ErrorKind::AdapterError,
            FlowError::EmptyCandidateSet(_) => ErrorKind::EmptyCandidateSet,
            FlowError::DependencyContractViolation(_) => ErrorKind::DependencyContractViolation,
            FlowError::LoadFailed(_) => ErrorKind::LoadFailed,
            FlowError::Cancelled => ErrorKind::Cancelled,
            FlowError::MalformedArtifactKey(_) => ErrorKind::MalformedArtifactKey,
            FlowError::InvalidTimestamp(_) => ErrorKind::InvalidTimestamp,
            FlowError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Indica si el engine puede reintentar el step que produjo el error.
    ///
    /// Sólo los fallos de infraestructura son reintentables; los errores de
    /// configuración o de datos ausentes no se arreglan repitiendo el step.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self,
                 ErrorKind::SourceFetchFailed
                 | ErrorKind::StoreWriteFailed
                 | ErrorKind::ArtifactNotVisible
                 | ErrorKind::AdapterError
                 | ErrorKind::LoadFailed)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

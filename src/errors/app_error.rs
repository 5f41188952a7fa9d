use listing_core::adapter::{SourceError, StoreError};
use listing_core::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Flow(#[from] FlowError),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io(io) => AppError::Io(io),
            other => AppError::Config(format!("object store: {other}")),
        }
    }
}

impl From<SourceError> for AppError {
    fn from(e: SourceError) -> Self {
        AppError::Config(format!("listings source: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_variant_format() {
        let err = AppError::Config("LISTING_API_HEADERS_FILE not set".into());
        assert_eq!(err.to_string(), "configuration error: LISTING_API_HEADERS_FILE not set");
    }

    #[test]
    fn io_variant_from() {
        let err: AppError = std::io::Error::other("disk full").into();
        assert_eq!(err.to_string(), "io error: disk full");
    }

    #[test]
    fn flow_errors_pass_through() {
        let err: AppError = FlowError::EmptyCandidateSet("response_data".into()).into();
        assert_eq!(err.to_string(), "no candidate artifacts under prefix 'response_data'");
    }

    #[test]
    fn store_io_errors_stay_io() {
        let err: AppError = StoreError::Io(std::io::Error::other("eacces")).into();
        assert!(matches!(err, AppError::Io(_)));
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Origen de listados. Una llamada por run; la respuesta es opaca.
pub trait ListingsSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<u8>, SourceError>;
}

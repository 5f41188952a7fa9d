use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Contrato mínimo de un object store remoto.
///
/// Las keys son strings opacos con `/` como separador lógico. `list` devuelve
/// un conjunto ordenado: el orden es el lexicográfico de las keys.
pub trait ObjectStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Mueve `source` a `dest` (sobrescribe `dest` si existía).
    fn move_object(&self, source: &str, dest: &str) -> Result<(), StoreError>;

    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    fn list(&self, prefix: &str) -> Result<BTreeSet<String>, StoreError>;

    /// Lectura completa. El motor no la usa; existe para loaders locales.
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}

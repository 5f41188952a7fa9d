use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source object unavailable: {0}")]
    SourceUnavailable(String),
    #[error("rejected by warehouse: {0}")]
    Rejected(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    Csv,
}

/// Opciones de formato del COPY (`CSV IGNOREHEADER 1 DELIMITER ','`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOptions {
    pub format: DataFormat,
    pub ignore_header: u32,
    pub delimiter: char,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self { format: DataFormat::Csv,
               ignore_header: 1,
               delimiter: ',' }
    }
}

impl fmt::Display for CopyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            DataFormat::Csv => write!(f, "CSV")?,
        }
        if self.ignore_header > 0 {
            write!(f, " IGNOREHEADER {}", self.ignore_header)?;
        }
        write!(f, " DELIMITER '{}'", self.delimiter)
    }
}

/// Petición de carga: una key del store hacia `schema.table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub schema: String,
    pub table: String,
    pub source_key: String,
    pub options: CopyOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub rows_loaded: u64,
}

/// Carga de warehouse. Se asume atómica por `source_key`: una carga fallida
/// no deja filas parciales atribuibles a esa key.
pub trait WarehouseLoader: Send + Sync {
    fn load(&self, request: &LoadRequest) -> Result<LoadSummary, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_copy_options_render_like_redshift_clause() {
        assert_eq!(CopyOptions::default().to_string(), "CSV IGNOREHEADER 1 DELIMITER ','");
        let tsv = CopyOptions { ignore_header: 0,
                                delimiter: '\t',
                                ..CopyOptions::default() };
        assert_eq!(tsv.to_string(), "CSV DELIMITER '\t'");
    }
}

//! Contratos de los colaboradores externos.
//!
//! El core nunca hace IO de red por sí mismo: sólo orquesta llamadas a estas
//! interfaces. Las implementaciones viven en `listing-adapters`.

mod object_store;
mod source;
mod warehouse;

pub use object_store::{ObjectStore, StoreError};
pub use source::{ListingsSource, SourceError};
pub use warehouse::{CopyOptions, DataFormat, LoadError, LoadRequest, LoadSummary, WarehouseLoader};

//! listing-adapters: implementaciones concretas de los contratos del core y
//! los steps del pipeline de listings.
//!
//! - Object stores: en memoria (`DashMap`) y sobre filesystem.
//! - Orígenes: HTTP (`reqwest` bloqueante) y archivo local.
//! - Warehouse: carga CSV a archivos por tabla.
//! - `listings_flow`: arma la `FlowDefinition` de cinco steps.

pub mod flow;
pub mod source;
pub mod steps;
pub mod store;
pub mod warehouse;

pub use flow::{listings_flow, Adapters, PipelineSettings};
pub use source::{FileListingsSource, HttpListingsSource};
pub use store::{FsObjectStore, InMemoryObjectStore};
pub use warehouse::FsWarehouse;

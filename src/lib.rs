//! listing-flow: aplicación que dispara el pipeline de listings.
//!
//! - `config`: `AppConfig` desde variables `LISTING_*` (y `.env`).
//! - `schedule`: calendario de ticks (`@daily`, `@hourly`, `every <secs>`).
//! - `app`: cableado de adapters y engine; run, backfill y daemon.
//!
//! El binario `listing-flow` expone estos modos por línea de comandos.

pub mod app;
pub mod config;
pub mod errors;
pub mod schedule;

pub use app::{build_adapters, serve, App};
pub use config::{AppConfig, SourceConfig, StorageConfig};
pub use errors::AppError;
pub use schedule::Schedule;

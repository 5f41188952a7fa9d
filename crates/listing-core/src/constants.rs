//! Constantes del motor core.
//!
//! `ENGINE_VERSION` participa en el cálculo de fingerprints de steps y de
//! runs: un cambio de versión invalida los fingerprints aunque la definición
//! y los datos no cambien.

/// Versión lógica del motor.
pub const ENGINE_VERSION: &str = "L1.0";

/// Presupuesto de errores del poller por defecto (errores transitorios
/// tolerados antes de fallar con `AdapterError`).
pub const DEFAULT_POLL_ERROR_BUDGET: u32 = 3;

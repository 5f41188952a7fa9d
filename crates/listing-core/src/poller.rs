//! Existence poller: espera a que una key sea visible en el object store.
//!
//! Política de intervalo fijo (sin backoff exponencial). La última espera se
//! recorta al tiempo restante, de modo que un `NotFound` se devuelve con
//! `waited` en `[timeout, timeout + interval)`. Siempre se hace al menos una
//! consulta, aunque `timeout < interval`.
//!
//! Un error del adapter en una consulta no equivale a "no existe": se
//! reintenta en el siguiente tick. Cuando el total de errores supera
//! `error_budget` la espera falla con `FlowError::AdapterError`.

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::adapter::ObjectStore;
use crate::clock::{CancelToken, Clock, SleepOutcome};
use crate::constants::DEFAULT_POLL_ERROR_BUDGET;
use crate::errors::FlowError;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    pub timeout: Duration,
    pub interval: Duration,
    pub error_budget: u32,
}

impl PollPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout,
               interval,
               error_budget: DEFAULT_POLL_ERROR_BUDGET }
    }

    pub fn with_error_budget(mut self, error_budget: u32) -> Self {
        self.error_budget = error_budget;
        self
    }
}

impl Default for PollPolicy {
    /// 60s de timeout con consultas cada 5s.
    fn default() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(5))
    }
}

/// Resultado de una espera que no falló.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Found { checks: u32, waited: Duration },
    NotFound { checks: u32, waited: Duration },
}

impl Visibility {
    pub fn is_found(&self) -> bool {
        matches!(self, Visibility::Found { .. })
    }

    pub fn checks(&self) -> u32 {
        match self {
            Visibility::Found { checks, .. } | Visibility::NotFound { checks, .. } => *checks,
        }
    }

    pub fn waited(&self) -> Duration {
        match self {
            Visibility::Found { waited, .. } | Visibility::NotFound { waited, .. } => *waited,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistencePoller {
    policy: PollPolicy,
}

impl ExistencePoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Consulta `store.exists(key)` hasta que devuelva `true` o venza el
    /// timeout. Errores: `Cancelled` si el token se activa, `AdapterError` si
    /// se agota el presupuesto de errores.
    pub fn wait_for(&self,
                    store: &dyn ObjectStore,
                    key: &str,
                    clock: &dyn Clock,
                    cancel: &CancelToken)
                    -> Result<Visibility, FlowError> {
        let start = clock.now();
        let interval = self.policy.interval.max(MIN_INTERVAL);
        let mut checks: u32 = 0;
        let mut errors: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(FlowError::Cancelled);
            }
            checks += 1;
            match store.exists(key) {
                Ok(true) => {
                    let waited = clock.now().saturating_duration_since(start);
                    debug!("poll:found key={key} checks={checks} waited_ms={}", waited.as_millis());
                    return Ok(Visibility::Found { checks, waited });
                }
                Ok(false) => debug!("poll:absent key={key} check={checks}"),
                Err(e) => {
                    errors += 1;
                    warn!("poll error on '{key}' ({errors}/{} tolerated): {e}", self.policy.error_budget);
                    if errors > self.policy.error_budget {
                        return Err(FlowError::AdapterError(format!("{errors} errors while polling '{key}', last: {e}")));
                    }
                }
            }

            let waited = clock.now().saturating_duration_since(start);
            if waited >= self.policy.timeout {
                return Ok(Visibility::NotFound { checks, waited });
            }
            let nap = interval.min(self.policy.timeout - waited);
            if clock.sleep(nap, cancel) == SleepOutcome::Cancelled {
                return Err(FlowError::Cancelled);
            }
        }
    }

    /// Como `wait_for`, pero un `NotFound` se convierte en
    /// `FlowError::ArtifactNotVisible`.
    pub fn require_visible(&self,
                           store: &dyn ObjectStore,
                           key: &str,
                           clock: &dyn Clock,
                           cancel: &CancelToken)
                           -> Result<Visibility, FlowError> {
        match self.wait_for(store, key, clock, cancel)? {
            found @ Visibility::Found { .. } => Ok(found),
            Visibility::NotFound { checks, waited } => {
                Err(FlowError::ArtifactNotVisible { key: key.to_string(),
                                                    waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                                                    checks })
            }
        }
    }
}

//! Reintentos por step como máquina de estados pequeña.
//!
//! `RetryState` cuenta intentos y decide, ante cada fallo, si se reintenta
//! tras `delay` o si el step queda en `Failed` terminal. Un presupuesto de N
//! reintentos implica como máximo N+1 intentos. Los errores no reintentables
//! (ver `FlowError::is_retryable`) terminan el step en el primer fallo.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Sin reintentos: un fallo es terminal.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Esperar `after` y volver a ejecutar el step desde cero.
    Retry { after: Duration, next_attempt: u32 },
    /// Fallo terminal.
    GiveUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    policy: RetryPolicy,
    attempts: u32,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempts: 0 }
    }

    /// Registra el comienzo de un intento y devuelve su número (1-based).
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn retries_left(&self) -> u32 {
        self.policy.max_attempts().saturating_sub(self.attempts)
    }

    pub fn on_failure(&self, error: &FlowError) -> RetryDecision {
        if error.is_retryable() && self.retries_left() > 0 {
            RetryDecision::Retry { after: self.policy.delay,
                                   next_attempt: self.attempts + 1 }
        } else {
            RetryDecision::GiveUp
        }
    }
}

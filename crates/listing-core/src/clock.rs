//! Reloj inyectable y token de cancelación.
//!
//! Los únicos puntos de espera del motor (poller y delay entre reintentos)
//! pasan por `Clock::sleep`, que observa un `CancelToken`. En tests se usa
//! `ManualClock`, que avanza el tiempo sin dormir.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Resultado de una espera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    Elapsed,
    Cancelled,
}

/// Fuente de tiempo monotónico + espera cancelable.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Duerme `duration` o hasta que `cancel` se active.
    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> SleepOutcome;
}

/// Token de cancelación de un run. Clonarlo comparte el mismo estado.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *lock(flag) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *lock(&self.inner.0)
    }

    /// Bloquea hasta `timeout` o hasta la cancelación. Devuelve `true` si el
    /// token fue cancelado.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = lock(flag);
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            cancelled = cvar.wait_timeout(cancelled, deadline - now)
                            .map(|(guard, _)| guard)
                            .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
        true
    }
}

// Un bool no puede quedar en estado inconsistente: ignoramos el poisoning.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reloj real.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> SleepOutcome {
        if cancel.wait_timeout(duration) {
            SleepOutcome::Cancelled
        } else {
            SleepOutcome::Elapsed
        }
    }
}

/// Reloj simulado: `sleep` avanza el tiempo de inmediato y registra la
/// duración pedida.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    state: Mutex<ManualState>,
}

#[derive(Debug, Default)]
struct ManualState {
    offset: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { origin: Instant::now(),
               state: Mutex::new(ManualState::default()) }
    }

    /// Avanza el reloj sin registrar una espera.
    pub fn advance(&self, by: Duration) {
        lock(&self.state).offset += by;
    }

    /// Tiempo simulado transcurrido desde la creación.
    pub fn elapsed(&self) -> Duration {
        lock(&self.state).offset
    }

    /// Esperas registradas, en orden.
    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.state).sleeps.clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + lock(&self.state).offset
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> SleepOutcome {
        if cancel.is_cancelled() {
            return SleepOutcome::Cancelled;
        }
        let mut state = lock(&self.state);
        state.offset += duration;
        state.sleeps.push(duration);
        SleepOutcome::Elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn manual_clock_advances_on_sleep() {
        let clock = ManualClock::new();
        let start = clock.now();
        let token = CancelToken::new();
        assert_eq!(clock.sleep(Duration::from_secs(5), &token), SleepOutcome::Elapsed);
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now() - start, Duration::from_secs(6));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
    }

    #[test]
    fn cancelled_token_short_circuits_sleep() {
        let clock = ManualClock::new();
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(clock.sleep(Duration::from_secs(5), &token), SleepOutcome::Cancelled);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn system_sleep_wakes_up_on_cancel() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.cancel();
        });
        let started = Instant::now();
        let outcome = SystemClock.sleep(Duration::from_secs(30), &token);
        handle.join().expect("cancel thread");
        assert_eq!(outcome, SleepOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn system_sleep_elapses_without_cancel() {
        let token = CancelToken::new();
        assert_eq!(SystemClock.sleep(Duration::from_millis(5), &token), SleepOutcome::Elapsed);
    }
}

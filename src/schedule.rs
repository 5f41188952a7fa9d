//! Calendario de disparos.
//!
//! Los ticks están alineados a la época Unix (UTC): `@daily` dispara a
//! medianoche, `@hourly` en punto y `every <secs>` en múltiplos del período.
//! Sin catchup: el daemon sólo ejecuta el próximo tick, los perdidos se
//! recuperan a mano con `backfill`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::DateTime;
use listing_core::{FlowError, RunTimestamp};
use serde::{Serialize, Serializer};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Daily,
    Hourly,
    Every(Duration),
}

impl Schedule {
    pub fn period(&self) -> Duration {
        match self {
            Schedule::Daily => Duration::from_secs(86_400),
            Schedule::Hourly => Duration::from_secs(3_600),
            Schedule::Every(d) => *d,
        }
    }

    fn period_secs(&self) -> i64 {
        i64::try_from(self.period().as_secs()).unwrap_or(i64::MAX).max(1)
    }

    /// Último tick `<= t`.
    pub fn tick_at_or_before(&self, t: RunTimestamp) -> Result<RunTimestamp, FlowError> {
        let p = self.period_secs();
        let secs = t.as_utc().timestamp();
        from_secs(secs - secs.rem_euclid(p))
    }

    /// Primer tick estrictamente posterior a `t`.
    pub fn next_after(&self, t: RunTimestamp) -> Result<RunTimestamp, FlowError> {
        let p = self.period_secs();
        let secs = t.as_utc().timestamp();
        from_secs(secs - secs.rem_euclid(p) + p)
    }

    /// Ticks en `[from, to]`, en orden.
    pub fn ticks_between(&self, from: RunTimestamp, to: RunTimestamp) -> Result<Vec<RunTimestamp>, FlowError> {
        let mut ticks = Vec::new();
        if from > to {
            return Ok(ticks);
        }
        let first = self.tick_at_or_before(from)?;
        let mut current = if first < from { self.next_after(first)? } else { first };
        while current <= to {
            ticks.push(current);
            current = self.next_after(current)?;
        }
        Ok(ticks)
    }
}

fn from_secs(secs: i64) -> Result<RunTimestamp, FlowError> {
    let dt = DateTime::from_timestamp(secs, 0).ok_or_else(|| FlowError::InvalidTimestamp(format!("{secs}s since epoch")))?;
    RunTimestamp::from_utc(dt)
}

impl FromStr for Schedule {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "@daily" => Ok(Schedule::Daily),
            "@hourly" => Ok(Schedule::Hourly),
            other => {
                let secs = other.strip_prefix("every ")
                                .and_then(|n| n.trim().trim_end_matches('s').parse::<u64>().ok())
                                .filter(|n| *n > 0)
                                .ok_or_else(|| AppError::Config(format!("unsupported schedule '{other}'")))?;
                Ok(Schedule::Every(Duration::from_secs(secs)))
            }
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Daily => write!(f, "@daily"),
            Schedule::Hourly => write!(f, "@hourly"),
            Schedule::Every(d) => write!(f, "every {}s", d.as_secs()),
        }
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

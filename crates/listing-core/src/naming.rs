//! Nombres deterministas de artifacts a partir del timestamp lógico del run.
//!
//! Invariante central: para un mismo prefijo, el orden lexicográfico de las
//! keys coincide con el orden cronológico de los runs. Se garantiza usando un
//! sello de tiempo de ancho fijo, con ceros a la izquierda y de mayor a menor
//! unidad (`YYYY-MM-DD-HH-MM-SS`). `RunTimestamp` rechaza años fuera de
//! `0000..=9999` para que `%Y` nunca produzca un ancho distinto de 4.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::FlowError;

/// Formato del sello dentro de las keys (sin `:` para ser seguro en paths).
pub const KEY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
/// Formato con el que se dispara un run (`2025-03-01-00:00:00`).
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

const STAMP_LEN: usize = 19;
const ACCEPTED_INPUT_FORMATS: [&str; 4] = [RUN_TIMESTAMP_FORMAT, KEY_TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Timestamp lógico de un run (UTC, granularidad de segundos).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunTimestamp(NaiveDateTime);

impl RunTimestamp {
    /// Valida el rango de año y trunca a segundos.
    pub fn new(dt: NaiveDateTime) -> Result<Self, FlowError> {
        if !(0..=9999).contains(&dt.year()) {
            return Err(FlowError::InvalidTimestamp(format!("year {} outside 0000..=9999", dt.year())));
        }
        let truncated = dt.with_nanosecond(0)
                          .ok_or_else(|| FlowError::InvalidTimestamp(dt.to_string()))?;
        Ok(Self(truncated))
    }

    pub fn from_utc(dt: DateTime<Utc>) -> Result<Self, FlowError> {
        Self::new(dt.naive_utc())
    }

    /// Acepta el formato de disparo, el de las keys y variantes ISO simples.
    pub fn parse(input: &str) -> Result<Self, FlowError> {
        let trimmed = input.trim();
        ACCEPTED_INPUT_FORMATS.iter()
                              .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
                              .ok_or_else(|| FlowError::InvalidTimestamp(input.to_string()))
                              .and_then(Self::new)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn as_utc(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }

    /// Sello de ancho fijo usado dentro de las keys.
    pub fn key_stamp(&self) -> String {
        self.0.format(KEY_TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for RunTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(RUN_TIMESTAMP_FORMAT))
    }
}

/// `make_key(prefix, timestamp)`: función pura; misma entrada, misma key.
pub fn make_key(prefix: &str, ts: &RunTimestamp) -> String {
    format!("{prefix}_{}", ts.key_stamp())
}

/// Esquema de nombres de una familia de artifacts (`<prefix>_<stamp>.<ext>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactNaming {
    prefix: String,
    extension: String,
}

impl ArtifactNaming {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self { prefix: prefix.into(),
               extension: extension.into().trim_start_matches('.').to_string() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Key completa del artifact de un run. Reintentos del mismo run producen
    /// exactamente la misma key.
    pub fn key_for(&self, ts: &RunTimestamp) -> String {
        let stem = make_key(&self.prefix, ts);
        if self.extension.is_empty() {
            stem
        } else {
            format!("{stem}.{}", self.extension)
        }
    }

    /// Inversa de `key_for`. Ignora un eventual directorio delante del nombre.
    /// Devuelve `None` si la key no respeta el formato exacto (incluido el
    /// relleno con ceros), que es lo que hace segura la selección por orden
    /// lexicográfico.
    pub fn parse_key(&self, key: &str) -> Option<RunTimestamp> {
        let name = key.rsplit('/').next().unwrap_or(key);
        let rest = name.strip_prefix(self.prefix.as_str())?.strip_prefix('_')?;
        let stamp = if self.extension.is_empty() {
            rest
        } else {
            rest.strip_suffix(self.extension.as_str())?.strip_suffix('.')?
        };
        if stamp.len() != STAMP_LEN {
            return None;
        }
        let dt = NaiveDateTime::parse_from_str(stamp, KEY_TIMESTAMP_FORMAT).ok()?;
        let ts = RunTimestamp::new(dt).ok()?;
        // chrono acepta campos sin relleno; exigimos la forma canónica.
        (ts.key_stamp() == stamp).then_some(ts)
    }

    pub fn conforms(&self, key: &str) -> bool {
        self.parse_key(key).is_some()
    }
}

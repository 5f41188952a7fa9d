//! Configuración central de la aplicación.
//!
//! Carga `.env` una sola vez (`DOTENV`) y arma un `AppConfig` inmutable a
//! partir de variables `LISTING_*`. Los valores por defecto reproducen el
//! despliegue original: 2 reintentos cada 15s, espera de 60s consultando
//! cada 5s y carga en `PUBLIC.zillowdata`.
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use listing_adapters::PipelineSettings;
use listing_core::adapter::CopyOptions;
use listing_core::{ArtifactNaming, MalformedKeyPolicy, PollPolicy, RetryPolicy};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::errors::AppError;
use crate::schedule::Schedule;

/// Carga perezosa del archivo `.env`; no es error que no exista.
static DOTENV: Lazy<Option<PathBuf>> = Lazy::new(|| dotenvy::dotenv().ok());

pub const DEFAULT_API_URL: &str = "https://zillow56.p.rapidapi.com/search";

/// Configuración global de la aplicación.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub pipeline: PipelineSettings,
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub schedule: Schedule,
}

/// De dónde salen los listados.
#[derive(Debug, Clone, Serialize)]
pub enum SourceConfig {
    Http {
        url: String,
        location: String,
        timeout: Duration,
        /// Headers de autenticación de la API; nunca se muestran.
        #[serde(skip)]
        headers: BTreeMap<String, String>,
    },
    File { path: PathBuf },
}

/// Directorios de los adapters locales.
#[derive(Debug, Clone, Serialize)]
pub struct StorageConfig {
    pub store_root: PathBuf,
    pub warehouse_root: PathBuf,
}

impl AppConfig {
    /// Lee el entorno del proceso (previa carga de `.env`).
    pub fn from_env() -> Result<Self, AppError> {
        Lazy::force(&DOTENV);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let pipeline = PipelineSettings { naming: ArtifactNaming::new(artifact_prefix(var("LISTING_PREFIX", "response_data"))?,
                                                                      var("LISTING_EXTENSION", "csv")),
                                          staging_prefix: directory_prefix("LISTING_STAGING_PREFIX",
                                                                           var("LISTING_STAGING_PREFIX", "staging/"))?,
                                          landing_prefix: directory_prefix("LISTING_LANDING_PREFIX",
                                                                           var("LISTING_LANDING_PREFIX", ""))?,
                                          poll: PollPolicy::new(secs(&lookup, "LISTING_POLL_TIMEOUT_SECS", 60)?,
                                                                secs(&lookup, "LISTING_POLL_INTERVAL_SECS", 5)?)
                                              .with_error_budget(parse(&lookup, "LISTING_POLL_ERROR_BUDGET", 3)?),
                                          retry: RetryPolicy::new(parse(&lookup, "LISTING_RETRIES", 2)?,
                                                                  secs(&lookup, "LISTING_RETRY_DELAY_SECS", 15)?),
                                          malformed_keys: malformed_policy(&var("LISTING_MALFORMED_KEYS", "skip"))?,
                                          schema: var("LISTING_SCHEMA", "PUBLIC"),
                                          table: var("LISTING_TABLE", "zillowdata"),
                                          copy_options: CopyOptions { ignore_header: parse(&lookup, "LISTING_IGNORE_HEADER", 1)?,
                                                                      delimiter: parse(&lookup, "LISTING_DELIMITER", ',')?,
                                                                      ..CopyOptions::default() } };

        let source = match lookup("LISTING_SOURCE_FILE") {
            Some(path) => SourceConfig::File { path: path.into() },
            None => {
                let headers_file = lookup("LISTING_API_HEADERS_FILE").ok_or_else(|| {
                                                                          AppError::Config("LISTING_API_HEADERS_FILE not set (or set LISTING_SOURCE_FILE)".into())
                                                                      })?;
                SourceConfig::Http { url: var("LISTING_API_URL", DEFAULT_API_URL),
                                     location: var("LISTING_API_LOCATION", "columbus, ch"),
                                     timeout: secs(&lookup, "LISTING_API_TIMEOUT_SECS", 30)?,
                                     headers: load_headers(&headers_file)? }
            }
        };

        let storage = StorageConfig { store_root: var("LISTING_STORE_ROOT", "data/bucket").into(),
                                      warehouse_root: var("LISTING_WAREHOUSE_ROOT", "data/warehouse").into() };

        Ok(Self { pipeline,
                  source,
                  storage,
                  schedule: var("LISTING_SCHEDULE", "@daily").parse()? })
    }
}

/// Headers de la API: objeto JSON plano `{ "X-RapidAPI-Key": "...", ... }`.
pub fn load_headers(path: &str) -> Result<BTreeMap<String, String>, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
    where F: Fn(&str) -> Option<String>,
          T: FromStr
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim()
                        .parse()
                        .map_err(|_| AppError::Config(format!("{key}: cannot parse '{raw}'"))),
    }
}

fn secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, AppError>
    where F: Fn(&str) -> Option<String>
{
    parse(lookup, key, default).map(Duration::from_secs)
}

/// Nombre base de los artifacts: sin `/`, que lo dejaría fuera del formato
/// que reconoce la selección.
fn artifact_prefix(raw: String) -> Result<String, AppError> {
    if raw.is_empty() || raw.contains('/') {
        return Err(AppError::Config(format!("LISTING_PREFIX: expected a plain name without '/', got '{raw}'")));
    }
    Ok(raw)
}

/// Prefijo de directorio: vacío o terminado en `/`, porque se concatena tal
/// cual delante de la key.
fn directory_prefix(key: &str, raw: String) -> Result<String, AppError> {
    if raw.is_empty() || (raw.ends_with('/') && !raw.starts_with('/')) {
        return Ok(raw);
    }
    Err(AppError::Config(format!("{key}: expected '' or a relative prefix ending in '/', got '{raw}'")))
}

fn malformed_policy(raw: &str) -> Result<MalformedKeyPolicy, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "skip" => Ok(MalformedKeyPolicy::SkipMalformed),
        "strict" => Ok(MalformedKeyPolicy::Strict),
        other => Err(AppError::Config(format!("LISTING_MALFORMED_KEYS: expected 'skip' or 'strict', got '{other}'"))),
    }
}

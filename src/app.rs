//! Cableado de la aplicación: adapters concretos, engine y modos de disparo
//! (run único, backfill concurrente y daemon).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use listing_adapters::{listings_flow, Adapters, FileListingsSource, FsObjectStore, FsWarehouse, HttpListingsSource};
use listing_core::adapter::{ListingsSource, ObjectStore};
use listing_core::{CancelToken, Clock, FlowEngine, FlowError, InMemoryEventStore, InMemoryFlowRepository, Run,
                   RunReport, RunTimestamp, SystemClock};
use log::{info, warn};
use rayon::prelude::*;

use crate::config::{AppConfig, SourceConfig};
use crate::errors::AppError;

pub type Engine = FlowEngine<InMemoryEventStore, InMemoryFlowRepository>;

pub struct App {
    config: AppConfig,
    engine: Engine,
}

/// Adapters locales según la configuración: store y warehouse sobre disco,
/// origen HTTP o archivo.
///
/// El pipeline no transforma el payload. Con el origen HTTP el warehouse
/// recibe la respuesta tal cual: si la API devuelve JSON, `load` falla con
/// `LoadFailed` hasta que algo externo lo convierta a texto delimitado.
pub fn build_adapters(config: &AppConfig) -> Result<Adapters, AppError> {
    let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::open(&config.storage.store_root)?);
    let source: Arc<dyn ListingsSource> = match &config.source {
        SourceConfig::Http { url,
                             location,
                             timeout,
                             headers, } => {
            warn!("listings from {url} are loaded untransformed as {}; JSON responses will be rejected at load",
                  config.pipeline.copy_options);
            Arc::new(HttpListingsSource::new(url.clone(), *timeout)?.with_query("location", location.clone())
                                                                    .with_headers(headers.clone()))
        }
        SourceConfig::File { path } => Arc::new(FileListingsSource::new(path.clone())),
    };
    let warehouse = Arc::new(FsWarehouse::new(config.storage.warehouse_root.clone(), store.clone()));
    Ok(Adapters { source,
                  store,
                  warehouse })
}

impl App {
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let adapters = build_adapters(&config)?;
        Self::with_adapters(config, adapters, Arc::new(SystemClock))
    }

    pub fn with_adapters(config: AppConfig, adapters: Adapters, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let definition = listings_flow(&config.pipeline, &adapters)?;
        info!("flow definition {} ({} steps)", definition.definition_hash(), definition.len());
        let engine = FlowEngine::builder(InMemoryEventStore::new(), InMemoryFlowRepository::new()).clock(clock)
                                                                                                  .build(definition);
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Un run con el timestamp lógico dado.
    pub fn trigger(&self, at: RunTimestamp, cancel: &CancelToken) -> RunReport {
        let run = Run::new(at);
        let report = self.engine.execute(&run, cancel);
        if report.is_success() {
            info!("{}", report.summary());
        } else {
            warn!("{}", report.summary());
        }
        report
    }

    /// Tick más reciente del calendario (lo que ejecuta `run` sin `--at`).
    pub fn latest_tick(&self) -> Result<RunTimestamp, AppError> {
        let now = RunTimestamp::from_utc(Utc::now())?;
        Ok(self.config.schedule.tick_at_or_before(now)?)
    }

    /// Un run por tick en `[from, to]`, ejecutados en paralelo. Los reportes
    /// vuelven en orden de tick.
    pub fn backfill(&self, from: RunTimestamp, to: RunTimestamp) -> Result<Vec<RunReport>, AppError> {
        let ticks = self.config.schedule.ticks_between(from, to)?;
        info!("backfill of {} runs between {from} and {to}", ticks.len());
        Ok(ticks.par_iter().map(|ts| self.trigger(*ts, &CancelToken::new())).collect())
    }
}

/// Daemon: duerme hasta el próximo tick y lo ejecuta en un hilo bloqueante.
/// Ctrl-C cancela el run en curso y termina.
pub async fn serve(app: Arc<App>) -> Result<(), AppError> {
    let schedule = app.config.schedule;
    info!("serving schedule {schedule}");
    loop {
        let next = schedule.next_after(RunTimestamp::from_utc(Utc::now())?)?;
        let wait = (next.as_utc() - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        info!("next run at {next} (in {}s)", wait.as_secs());
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                return Ok(());
            }
        }

        let cancel = CancelToken::new();
        let mut worker = {
            let app = app.clone();
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || app.trigger(next, &cancel))
        };
        let finished = tokio::select! {
            res = &mut worker => Some(res),
            _ = tokio::signal::ctrl_c() => None,
        };
        let (joined, stopping) = match finished {
            Some(res) => (res, false),
            None => {
                warn!("cancelling run at {next}");
                cancel.cancel();
                (worker.await, true)
            }
        };
        joined.map_err(|e| FlowError::Internal(format!("run worker: {e}")))?;
        if stopping {
            return Ok(());
        }
    }
}

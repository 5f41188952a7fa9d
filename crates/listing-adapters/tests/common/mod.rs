#![allow(dead_code)]
//! Dobles de prueba para los adapters: fallos inyectados y registro de
//! cargas.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use listing_adapters::InMemoryObjectStore;
use listing_core::adapter::{ListingsSource, LoadError, LoadRequest, LoadSummary, ObjectStore, SourceError, StoreError,
                            WarehouseLoader};

pub const LISTINGS_CSV: &[u8] = b"zpid,city,price\n1,Columbus,250000\n2,Columbus,310000\n3,Dublin,420000\n";

/// Origen que siempre devuelve los mismos bytes.
pub struct StaticSource(pub &'static [u8]);

impl ListingsSource for StaticSource {
    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        Ok(self.0.to_vec())
    }
}

/// Envuelve un `InMemoryObjectStore` e inyecta fallos.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryObjectStore,
    /// Cantidad de `move_object` que fallan antes de delegar (`u32::MAX` = siempre).
    pub failing_moves: AtomicU32,
    /// Cantidad de `exists` que responden `false` antes de delegar.
    pub invisible_checks: AtomicU32,
    /// Cantidad de `move_object` que mueven el objeto pero reportan error.
    pub lossy_moves: AtomicU32,
    pub move_calls: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_moves(self, n: u32) -> Self {
        self.failing_moves.store(n, Ordering::SeqCst);
        self
    }

    pub fn invisible_for(self, checks: u32) -> Self {
        self.invisible_checks.store(checks, Ordering::SeqCst);
        self
    }

    pub fn lossy_moves(self, n: u32) -> Self {
        self.lossy_moves.store(n, Ordering::SeqCst);
        self
    }

    fn take(counter: &AtomicU32) -> bool {
        counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                   0 => None,
                   u32::MAX => Some(u32::MAX),
                   n => Some(n - 1),
               })
               .is_ok()
    }
}

impl ObjectStore for FlakyStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.inner.put(key, bytes)
    }

    fn move_object(&self, source: &str, dest: &str) -> Result<(), StoreError> {
        self.move_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take(&self.failing_moves) {
            return Err(StoreError::Unavailable("injected move failure".into()));
        }
        self.inner.move_object(source, dest)?;
        if Self::take(&self.lossy_moves) {
            return Err(StoreError::Unavailable("connection dropped after move".into()));
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        if Self::take(&self.invisible_checks) {
            return Ok(false);
        }
        self.inner.exists(key)
    }

    fn list(&self, prefix: &str) -> Result<BTreeSet<String>, StoreError> {
        self.inner.list(prefix)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.get(key)
    }
}

/// Warehouse que sólo registra las peticiones.
#[derive(Default)]
pub struct RecordingWarehouse {
    pub requests: Mutex<Vec<LoadRequest>>,
}

impl RecordingWarehouse {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn loaded_keys(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .map(|r| r.source_key.clone())
            .collect()
    }
}

impl WarehouseLoader for RecordingWarehouse {
    fn load(&self, request: &LoadRequest) -> Result<LoadSummary, LoadError> {
        self.requests.lock().expect("requests lock").push(request.clone());
        Ok(LoadSummary { rows_loaded: 0 })
    }
}

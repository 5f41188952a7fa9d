use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};

/// Almacenamiento de eventos append-only.
///
/// Toma `&self` para que un mismo engine atienda runs concurrentes; cada run
/// escribe sólo bajo su propio `run_id`.
pub trait EventStore: Send + Sync {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&self, run_id: Uuid, kind: RunEventKind) -> RunEvent;
    /// Lista eventos de un run (orden ascendente por seq).
    fn list(&self, run_id: Uuid) -> Vec<RunEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: DashMap<Uuid, Vec<RunEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        let mut events = self.inner.entry(run_id).or_default();
        let ev = RunEvent { seq: events.len() as u64,
                            run_id,
                            kind,
                            ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.inner.get(&run_id).map(|e| e.value().clone()).unwrap_or_default()
    }
}

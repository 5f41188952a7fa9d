//! Builder para `FlowEngine`.
//!
//! La definición llega ya validada (`FlowDefinition::builder().build()`);
//! el builder sólo junta stores y reloj. Sin reloj explícito se usa
//! `SystemClock`.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::engine::FlowEngine;
use crate::event::EventStore;
use crate::repo::{FlowDefinition, FlowRepository};

pub struct EngineBuilder<E: EventStore, R: FlowRepository> {
    /// Store de eventos que usará el engine.
    pub event_store: E,
    /// Repositorio que reconstruye el estado de cada run.
    pub repository: R,
    clock: Option<Arc<dyn Clock>>,
}

impl<E: EventStore, R: FlowRepository> EngineBuilder<E, R> {
    pub fn new(event_store: E, repository: R) -> Self {
        Self { event_store,
               repository,
               clock: None }
    }

    /// Reloj usado para los delays de reintento y disponible para los steps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self, definition: FlowDefinition) -> FlowEngine<E, R> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        FlowEngine::from_parts(definition, self.event_store, self.repository, clock)
    }
}

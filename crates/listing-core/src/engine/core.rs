//! Core FlowEngine implementation

use std::sync::Arc;

use log::{info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::clock::{CancelToken, Clock, SleepOutcome};
use crate::engine::EngineBuilder;
use crate::errors::{ErrorKind, FlowError};
use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind, SkipReason};
use crate::hashing::hash_value;
use crate::model::{ExecutionContext, ResolvedInputs, Run, StepOutputs};
use crate::repo::{FlowDefinition, FlowRepository, InMemoryFlowRepository, RunReport, StepNode};
use crate::step::{RetryDecision, RetryState, StepDefinition, StepRunResult};

/// Motor de ejecución de runs.
///
/// Recorre los steps en orden topológico, resuelve los inputs de cada uno a
/// partir de los outputs de sus predecesores y aplica la política de
/// reintentos del step. Todo lo que pasa queda en el `EventStore`; el
/// `RunReport` devuelto es el replay de esos eventos.
///
/// `execute` toma `&self`: un mismo engine (por ejemplo detrás de un `Arc`)
/// puede atender varios runs a la vez, cada uno bajo su propio `run_id`.
pub struct FlowEngine<E, R>
    where E: EventStore,
          R: FlowRepository
{
    definition: FlowDefinition,
    event_store: E,
    repository: R,
    clock: Arc<dyn Clock>,
}

/// Estado de un step dentro de un run en curso.
#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Done(StepOutputs),
    Failed,
    Skipped,
}

impl Slot {
    fn blocks_dependents(&self) -> bool {
        matches!(self, Slot::Failed | Slot::Skipped)
    }
}

impl<E, R> FlowEngine<E, R>
    where E: EventStore,
          R: FlowRepository
{
    #[inline]
    pub fn builder(event_store: E, repository: R) -> EngineBuilder<E, R> {
        EngineBuilder::new(event_store, repository)
    }

    pub(crate) fn from_parts(definition: FlowDefinition, event_store: E, repository: R, clock: Arc<dyn Clock>) -> Self {
        Self { definition,
               event_store,
               repository,
               clock }
    }

    pub fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Eventos registrados para un run.
    pub fn events(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.event_store.list(run_id)
    }

    /// Reconstruye el reporte de un run ya ejecutado (o en curso).
    pub fn report(&self, run_id: Uuid) -> RunReport {
        let events = self.event_store.list(run_id);
        self.repository.load(run_id, &events, &self.definition)
    }

    /// Ejecuta un run completo.
    ///
    /// Un fallo terminal no detiene el run: los steps que dependen (directa o
    /// transitivamente) del step fallido se saltan y el resto se ejecuta.
    /// Con el token cancelado, los steps que aún no empezaron se saltan.
    pub fn execute(&self, run: &Run, cancel: &CancelToken) -> RunReport {
        let def = &self.definition;
        self.event_store
            .append_kind(run.id,
                         RunEventKind::RunInitialized { definition_hash: def.definition_hash().to_string(),
                                                        step_count: def.len(),
                                                        logical_ts: run.logical_ts });
        info!("run {} @ {}: starting ({} steps)", run.id, run.logical_ts, def.len());

        let mut slots: Vec<Slot> = vec![Slot::Pending; def.len()];
        let mut first_failure: Option<(String, ErrorKind)> = None;
        let mut step_fps: Vec<String> = Vec::with_capacity(def.len());

        for &index in def.execution_order() {
            let Some(node) = def.node(index) else {
                continue;
            };
            let step_id = node.step.id().to_string();

            let reason = if cancel.is_cancelled() {
                Some(SkipReason::Cancelled)
            } else {
                let blocked: Vec<String> = node.depends_on
                                               .iter()
                                               .filter(|d| slots[**d].blocks_dependents())
                                               .filter_map(|d| def.node(*d).map(|n| n.step.id().to_string()))
                                               .collect();
                (!blocked.is_empty()).then_some(SkipReason::UpstreamFailed { steps: blocked })
            };
            if let Some(reason) = reason {
                warn!("run {}: skipping step '{step_id}' ({reason:?})", run.id);
                if reason == SkipReason::Cancelled && first_failure.is_none() {
                    first_failure = Some((step_id.clone(), ErrorKind::Cancelled));
                }
                self.event_store.append_kind(run.id,
                                             RunEventKind::StepSkipped { step_index: index,
                                                                         step_id,
                                                                         reason });
                slots[index] = Slot::Skipped;
                continue;
            }

            match self.run_step(run, index, node, &slots, cancel) {
                Ok((outputs, fp)) => {
                    step_fps.push(fp);
                    slots[index] = Slot::Done(outputs);
                }
                Err(error) => {
                    first_failure.get_or_insert((step_id, error.kind()));
                    slots[index] = Slot::Failed;
                }
            }
        }

        match first_failure {
            Some((step_id, kind)) => {
                warn!("run {} @ {}: failed at step '{step_id}' with {kind}", run.id, run.logical_ts);
                self.event_store.append_kind(run.id, RunEventKind::RunFailed { step_id, kind });
            }
            None => {
                let run_fingerprint = hash_value(&json!({
                    "engine_version": crate::constants::ENGINE_VERSION,
                    "definition_hash": def.definition_hash(),
                    "logical_ts": run.logical_ts,
                    "step_fingerprints": step_fps
                }));
                info!("run {} @ {}: completed", run.id, run.logical_ts);
                self.event_store.append_kind(run.id, RunEventKind::RunCompleted { run_fingerprint });
            }
        }

        self.report(run.id)
    }

    /// Ejecuta un step con su política de reintentos. Devuelve los outputs y
    /// el fingerprint del intento exitoso, o el último error.
    fn run_step(&self,
                run: &Run,
                index: usize,
                node: &StepNode,
                slots: &[Slot],
                cancel: &CancelToken)
                -> Result<(StepOutputs, String), FlowError> {
        let step = node.step.as_ref();
        let step_id = step.id().to_string();
        let mut retry = RetryState::new(node.retry);

        loop {
            let attempt = retry.begin_attempt();
            self.event_store.append_kind(run.id,
                                         RunEventKind::StepStarted { step_index: index,
                                                                     step_id: step_id.clone(),
                                                                     attempt });

            let error = match self.attempt(run, attempt, step, slots, cancel) {
                Ok(outputs) => {
                    let fingerprint = self.step_fingerprint(index, step, &outputs);
                    info!("run {}: step '{step_id}' succeeded on attempt {attempt}", run.id);
                    self.event_store.append_kind(run.id,
                                                 RunEventKind::StepFinished { step_index: index,
                                                                              step_id: step_id.clone(),
                                                                              attempt,
                                                                              outputs: outputs.clone(),
                                                                              fingerprint: fingerprint.clone() });
                    return Ok((outputs, fingerprint));
                }
                Err(error) => error,
            };

            let decision = if cancel.is_cancelled() {
                RetryDecision::GiveUp
            } else {
                retry.on_failure(&error)
            };
            let will_retry = matches!(decision, RetryDecision::Retry { .. });
            self.event_store.append_kind(run.id,
                                         RunEventKind::StepFailed { step_index: index,
                                                                    step_id: step_id.clone(),
                                                                    attempt,
                                                                    error: error.clone(),
                                                                    will_retry });

            match decision {
                RetryDecision::GiveUp => {
                    warn!("run {}: step '{step_id}' failed after {attempt} attempt(s): {error}", run.id);
                    return Err(error);
                }
                RetryDecision::Retry { after, next_attempt } => {
                    warn!("run {}: step '{step_id}' attempt {attempt} failed: {error}; retrying in {}ms ({} left)",
                          run.id,
                          after.as_millis(),
                          retry.retries_left());
                    self.event_store.append_kind(run.id,
                                                 RunEventKind::RetryScheduled { step_index: index,
                                                                                step_id: step_id.clone(),
                                                                                next_attempt,
                                                                                delay_ms: u64::try_from(after.as_millis())
                                                                                    .unwrap_or(u64::MAX) });
                    if self.clock.sleep(after, cancel) == SleepOutcome::Cancelled {
                        // el intento anterior quedó marcado con will_retry; se
                        // cierra el step con un fallo terminal explícito
                        self.event_store.append_kind(run.id,
                                                     RunEventKind::StepFailed { step_index: index,
                                                                                step_id: step_id.clone(),
                                                                                attempt,
                                                                                error: FlowError::Cancelled,
                                                                                will_retry: false });
                        return Err(FlowError::Cancelled);
                    }
                }
            }
        }
    }

    fn attempt(&self,
               run: &Run,
               attempt: u32,
               step: &dyn StepDefinition,
               slots: &[Slot],
               cancel: &CancelToken)
               -> Result<StepOutputs, FlowError> {
        let inputs = self.resolve_inputs(step, slots)?;
        let ctx = ExecutionContext { run,
                                     attempt,
                                     inputs,
                                     clock: self.clock.as_ref(),
                                     cancel };
        match step.run(&ctx) {
            StepRunResult::Success { outputs } => {
                if let Some(missing) = step.outputs().iter().find(|f| !outputs.contains(f)) {
                    return Err(FlowError::DependencyContractViolation(format!("step '{}' did not produce declared output '{missing}'",
                                                                              step.id())));
                }
                Ok(outputs)
            }
            StepRunResult::Failure { error } => Err(error),
        }
    }

    /// Sólo los slots declarados por el step llegan al contexto.
    fn resolve_inputs(&self, step: &dyn StepDefinition, slots: &[Slot]) -> Result<ResolvedInputs, FlowError> {
        let mut resolved = ResolvedInputs::new();
        for slot in step.inputs() {
            let upstream = self.definition
                               .position(&slot.step)
                               .and_then(|i| match &slots[i] {
                                   Slot::Done(outputs) => Some(outputs),
                                   _ => None,
                               })
                               .ok_or_else(|| {
                                   FlowError::DependencyContractViolation(format!("step '{}' needs {slot} but '{}' has no outputs",
                                                                                  step.id(),
                                                                                  slot.step))
                               })?;
            let value = upstream.get(&slot.field).cloned().ok_or_else(|| {
                                                              FlowError::DependencyContractViolation(format!("step '{}' needs {slot} which was not produced",
                                                                                                             step.id()))
                                                          })?;
            resolved.insert(slot, value);
        }
        Ok(resolved)
    }

    fn step_fingerprint(&self, index: usize, step: &dyn StepDefinition, outputs: &StepOutputs) -> String {
        hash_value(&json!({
            "engine_version": crate::constants::ENGINE_VERSION,
            "definition_hash": self.definition.definition_hash(),
            "step_index": index,
            "step_id": step.id(),
            "outputs": outputs.as_value()
        }))
    }
}

impl FlowEngine<InMemoryEventStore, InMemoryFlowRepository> {
    /// Engine con stores en memoria y reloj de sistema.
    pub fn in_memory(definition: FlowDefinition) -> Self {
        Self::builder(InMemoryEventStore::new(), InMemoryFlowRepository::new()).build(definition)
    }
}

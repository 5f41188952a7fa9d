//! Tipos de repositorio: definición inmutable (`FlowDefinition`) y estado
//! reconstruido de un run (`RunReport`).
//!
//! La definición se valida entera al construirse: ids duplicados,
//! dependencias desconocidas, ciclos y slots que apuntan a campos no
//! declarados por el predecesor son `DependencyContractViolation` antes de
//! que exista ningún run.
//!
//! El repositorio aplica un replay lineal de eventos sobre la definición.
use chrono::{DateTime, Utc};
use log::warn;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::{ErrorKind, FlowError};
use crate::event::{RunEvent, RunEventKind, SkipReason};
use crate::graph::StepGraph;
use crate::hashing::hash_value;
use crate::model::{InputSlot, StepOutputs};
use crate::naming::RunTimestamp;
use crate::step::{RetryPolicy, StepDefinition, StepStatus};

/// Un step dentro de la definición, con su política y dependencias ya
/// resueltas a posiciones.
pub struct StepNode {
    pub step: Box<dyn StepDefinition>,
    pub retry: RetryPolicy,
    pub depends_on: Vec<usize>,
}

/// Definición inmutable del Flow.
pub struct FlowDefinition {
    nodes: Vec<StepNode>,
    graph: StepGraph,
    order: Vec<usize>,
    definition_hash: String,
}

impl FlowDefinition {
    pub fn builder() -> FlowDefinitionBuilder {
        FlowDefinitionBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    /// Posiciones de los steps en orden de ejecución.
    pub fn execution_order(&self) -> &[usize] {
        &self.order
    }

    pub fn node(&self, index: usize) -> Option<&StepNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StepNode> {
        self.nodes.iter()
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.step.id() == step_id)
    }

    /// Predecesores transitivos de un step.
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        self.graph.ancestors(index).into_iter().collect()
    }
}

struct PendingNode {
    step: Box<dyn StepDefinition>,
    retry: RetryPolicy,
    extra_after: Vec<String>,
}

/// Builder de `FlowDefinition`.
///
/// `add_step` sólo agrega las dependencias que el step declara (inputs +
/// `after`). `then` además lo encadena detrás del último step agregado, que
/// es la forma habitual de armar un pipeline lineal.
#[derive(Default)]
pub struct FlowDefinitionBuilder {
    pending: Vec<PendingNode>,
}

impl FlowDefinitionBuilder {
    pub fn add_step<S: StepDefinition + 'static>(mut self, step: S, retry: RetryPolicy) -> Self {
        self.pending.push(PendingNode { step: Box::new(step),
                                        retry,
                                        extra_after: Vec::new() });
        self
    }

    pub fn then<S: StepDefinition + 'static>(mut self, step: S, retry: RetryPolicy) -> Self {
        let extra_after = self.pending.last().map(|p| vec![p.step.id().to_string()]).unwrap_or_default();
        self.pending.push(PendingNode { step: Box::new(step),
                                        retry,
                                        extra_after });
        self
    }

    pub fn build(self) -> Result<FlowDefinition, FlowError> {
        if self.pending.is_empty() {
            return Err(violation("flow definition has no steps".into()));
        }

        let ids: Vec<String> = self.pending.iter().map(|p| p.step.id().to_string()).collect();
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) {
                return Err(violation(format!("duplicate step id '{id}'")));
            }
        }
        let position = |id: &str| ids.iter().position(|x| x == id);

        let mut graph = StepGraph::with_nodes(ids.len());
        let mut deps_per_node: Vec<Vec<usize>> = Vec::with_capacity(ids.len());
        for (i, p) in self.pending.iter().enumerate() {
            let id = &ids[i];
            let inputs = p.step.inputs();
            for slot in &inputs {
                let Some(pred) = position(&slot.step) else {
                    return Err(violation(format!("step '{id}' reads {slot} from unknown step '{}'", slot.step)));
                };
                let produced = self.pending[pred].step.outputs();
                if !produced.iter().any(|f| *f == slot.field) {
                    return Err(violation(format!("step '{id}' reads {slot} which '{}' does not produce (declares {:?})",
                                                 slot.step, produced)));
                }
            }

            let mut deps: Vec<usize> = Vec::new();
            let named = inputs.iter()
                              .map(|s| s.step.clone())
                              .chain(p.step.after())
                              .chain(p.extra_after.iter().cloned());
            for dep_id in named {
                let dep = position(&dep_id).ok_or_else(|| violation(format!("step '{id}' depends on unknown step '{dep_id}'")))?;
                if dep == i {
                    return Err(violation(format!("step '{id}' depends on itself")));
                }
                if !deps.contains(&dep) {
                    deps.push(dep);
                    graph.add_edge(dep, i);
                }
            }
            deps_per_node.push(deps);
        }

        let order = graph.toposort()
                         .map_err(|c| violation(format!("dependency cycle through step '{}'", ids[c.0])))?;

        let definition_hash = hash_value(&describe(&self.pending, &deps_per_node, &ids));
        let nodes = self.pending
                        .into_iter()
                        .zip(deps_per_node)
                        .map(|(p, depends_on)| StepNode { step: p.step,
                                                          retry: p.retry,
                                                          depends_on })
                        .collect();
        Ok(FlowDefinition { nodes,
                            graph,
                            order,
                            definition_hash })
    }
}

fn violation(msg: String) -> FlowError {
    FlowError::DependencyContractViolation(msg)
}

fn describe(pending: &[PendingNode], deps: &[Vec<usize>], ids: &[String]) -> Value {
    let steps: Vec<Value> = pending.iter()
                                   .zip(deps)
                                   .map(|(p, d)| {
                                       json!({
                                           "id": p.step.id(),
                                           "kind": format!("{:?}", p.step.kind()),
                                           "inputs": p.step.inputs().iter().map(InputSlot::to_string).collect::<Vec<_>>(),
                                           "outputs": p.step.outputs(),
                                           "depends_on": d.iter().map(|i| ids[*i].as_str()).collect::<Vec<_>>(),
                                           "max_retries": p.retry.max_retries,
                                           "retry_delay_ms": u64::try_from(p.retry.delay.as_millis()).unwrap_or(u64::MAX),
                                       })
                                   })
                                   .collect();
    json!({ "engine_version": crate::constants::ENGINE_VERSION, "steps": steps })
}

/// Estado de un step reconstruido por replay.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSlot {
    pub step_id: String,
    pub status: StepStatus,
    pub attempts: u32,
    pub outputs: Option<StepOutputs>,
    pub fingerprint: Option<String>,
    pub last_error: Option<FlowError>,
    pub skipped: Option<SkipReason>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepSlot {
    fn pending(step_id: &str) -> Self {
        Self { step_id: step_id.to_string(),
               status: StepStatus::Pending,
               attempts: 0,
               outputs: None,
               fingerprint: None,
               last_error: None,
               skipped: None,
               started_at: None,
               finished_at: None }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    /// Aplica una transición del ciclo de vida del step. Las que no son
    /// válidas se registran y se ignoran. Repetir `Failed` es el cierre
    /// terminal tras cancelar la espera de un reintento.
    fn advance(&mut self, run_id: Uuid, next: StepStatus) -> bool {
        let repeated_failure = self.status == StepStatus::Failed && next == StepStatus::Failed;
        if !repeated_failure && !self.status.can_transition_to(next) {
            warn!("run {run_id}: ignoring {:?} -> {next:?} for step '{}'", self.status, self.step_id);
            return false;
        }
        self.status = next;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed { step_id: String, kind: ErrorKind },
    /// Sin evento de cierre (run en curso o log truncado).
    Incomplete,
}

/// Resultado observable de un run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub logical_ts: Option<RunTimestamp>,
    pub definition_hash: Option<String>,
    pub outcome: RunOutcome,
    pub run_fingerprint: Option<String>,
    pub steps: Vec<StepSlot>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Succeeded
    }

    pub fn step(&self, step_id: &str) -> Option<&StepSlot> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    pub fn output(&self, step_id: &str, field: &str) -> Option<&Value> {
        self.step(step_id)?.outputs.as_ref()?.get(field)
    }

    /// Steps con fallo terminal, en orden de definición.
    pub fn failed_steps(&self) -> Vec<&StepSlot> {
        self.steps.iter().filter(|s| s.status == StepStatus::Failed).collect()
    }

    pub fn skipped_steps(&self) -> Vec<&str> {
        self.steps.iter().filter(|s| s.is_skipped()).map(|s| s.step_id.as_str()).collect()
    }

    /// Línea de resumen apta para logs y salida de CLI.
    pub fn summary(&self) -> String {
        let ts = self.logical_ts.map(|t| t.to_string()).unwrap_or_else(|| "?".into());
        match &self.outcome {
            RunOutcome::Succeeded => format!("run {} @ {ts}: succeeded ({} steps)", self.run_id, self.steps.len()),
            RunOutcome::Failed { step_id, kind } => {
                let skipped = self.skipped_steps();
                format!("run {} @ {ts}: step '{step_id}' failed with {kind}; skipped: [{}]",
                        self.run_id,
                        skipped.join(", "))
            }
            RunOutcome::Incomplete => format!("run {} @ {ts}: incomplete", self.run_id),
        }
    }
}

/// Trait para reconstruir (`replay`) el estado de un run a partir de eventos.
pub trait FlowRepository: Send + Sync {
    fn load(&self, run_id: Uuid, events: &[RunEvent], definition: &FlowDefinition) -> RunReport;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryFlowRepository;

impl InMemoryFlowRepository {
    pub fn new() -> Self {
        Self
    }
}

impl FlowRepository for InMemoryFlowRepository {
    fn load(&self, run_id: Uuid, events: &[RunEvent], definition: &FlowDefinition) -> RunReport {
        let mut steps: Vec<StepSlot> = definition.nodes().map(|n| StepSlot::pending(n.step.id())).collect();
        let mut report = RunReport { run_id,
                                     logical_ts: None,
                                     definition_hash: None,
                                     outcome: RunOutcome::Incomplete,
                                     run_fingerprint: None,
                                     steps: Vec::new() };
        for ev in events {
            match &ev.kind {
                RunEventKind::RunInitialized { definition_hash, logical_ts, .. } => {
                    report.definition_hash = Some(definition_hash.clone());
                    report.logical_ts = Some(*logical_ts);
                }
                RunEventKind::StepStarted { step_index, attempt, .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        if slot.advance(run_id, StepStatus::Running) {
                            slot.attempts = *attempt;
                            slot.started_at.get_or_insert(ev.ts);
                        }
                    }
                }
                RunEventKind::StepFinished { step_index,
                                             outputs,
                                             fingerprint,
                                             .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        if slot.advance(run_id, StepStatus::Succeeded) {
                            slot.outputs = Some(outputs.clone());
                            slot.fingerprint = Some(fingerprint.clone());
                            slot.finished_at = Some(ev.ts);
                        }
                    }
                }
                RunEventKind::StepFailed { step_index, error, .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        if slot.advance(run_id, StepStatus::Failed) {
                            slot.last_error = Some(error.clone());
                            slot.finished_at = Some(ev.ts);
                        }
                    }
                }
                RunEventKind::RetryScheduled { .. } => {}
                RunEventKind::StepSkipped { step_index, reason, .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.skipped = Some(reason.clone());
                    }
                }
                RunEventKind::RunCompleted { run_fingerprint } => {
                    report.outcome = RunOutcome::Succeeded;
                    report.run_fingerprint = Some(run_fingerprint.clone());
                }
                RunEventKind::RunFailed { step_id, kind } => {
                    report.outcome = RunOutcome::Failed { step_id: step_id.clone(),
                                                          kind: *kind };
                }
            }
        }
        report.steps = steps;
        report
    }
}

#![allow(dead_code)]
//! Utilidades compartidas por los tests de integración de listing-core.

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use listing_core::adapter::{ObjectStore, StoreError};
use listing_core::{ExecutionContext, FlowError, InputSlot, StepDefinition, StepKind, StepOutputs, StepRunResult};

type StepFn = dyn Fn(&ExecutionContext<'_>) -> Result<StepOutputs, FlowError> + Send + Sync;

/// Step configurable con una closure.
pub struct FnStep {
    id: &'static str,
    kind: StepKind,
    inputs: Vec<InputSlot>,
    after: Vec<String>,
    outputs: &'static [&'static str],
    calls: AtomicU32,
    body: Box<StepFn>,
}

impl FnStep {
    pub fn new<F>(id: &'static str, outputs: &'static [&'static str], body: F) -> Self
        where F: Fn(&ExecutionContext<'_>) -> Result<StepOutputs, FlowError> + Send + Sync + 'static
    {
        Self { id,
               kind: StepKind::Transfer,
               inputs: Vec::new(),
               after: Vec::new(),
               outputs,
               calls: AtomicU32::new(0),
               body: Box::new(body) }
    }

    pub fn reads(mut self, step: &str, field: &str) -> Self {
        self.inputs.push(InputSlot::new(step, field));
        self
    }

    pub fn after(mut self, step: &str) -> Self {
        self.after.push(step.to_string());
        self
    }

    pub fn kind(mut self, kind: StepKind) -> Self {
        self.kind = kind;
        self
    }
}

impl StepDefinition for FnStep {
    fn id(&self) -> &str {
        self.id
    }

    fn kind(&self) -> StepKind {
        self.kind
    }

    fn inputs(&self) -> Vec<InputSlot> {
        self.inputs.clone()
    }

    fn after(&self) -> Vec<String> {
        self.after.clone()
    }

    fn outputs(&self) -> &[&'static str] {
        self.outputs
    }

    fn run(&self, ctx: &ExecutionContext<'_>) -> StepRunResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.body)(ctx).into()
    }
}

/// Step que produce un único campo con un valor fijo.
pub fn constant(id: &'static str, field: &'static [&'static str], value: &'static str) -> FnStep {
    FnStep::new(id, field, move |_| {
        let mut out = StepOutputs::new();
        for f in field {
            out.insert(f, value)?;
        }
        Ok(out)
    })
}

/// Object store cuyo `exists` responde según un guion; agotado el guion
/// responde `Ok(false)`.
#[derive(Default)]
pub struct ScriptedStore {
    script: Mutex<VecDeque<Result<bool, String>>>,
    calls: AtomicU32,
}

impl ScriptedStore {
    pub fn new(script: Vec<Result<bool, String>>) -> Self {
        Self { script: Mutex::new(script.into()),
               calls: AtomicU32::new(0) }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ObjectStore for ScriptedStore {
    fn put(&self, _key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
        Ok(())
    }

    fn move_object(&self, _source: &str, _dest: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn exists(&self, _key: &str) -> Result<bool, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().expect("script lock").pop_front();
        match next {
            Some(Ok(found)) => Ok(found),
            Some(Err(msg)) => Err(StoreError::Unavailable(msg)),
            None => Ok(false),
        }
    }

    fn list(&self, _prefix: &str) -> Result<BTreeSet<String>, StoreError> {
        Ok(BTreeSet::new())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        Err(StoreError::NotFound(key.to_string()))
    }
}

//! listing-core: orquestación de runs del pipeline de listings.
//!
//! Naming de artifacts, contratos de adapters, poller de existencia,
//! selector del artifact más reciente y el `FlowEngine` que ejecuta el DAG
//! de steps con propagación de outputs y reintentos.
pub mod adapter;
pub mod clock;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod graph;
pub mod hashing;
pub mod model;
pub mod naming;
pub mod poller;
pub mod repo;
pub mod selector;
pub mod step;

pub use clock::{CancelToken, Clock, ManualClock, SleepOutcome, SystemClock};
pub use engine::{EngineBuilder, FlowEngine};
pub use errors::{ErrorKind, FlowError};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind, SkipReason};
pub use model::{ArtifactRef, ExecutionContext, InputSlot, Run, StepOutputs};
pub use naming::{make_key, ArtifactNaming, RunTimestamp};
pub use poller::{ExistencePoller, PollPolicy, Visibility};
pub use repo::{FlowDefinition, FlowRepository, InMemoryFlowRepository, RunOutcome, RunReport, StepSlot};
pub use selector::{select_latest, select_latest_conforming, MalformedKeyPolicy};
pub use step::{RetryPolicy, StepDefinition, StepKind, StepRunResult, StepStatus};

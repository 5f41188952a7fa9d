//! Engine module for FlowEngine implementation
//!
//! Provides the core engine and its builder.

pub mod builder;
pub mod core;

pub use builder::EngineBuilder;
pub use core::FlowEngine;

pub use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use crate::repo::{FlowDefinition, FlowRepository, InMemoryFlowRepository, RunOutcome, RunReport};
pub use crate::step::{StepRunResult, StepStatus};

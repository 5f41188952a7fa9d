mod support;

use listing_core::{EventStore, FlowDefinition, FlowError, FlowRepository, InMemoryEventStore, InMemoryFlowRepository,
                   RetryPolicy, RunEventKind, StepOutputs, StepStatus};
use support::constant;
use uuid::Uuid;

fn one_step() -> FlowDefinition {
    FlowDefinition::builder().add_step(constant("extract", &["artifact"], "k"), RetryPolicy::none())
                             .build()
                             .expect("definition")
}

fn finished(attempt: u32) -> RunEventKind {
    RunEventKind::StepFinished { step_index: 0,
                                 step_id: "extract".into(),
                                 attempt,
                                 outputs: StepOutputs::new().with("artifact", "k").expect("outputs"),
                                 fingerprint: "fp".into() }
}

fn failed(attempt: u32, error: FlowError, will_retry: bool) -> RunEventKind {
    RunEventKind::StepFailed { step_index: 0,
                               step_id: "extract".into(),
                               attempt,
                               error,
                               will_retry }
}

fn started(attempt: u32) -> RunEventKind {
    RunEventKind::StepStarted { step_index: 0,
                                step_id: "extract".into(),
                                attempt }
}

#[test]
fn finish_without_start_is_ignored_by_replay() {
    let def = one_step();
    let store = InMemoryEventStore::new();
    let run_id = Uuid::new_v4();
    store.append_kind(run_id, finished(1));

    let report = InMemoryFlowRepository::new().load(run_id, &store.list(run_id), &def);
    let slot = report.step("extract").expect("slot");
    assert_eq!(slot.status, StepStatus::Pending);
    assert!(slot.outputs.is_none());
    assert_eq!(slot.attempts, 0);
}

#[test]
fn retry_cycle_replays_to_success() {
    let def = one_step();
    let store = InMemoryEventStore::new();
    let run_id = Uuid::new_v4();
    for kind in [started(1),
                 failed(1, FlowError::SourceFetchFailed("503".into()), true),
                 started(2),
                 finished(2)]
    {
        store.append_kind(run_id, kind);
    }

    let report = InMemoryFlowRepository::new().load(run_id, &store.list(run_id), &def);
    let slot = report.step("extract").expect("slot");
    assert_eq!(slot.status, StepStatus::Succeeded);
    assert_eq!(slot.attempts, 2);
    assert!(slot.outputs.is_some());
}

#[test]
fn terminal_close_after_cancelled_retry_keeps_cancel_error() {
    let def = one_step();
    let store = InMemoryEventStore::new();
    let run_id = Uuid::new_v4();
    for kind in [started(1),
                 failed(1, FlowError::SourceFetchFailed("timeout".into()), true),
                 failed(1, FlowError::Cancelled, false),
                 finished(1)]
    {
        store.append_kind(run_id, kind);
    }

    let report = InMemoryFlowRepository::new().load(run_id, &store.list(run_id), &def);
    let slot = report.step("extract").expect("slot");
    assert_eq!(slot.status, StepStatus::Failed);
    assert_eq!(slot.last_error, Some(FlowError::Cancelled));
    assert!(slot.outputs.is_none());
}

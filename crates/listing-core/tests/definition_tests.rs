mod support;

use std::time::Duration;

use listing_core::{FlowDefinition, FlowError, RetryPolicy};
use support::constant;

fn violation(result: Result<FlowDefinition, FlowError>) -> String {
    match result {
        Err(FlowError::DependencyContractViolation(msg)) => msg,
        Err(other) => panic!("unexpected error {other:?}"),
        Ok(_) => panic!("definition should be rejected"),
    }
}

#[test]
fn empty_definition_is_rejected() {
    assert!(violation(FlowDefinition::builder().build()).contains("no steps"));
}

#[test]
fn duplicate_ids_are_rejected() {
    let res = FlowDefinition::builder().add_step(constant("a", &[], ""), RetryPolicy::none())
                                       .add_step(constant("a", &[], ""), RetryPolicy::none())
                                       .build();
    assert!(violation(res).contains("duplicate"));
}

#[test]
fn input_from_unknown_step_is_rejected() {
    let res = FlowDefinition::builder().add_step(constant("a", &[], "").reads("ghost", "x"), RetryPolicy::none())
                                       .build();
    assert!(violation(res).contains("ghost"));
}

#[test]
fn input_field_not_produced_by_predecessor_is_rejected() {
    let res = FlowDefinition::builder().add_step(constant("extract", &["artifact"], ""), RetryPolicy::none())
                                       .add_step(constant("load", &[], "").reads("extract", "selected_key"),
                                                 RetryPolicy::none())
                                       .build();
    let msg = violation(res);
    assert!(msg.contains("extract.selected_key"), "{msg}");
}

#[test]
fn self_dependency_is_rejected() {
    let res = FlowDefinition::builder().add_step(constant("a", &[], "").after("a"), RetryPolicy::none())
                                       .build();
    assert!(violation(res).contains("itself"));
}

#[test]
fn cycles_are_rejected() {
    let res = FlowDefinition::builder().add_step(constant("a", &[], "").after("b"), RetryPolicy::none())
                                       .add_step(constant("b", &[], "").after("a"), RetryPolicy::none())
                                       .build();
    assert!(violation(res).contains("cycle"));
}

#[test]
fn then_chains_behind_previous_step() {
    let def = FlowDefinition::builder().add_step(constant("b", &[], ""), RetryPolicy::none())
                                       .add_step(constant("a", &[], "").after("c"), RetryPolicy::none())
                                       .then(constant("c", &[], ""), RetryPolicy::none())
                                       .build();
    // c depende de a (por `then`) y a de c: ciclo
    assert!(violation(def).contains("cycle"));

    let def = FlowDefinition::builder().add_step(constant("load", &[], "").after("extract"), RetryPolicy::none())
                                       .add_step(constant("extract", &[], ""), RetryPolicy::none())
                                       .build()
                                       .expect("definition");
    let order: Vec<&str> = def.execution_order()
                              .iter()
                              .filter_map(|i| def.node(*i).map(|n| n.step.id()))
                              .collect();
    assert_eq!(order, vec!["extract", "load"]);
    assert_eq!(def.ancestors(0), vec![1]);
}

#[test]
fn definition_hash_tracks_retry_policy() {
    let build = |retries| {
        FlowDefinition::builder().add_step(constant("a", &["x"], ""), RetryPolicy::new(retries, Duration::from_secs(15)))
                                 .then(constant("b", &[], "").reads("a", "x"), RetryPolicy::none())
                                 .build()
                                 .expect("definition")
    };
    assert_eq!(build(2).definition_hash(), build(2).definition_hash());
    assert_ne!(build(2).definition_hash(), build(3).definition_hash());
}

#[test]
fn oversized_retry_delay_saturates_in_hash() {
    let build = |delay| {
        FlowDefinition::builder().add_step(constant("a", &[], ""), RetryPolicy::new(1, delay))
                                 .build()
                                 .expect("definition")
    };
    // Ambos superan u64::MAX milisegundos: se saturan en vez de truncarse.
    let max = build(Duration::MAX);
    assert_eq!(max.definition_hash(), build(Duration::from_secs(u64::MAX)).definition_hash());
    assert_ne!(max.definition_hash(), build(Duration::from_millis(u64::MAX - 1)).definition_hash());
}

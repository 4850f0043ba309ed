//! End-to-end flow runs through the public API.

use pretty_assertions::assert_eq;
use rillflow_base::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn tee_observes_every_token_of_a_run() {
    init_tracing();
    let mut flow = Flow::new(vec![
        Box::new(ForLoop::with_range(1, 3, 1).unwrap()),
        Box::new(Tee::new(vec![Box::new(
            IncStorage::with_options("counter", "2").unwrap(),
        )])),
        Box::new(Null::new()),
    ]);
    let storage = flow.storage();

    flow.run().await.unwrap();

    // Three tokens passed the tee, each incrementing by two.
    assert_eq!(storage.read().await.get("counter"), Some(&json!(6)));
}

#[tokio::test]
async fn conditional_tee_with_false_condition_has_no_side_effects() {
    let mut flow = Flow::new(vec![
        Box::new(ForLoop::with_range(1, 5, 1).unwrap()),
        Box::new(ConditionalTee::with_condition(
            vec![Box::new(IncStorage::with_options("counter", "1").unwrap())],
            Box::new(AlwaysFalse),
        )),
        Box::new(Null::new()),
    ]);
    let storage = flow.storage();

    flow.run().await.unwrap();

    assert!(!storage.read().await.has("counter"));
}

#[tokio::test]
async fn set_storage_captures_the_last_token() {
    let mut flow = Flow::new(vec![
        Box::new(ForLoop::with_range(10, 30, 10).unwrap()),
        Box::new(SetStorage::with_name("last").unwrap()),
        Box::new(Null::new()),
    ]);
    let storage = flow.storage();

    flow.run().await.unwrap();

    assert_eq!(storage.read().await.get("last"), Some(&json!(30)));
}

#[tokio::test]
async fn nested_tees_share_one_storage() {
    let inner = Tee::new(vec![Box::new(
        IncStorage::with_options("inner", "1").unwrap(),
    )]);
    let outer = Tee::new(vec![
        Box::new(PassThrough::new()),
        Box::new(inner),
        Box::new(Null::new()),
    ]);
    let mut flow = Flow::new(vec![
        Box::new(ForLoop::with_range(1, 2, 1).unwrap()),
        Box::new(outer),
        Box::new(Null::new()),
    ]);
    let storage = flow.storage();

    flow.run().await.unwrap();

    assert_eq!(storage.read().await.get("inner"), Some(&json!(2)));
}

#[tokio::test]
async fn configuration_errors_stop_the_run_before_any_token() {
    // IncStorage with an invalid storage name fails at setup; the source
    // never emits.
    let mut flow = Flow::new(vec![
        Box::new(ForLoop::with_range(1, 100, 1).unwrap()),
        Box::new(Tee::new(vec![Box::new(
            IncStorage::with_options("not valid", "1").unwrap(),
        )])),
        Box::new(Null::new()),
    ]);
    let storage = flow.storage();

    let err = flow.run().await.unwrap_err();
    assert!(matches!(err, FlowError::Configuration(_)));
    assert!(storage.read().await.is_empty());
}

#[tokio::test]
async fn reset_allows_a_second_run_on_the_same_storage() {
    let mut flow = Flow::new(vec![
        Box::new(ForLoop::with_range(1, 1, 1).unwrap()),
        Box::new(IncStorage::with_options("runs", "1").unwrap()),
        Box::new(Null::new()),
    ]);
    let storage = flow.storage();

    flow.run().await.unwrap();
    flow.reset();
    flow.run().await.unwrap();

    // Storage outlives wrap-up; the second run increments again.
    assert_eq!(storage.read().await.get("runs"), Some(&json!(2)));
}

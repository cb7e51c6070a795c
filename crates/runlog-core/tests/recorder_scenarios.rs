use chrono::Utc;
use runlog_core::config::RecorderConfig;
use runlog_core::errors::RecorderError;
use runlog_core::event::{Artifact, RawOutcome, RunEvent};
use runlog_core::recorder::Recorder;
use runlog_core::storage::store::Store;
use std::collections::BTreeMap;
use tempfile::tempdir;

fn recorder() -> anyhow::Result<Recorder> {
    let store = Store::memory()?;
    store.init_schema()?;
    Ok(Recorder::new(store))
}

fn run_start() -> RunEvent {
    RunEvent::RunStart { start: Utc::now() }
}

fn test_start(name: &str) -> RunEvent {
    RunEvent::TestStart {
        name: name.into(),
        description: None,
        start: Utc::now(),
    }
}

fn outcome(raw: RawOutcome, expected: bool) -> RunEvent {
    RunEvent::TestOutcome {
        outcome: raw,
        expected,
        exc_info: None,
        reason: None,
        metadata: BTreeMap::new(),
    }
}

fn outcome_with(
    raw: RawOutcome,
    expected: bool,
    exc_info: Option<&str>,
    reason: Option<&str>,
) -> RunEvent {
    RunEvent::TestOutcome {
        outcome: raw,
        expected,
        exc_info: exc_info.map(str::to_owned),
        reason: reason.map(str::to_owned),
        metadata: BTreeMap::new(),
    }
}

/// Drive one test through the recorder and return its (result, msg) pair.
fn record_single(event: RunEvent) -> anyhow::Result<(String, String)> {
    let mut rec = recorder()?;
    rec.handle(run_start())?;
    let run_id = rec.current_run().unwrap().to_owned();
    rec.handle(test_start("suite.T.test"))?;
    rec.handle(event)?;
    rec.handle(RunEvent::RunStop { finish: Utc::now() })?;

    let rows = rec.store().fetch_tests_for_run(&run_id)?;
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    Ok((
        row.result.clone().expect("result recorded"),
        row.msg.clone().expect("msg recorded"),
    ))
}

#[test]
fn open_initializes_the_configured_database() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cfg = RecorderConfig {
        path: dir.path().join("runlog.dat"),
    };
    let mut rec = Recorder::open(&cfg)?;
    rec.handle(run_start())?;
    rec.handle(RunEvent::RunStop { finish: Utc::now() })?;
    assert_eq!(rec.store().count_rows("runs")?, 1);

    // Reopening finds the schema already in place.
    let rec = Recorder::open(&cfg)?;
    assert_eq!(rec.store().count_rows("runs")?, 1);
    Ok(())
}

#[test]
fn passing_test_records_passed_with_empty_message() -> anyhow::Result<()> {
    let (result, msg) = record_single(outcome(RawOutcome::Pass, true))?;
    assert_eq!(result, "passed");
    assert_eq!(msg, "");
    Ok(())
}

#[test]
fn unexpected_success_is_flagged() -> anyhow::Result<()> {
    let (result, msg) = record_single(outcome(RawOutcome::Pass, false))?;
    assert_eq!(result, "passed");
    assert_eq!(msg, "Test passed unexpectedly.");
    Ok(())
}

#[test]
fn expected_failure_is_recorded_as_skipped() -> anyhow::Result<()> {
    let (result, msg) = record_single(outcome(RawOutcome::Fail, true))?;
    assert_eq!(result, "skipped");
    assert_eq!(msg, "Test failure expected.");
    Ok(())
}

#[test]
fn failure_message_carries_the_traceback() -> anyhow::Result<()> {
    let (result, msg) = record_single(outcome_with(
        RawOutcome::Fail,
        false,
        Some("Traceback (most recent call last): 1 != 2"),
        None,
    ))?;
    assert_eq!(result, "failed");
    assert!(msg.contains("Traceback"));
    Ok(())
}

#[test]
fn error_message_carries_the_traceback() -> anyhow::Result<()> {
    let (result, msg) = record_single(outcome_with(
        RawOutcome::Error,
        false,
        Some("Traceback (most recent call last): ZeroDivisionError"),
        None,
    ))?;
    assert_eq!(result, "error");
    assert!(msg.contains("Traceback"));
    Ok(())
}

#[test]
fn skip_records_the_reason() -> anyhow::Result<()> {
    let (result, msg) = record_single(outcome_with(
        RawOutcome::Skip,
        false,
        None,
        Some("requires network"),
    ))?;
    assert_eq!(result, "skipped");
    assert_eq!(msg, "requires network");
    Ok(())
}

#[test]
fn repeated_names_get_distinct_records() -> anyhow::Result<()> {
    // Parameterized expansions reuse the test name; storage ids tell them
    // apart.
    let mut rec = recorder()?;
    rec.handle(run_start())?;
    let run_id = rec.current_run().unwrap().to_owned();

    for expected in [true, false] {
        rec.handle(test_start("suite.T.test_params"))?;
        rec.handle(outcome(RawOutcome::Pass, expected))?;
    }
    rec.handle(RunEvent::RunStop { finish: Utc::now() })?;

    let rows = rec.store().fetch_tests_for_run(&run_id)?;
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0].id, rows[1].id);
    assert_eq!(rows[0].name, rows[1].name);
    assert_eq!(rows[0].result.as_deref(), Some("passed"));
    assert_eq!(rows[1].result.as_deref(), Some("passed"));
    Ok(())
}

#[test]
fn timestamps_are_ordered_across_the_run() -> anyhow::Result<()> {
    let mut rec = recorder()?;
    rec.handle(run_start())?;
    let run_id = rec.current_run().unwrap().to_owned();
    rec.handle(test_start("suite.T.test"))?;
    rec.handle(outcome(RawOutcome::Pass, true))?;
    rec.handle(RunEvent::RunStop { finish: Utc::now() })?;

    let run = rec.store().fetch_run(&run_id)?.expect("run row");
    let rows = rec.store().fetch_tests_for_run(&run_id)?;
    let test = &rows[0];

    assert_eq!(test.runid, run.id);
    assert!(run.start <= test.start);
    assert!(test.start <= *test.finish.as_ref().expect("test finish set"));
    assert!(run.start <= *run.finish.as_ref().expect("run finish set"));
    Ok(())
}

#[test]
fn description_is_persisted_when_present() -> anyhow::Result<()> {
    let mut rec = recorder()?;
    rec.handle(run_start())?;
    let run_id = rec.current_run().unwrap().to_owned();
    rec.handle(RunEvent::TestStart {
        name: "suite.T.test".into(),
        description: Some("checks the frobnicator".into()),
        start: Utc::now(),
    })?;
    rec.handle(outcome(RawOutcome::Pass, true))?;

    let rows = rec.store().fetch_tests_for_run(&run_id)?;
    assert_eq!(rows[0].desc.as_deref(), Some("checks the frobnicator"));
    Ok(())
}

#[test]
fn out_of_order_events_are_contract_errors() -> anyhow::Result<()> {
    let mut rec = recorder()?;

    // Test start before any run.
    let err = rec.handle(test_start("suite.T.test")).unwrap_err();
    assert!(matches!(err, RecorderError::OutOfOrder(_)));

    // Outcome without an open test.
    rec.handle(run_start())?;
    let err = rec.handle(outcome(RawOutcome::Pass, true)).unwrap_err();
    assert!(matches!(err, RecorderError::OutOfOrder(_)));

    // Second run start while one is open.
    let err = rec.handle(run_start()).unwrap_err();
    assert!(matches!(err, RecorderError::OutOfOrder(_)));

    // Overlapping test starts.
    rec.handle(test_start("suite.T.a"))?;
    let err = rec.handle(test_start("suite.T.b")).unwrap_err();
    assert!(matches!(err, RecorderError::OutOfOrder(_)));

    // Stop closes the run; a second stop has nothing to close.
    rec.handle(outcome(RawOutcome::Pass, true))?;
    rec.handle(RunEvent::RunStop { finish: Utc::now() })?;
    let err = rec
        .handle(RunEvent::RunStop { finish: Utc::now() })
        .unwrap_err();
    assert!(matches!(err, RecorderError::OutOfOrder(_)));
    Ok(())
}

#[test]
fn failed_capture_keeps_the_outcome_row() -> anyhow::Result<()> {
    let mut rec = recorder()?;
    rec.handle(run_start())?;
    let run_id = rec.current_run().unwrap().to_owned();
    rec.handle(test_start("suite.T.test"))?;
    let test_id = rec.current_test().expect("test open");

    // Conflicting row planted ahead of capture makes the batch fail.
    rec.store()
        .insert_properties(test_id, &[("stdout".into(), "planted".into())])?;

    let mut metadata = BTreeMap::new();
    metadata.insert("stdout".to_owned(), Artifact::Text("captured".into()));
    rec.handle(RunEvent::TestOutcome {
        outcome: RawOutcome::Pass,
        expected: true,
        exc_info: None,
        reason: None,
        metadata,
    })?;

    // Outcome recorded, artifacts for this outcome dropped.
    let rows = rec.store().fetch_tests_for_run(&run_id)?;
    assert_eq!(rows[0].result.as_deref(), Some("passed"));
    let props = rec.store().fetch_properties(test_id)?;
    assert_eq!(props.len(), 1);
    assert_eq!(props[0].value, "planted");
    Ok(())
}

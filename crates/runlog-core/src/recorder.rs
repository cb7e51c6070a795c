use crate::config::RecorderConfig;
use crate::errors::{RecorderError, Result};
use crate::event::RunEvent;
use crate::outcome::classify;
use crate::properties;
use crate::storage::store::Store;
use chrono::Utc;

/// Event adapter: drives the trackers from the host framework's lifecycle
/// events. One instance records one logical event sequence; concurrent runs
/// get independent instances with independent stores, never shared state.
pub struct Recorder {
    store: Store,
    current_run: Option<String>,
    current_test: Option<i64>,
}

impl Recorder {
    /// Open (or create) the configured database and ensure the schema.
    pub fn open(cfg: &RecorderConfig) -> Result<Self> {
        let store = Store::open(&cfg.path)?;
        store.init_schema()?;
        Ok(Self::new(store))
    }

    /// Wrap an already-opened store. The schema is assumed initialized.
    pub fn new(store: Store) -> Self {
        Self {
            store,
            current_run: None,
            current_test: None,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Identifier of the run currently being recorded, if any.
    pub fn current_run(&self) -> Option<&str> {
        self.current_run.as_deref()
    }

    /// Record id of the test currently awaiting its outcome, if any.
    pub fn current_test(&self) -> Option<i64> {
        self.current_test
    }

    /// Process one lifecycle event to completion.
    ///
    /// Events must arrive in contract order: run start, then test start /
    /// test outcome pairs, then run stop. Violations surface as
    /// `OutOfOrder`; storage failures on run or record mutations propagate
    /// to the caller. A property-capture failure is the one recovered
    /// condition: the outcome row stays committed, the artifacts for that
    /// test are rolled back, and a diagnostic is logged.
    pub fn handle(&mut self, event: RunEvent) -> Result<()> {
        match event {
            RunEvent::RunStart { start } => {
                if self.current_run.is_some() {
                    return Err(RecorderError::OutOfOrder("run already started"));
                }
                let run_id = self.store.begin_run(start)?;
                self.current_run = Some(run_id);
                Ok(())
            }

            RunEvent::TestStart {
                name,
                description,
                start,
            } => {
                let run_id = self
                    .current_run
                    .as_deref()
                    .ok_or(RecorderError::OutOfOrder("test started outside a run"))?;
                if self.current_test.is_some() {
                    return Err(RecorderError::OutOfOrder(
                        "test started while another is open",
                    ));
                }
                let test_id =
                    self.store
                        .begin_test(run_id, &name, description.as_deref(), start)?;
                self.current_test = Some(test_id);
                Ok(())
            }

            RunEvent::TestOutcome {
                outcome,
                expected,
                exc_info,
                reason,
                metadata,
            } => {
                let test_id = self
                    .current_test
                    .ok_or(RecorderError::OutOfOrder("outcome without an open test"))?;
                let (normalized, msg) =
                    classify(outcome, expected, exc_info.as_deref(), reason.as_deref());
                self.store
                    .complete_test(test_id, Utc::now(), normalized, &msg)?;
                self.current_test = None;

                // Isolated: a lost artifact set never aborts the run or the
                // already-committed outcome row.
                if let Err(e) = properties::capture(&self.store, test_id, &metadata) {
                    tracing::warn!(test_id, error = %e, "artifact capture failed; outcome retained");
                }
                Ok(())
            }

            RunEvent::RunStop { finish } => {
                let run_id = self
                    .current_run
                    .as_deref()
                    .ok_or(RecorderError::OutOfOrder("run stop without an open run"))?;
                self.store.end_run(run_id, finish)?;
                self.current_run = None;
                Ok(())
            }
        }
    }
}

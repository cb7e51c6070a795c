use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Raw outcome tag as reported by the test-execution framework, before
/// normalization. The framework pairs it with an `expected` flag that says
/// whether this outcome matched the test's declared expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawOutcome {
    Pass,
    Fail,
    Error,
    Skip,
}

/// An auxiliary artifact attached to a test outcome. The set is closed:
/// buffered stream contents or an ordered sequence of log lines. Anything
/// else the framework might hand over is rejected at the capture boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Text(String),
    Lines(Vec<String>),
}

/// Lifecycle events delivered by the host framework, in strict temporal
/// order: run start, then test start / test outcome pairs, then run stop.
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStart {
        start: DateTime<Utc>,
    },
    TestStart {
        /// Fully-qualified test identifier. Repeats are allowed across
        /// parameterized or generated expansions of the same test.
        name: String,
        description: Option<String>,
        start: DateTime<Utc>,
    },
    TestOutcome {
        outcome: RawOutcome,
        expected: bool,
        /// Rendered exception/traceback text, when the framework caught one.
        exc_info: Option<String>,
        /// Free-form reason, e.g. a skip reason.
        reason: Option<String>,
        metadata: BTreeMap<String, Artifact>,
    },
    RunStop {
        finish: DateTime<Utc>,
    },
}

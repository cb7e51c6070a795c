use crate::event::RawOutcome;

/// Normalized outcome taxonomy persisted to storage.
///
/// Downstream consumers query these four values only; the interaction
/// between the framework's raw tags and its expected-failure annotations is
/// folded in by [`classify`] and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    Error,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Error => "error",
            Outcome::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Outcome> {
        match s {
            "passed" => Some(Outcome::Passed),
            "failed" => Some(Outcome::Failed),
            "error" => Some(Outcome::Error),
            "skipped" => Some(Outcome::Skipped),
            _ => None,
        }
    }
}

/// Map a raw framework outcome to the normalized `(outcome, message)` pair.
///
/// Message precedence: rendered exception text, else the reported reason,
/// else empty. Two expectation cases override both fields: a test declared
/// expected-to-fail that passes anyway, and a declared failure that fails
/// as declared.
pub fn classify(
    raw: RawOutcome,
    expected: bool,
    exc_info: Option<&str>,
    reason: Option<&str>,
) -> (Outcome, String) {
    let msg = exc_info
        .or(reason)
        .map(str::to_owned)
        .unwrap_or_default();

    match (raw, expected) {
        // Unexpected success: marked expected-to-fail, passed anyway.
        (RawOutcome::Pass, false) => (Outcome::Passed, "Test passed unexpectedly.".to_owned()),
        // Expected failure: failed exactly as declared.
        (RawOutcome::Fail, true) => (Outcome::Skipped, "Test failure expected.".to_owned()),
        (RawOutcome::Pass, true) => (Outcome::Passed, msg),
        (RawOutcome::Fail, false) => (Outcome::Failed, msg),
        (RawOutcome::Error, _) => (Outcome::Error, msg),
        (RawOutcome::Skip, _) => (Outcome::Skipped, msg),
    }
}

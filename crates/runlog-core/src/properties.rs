use crate::errors::{RecorderError, Result};
use crate::event::Artifact;
use crate::storage::store::Store;
use std::collections::BTreeMap;

pub const STDOUT_KEY: &str = "stdout";
pub const STDERR_KEY: &str = "stderr";
pub const LOGS_KEY: &str = "logs";

/// Persist the auxiliary artifacts carried by an outcome event.
///
/// Capture order is fixed: stdout, stderr, logs. Empty stream captures are
/// skipped; a `logs` entry is stored whenever present. Keys outside the
/// known set are ignored. The whole batch is one transaction; on any
/// failure nothing is committed and the error comes back wrapped as
/// `PropertyCapture` for the adapter to report.
///
/// Returns the number of properties written.
pub fn capture(store: &Store, test_id: i64, metadata: &BTreeMap<String, Artifact>) -> Result<usize> {
    let pairs = collect_pairs(metadata).map_err(|e| wrap(test_id, e))?;
    if pairs.is_empty() {
        return Ok(0);
    }
    store
        .insert_properties(test_id, &pairs)
        .map_err(|e| wrap(test_id, e))?;
    Ok(pairs.len())
}

fn collect_pairs(metadata: &BTreeMap<String, Artifact>) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    for key in [STDOUT_KEY, STDERR_KEY] {
        match metadata.get(key) {
            Some(Artifact::Text(text)) => {
                if !text.is_empty() {
                    pairs.push((key.to_owned(), text.clone()));
                }
            }
            Some(Artifact::Lines(_)) => {
                return Err(RecorderError::UnsupportedArtifact {
                    key: key.to_owned(),
                })
            }
            None => {}
        }
    }

    match metadata.get(LOGS_KEY) {
        Some(Artifact::Lines(lines)) => {
            pairs.push((LOGS_KEY.to_owned(), lines.join("\n")));
        }
        Some(Artifact::Text(_)) => {
            return Err(RecorderError::UnsupportedArtifact {
                key: LOGS_KEY.to_owned(),
            })
        }
        None => {}
    }

    Ok(pairs)
}

fn wrap(test_id: i64, source: RecorderError) -> RecorderError {
    match source {
        already @ RecorderError::PropertyCapture { .. } => already,
        other => RecorderError::PropertyCapture {
            id: test_id,
            source: Box::new(other),
        },
    }
}

use std::path::PathBuf;

/// Error taxonomy for the recording engine.
///
/// Run- and record-level storage failures propagate to the caller; property
/// capture failures are recovered by the event adapter (see
/// `recorder::Recorder`), so a lost artifact never aborts a run.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// The backing database could not be opened or created.
    #[error("cannot open result store at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// An operation referenced a run id with no matching row.
    #[error("no run with id {0}")]
    UnknownRun(String),

    /// An operation referenced a test record id with no matching row.
    #[error("no test record with id {0}")]
    UnknownTest(i64),

    /// A second outcome was delivered for a record that already has one.
    #[error("test record {0} already has a recorded outcome")]
    AlreadyCompleted(i64),

    /// A property was written twice for the same (record, key) pair.
    #[error("property {key:?} already captured for test record {id}")]
    DuplicatePropertyKey { id: i64, key: String },

    /// A known metadata key carried an artifact of the wrong shape.
    #[error("artifact under key {key:?} has an unsupported shape")]
    UnsupportedArtifact { key: String },

    /// Property capture failed as a whole; the batch was rolled back.
    #[error("property capture failed for test record {id}: {source}")]
    PropertyCapture {
        id: i64,
        #[source]
        source: Box<RecorderError>,
    },

    /// An event arrived in an order the recording contract does not allow.
    #[error("event out of order: {0}")]
    OutOfOrder(&'static str),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, RecorderError>;

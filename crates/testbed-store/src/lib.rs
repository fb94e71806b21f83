//! Snapshot persistence: one pretty-printed JSON document per harvest run.

pub mod snapshot;

pub use snapshot::{read_snapshot, write_records, write_snapshot, SNAPSHOT_SOURCE};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid snapshot path {0}: no file name")]
    InvalidPath(String),
}

//! Atomic snapshot writes and reads.
//!
//! The document is serialized into a temporary file in the destination's
//! directory, flushed to disk, then renamed over the destination. A failure at
//! any step leaves the previous artifact (or its absence) untouched.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use testbed_core::{Question, Snapshot};

use crate::SnapshotError;

/// Provenance label written into every harvested snapshot.
pub const SNAPSHOT_SOURCE: &str = "Stack Overflow API";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SnapshotError + '_ {
    move |source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Wraps `questions` in a [`Snapshot`] labelled `source` and writes it to
/// `path`. Returns the snapshot that was committed.
///
/// # Errors
///
/// See [`write_snapshot`].
pub fn write_records(
    path: &Path,
    source: &str,
    questions: Vec<Question>,
) -> Result<Snapshot, SnapshotError> {
    let snapshot = Snapshot::new(source, questions);
    write_snapshot(path, &snapshot)?;
    Ok(snapshot)
}

/// Writes `snapshot` to `path` as pretty-printed UTF-8 JSON, all or nothing.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`SnapshotError::InvalidPath`] if `path` has no file name,
/// [`SnapshotError::Serialize`] if encoding fails, and [`SnapshotError::Io`]
/// for filesystem failures. In every case the destination is left as it was.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    write_json_atomic(path, snapshot)?;
    tracing::info!(
        path = %path.display(),
        count = snapshot.count,
        source = %snapshot.source,
        "snapshot written"
    );
    Ok(())
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), SnapshotError> {
    if path.file_name().is_none() {
        return Err(SnapshotError::InvalidPath(path.display().to_string()));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_error(dir))?;

    let tmp = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, value).map_err(SnapshotError::Serialize)?;
        writer.write_all(b"\n").map_err(io_error(tmp.path()))?;
        writer.flush().map_err(io_error(tmp.path()))?;
    }
    tmp.as_file().sync_all().map_err(io_error(tmp.path()))?;
    tmp.persist(path).map_err(|e| io_error(path)(e.error))?;
    Ok(())
}

/// Reads a snapshot previously written by [`write_snapshot`].
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the file cannot be opened and
/// [`SnapshotError::Parse`] if it is not a valid snapshot document.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let file = File::open(path).map_err(io_error(path))?;
    let snapshot: Snapshot =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SnapshotError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    if snapshot.count != snapshot.questions.len() {
        tracing::warn!(
            path = %path.display(),
            count = snapshot.count,
            questions = snapshot.questions.len(),
            "snapshot count does not match its question list"
        );
    }
    Ok(snapshot)
}

//! Writes the firefly artifact to disk

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::FireflyRecord;

/// File name of the artifact inside the output directory
pub const FIREFLY_FILE_NAME: &str = "firefly.json";

/// Errors that can occur when writing the artifact
#[derive(Debug, Error)]
pub enum OutputError {
    /// Directory creation or file write failed
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The records could not be serialized
    #[error("Failed to serialize firefly data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes `records` to `<output_dir>/firefly.json`, creating the directory
///
/// The file is overwritten in place; an interrupted write can leave it
/// truncated.
pub fn write_firefly(output_dir: &Path, records: &[FireflyRecord]) -> Result<PathBuf, OutputError> {
    let path = output_dir.join(FIREFLY_FILE_NAME);
    let json = serde_json::to_string(records)?;

    fs::create_dir_all(output_dir).map_err(|source| OutputError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| OutputError::Io {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), records = records.len(), "wrote firefly data");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firefly::{FireflyMeta, FireflyTrack};
    use tempfile::TempDir;

    fn record(color: &str, points: Vec<[f64; 2]>) -> FireflyRecord {
        FireflyRecord {
            meta: FireflyMeta {
                color: color.to_string(),
            },
            tracks: vec![FireflyTrack {
                canvas_polyline: points,
            }],
        }
    }

    #[test]
    fn test_write_creates_output_dir_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("output");

        let path = write_firefly(&out, &[record("fff", vec![[1.0, 2.0]])]).unwrap();

        assert_eq!(path, out.join("firefly.json"));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            serde_json::json!([{"meta": {"color": "fff"}, "tracks": [{"canvas_polyline": [[1.0, 2.0]]}]}])
        );
    }

    #[test]
    fn test_write_empty_result_is_empty_array() {
        let temp_dir = TempDir::new().unwrap();

        let path = write_firefly(temp_dir.path(), &[]).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn test_write_replaces_previous_output() {
        let temp_dir = TempDir::new().unwrap();
        write_firefly(temp_dir.path(), &[record("777", vec![]), record("777", vec![])]).unwrap();

        let path = write_firefly(temp_dir.path(), &[record("abc", vec![])]).unwrap();

        let written: Vec<FireflyRecord> =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, vec![record("abc", vec![])]);
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let result = write_firefly(&blocker, &[]);

        assert!(matches!(result, Err(OutputError::Io { .. })));
    }
}

//! Reading and writing artifact files.
//!
//! Artifacts are JSON unless the file name ends in `.msgpack`, in which case
//! they are MessagePack with named fields.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rmp_serde::{decode::from_read, encode::write_named};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ChurnError, Result};

fn is_msgpack(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "msgpack")
}

/// Loads a mandatory artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| ChurnError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let parsed = if is_msgpack(path) {
        from_read(reader).map_err(|e| e.to_string())
    } else {
        serde_json::from_reader(reader).map_err(|e| e.to_string())
    };

    let value = parsed.map_err(|reason| ChurnError::ArtifactFormat {
        path: path.to_path_buf(),
        reason,
    })?;
    tracing::debug!(path = %path.display(), "loaded artifact");
    Ok(value)
}

/// Loads an artifact that may legitimately be absent.
pub fn read_optional_artifact<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let present = path.try_exists().map_err(|source| ChurnError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    if !present {
        tracing::debug!(path = %path.display(), "optional artifact not present");
        return Ok(None);
    }
    read_artifact(path).map(Some)
}

/// Writes an artifact in the format its extension selects.
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let write_err = |reason: String| ChurnError::ArtifactWrite {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
    let mut writer = BufWriter::new(file);

    if is_msgpack(path) {
        write_named(&mut writer, value).map_err(|e| write_err(e.to_string()))?;
    } else {
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| write_err(e.to_string()))?;
        writeln!(writer).map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn json_and_msgpack_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut value = BTreeMap::new();
        value.insert("Contract".to_string(), vec!["Month-to-month", "One year"]);

        for name in ["encoders.json", "encoders.msgpack"] {
            let path = dir.path().join(name);
            write_artifact(&path, &value).unwrap();
            let back: BTreeMap<String, Vec<String>> = read_artifact(&path).unwrap();
            assert_eq!(back["Contract"], vec!["Month-to-month", "One year"]);
        }
    }

    #[test]
    fn missing_optional_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<Vec<String>> =
            read_optional_artifact(&dir.path().join("features.json")).unwrap();
        assert!(value.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_optional_location_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("artifacts");
        std::fs::write(&file, "").unwrap();

        // a path below a regular file cannot be inspected
        let err = read_optional_artifact::<Vec<String>>(&file.join("features.json")).unwrap_err();
        assert!(matches!(err, ChurnError::ArtifactIo { .. }));
    }

    #[test]
    fn missing_mandatory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_artifact::<Vec<String>>(&dir.path().join("model.json")).unwrap_err();
        assert!(matches!(err, ChurnError::ArtifactIo { .. }));
    }

    #[test]
    fn malformed_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_artifact::<Vec<String>>(&path).unwrap_err();
        assert!(matches!(err, ChurnError::ArtifactFormat { .. }));
    }
}

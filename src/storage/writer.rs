//! Artifact writer

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::fingerprint::ARTIFACT_EXTENSION;
use crate::{FlowscribeError, Result};

/// Writes records under `{root}/{host}/`
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer for an existing capture root
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Capture root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the directory for `host` exists and return it
    ///
    /// Safe to call concurrently for the same host.
    ///
    /// # Errors
    ///
    /// Returns error if the host is not a usable directory name or the
    /// directory cannot be created
    pub fn host_dir(&self, host: &str) -> Result<PathBuf> {
        validate_host_segment(host)?;

        let dir = self.root.join(host);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write `record` as indented JSON to `{root}/{host}/{name}.json`
    ///
    /// An existing file with the same name is replaced.
    ///
    /// # Errors
    ///
    /// Returns error if serialization, directory creation or the write fails
    pub fn write<T: Serialize>(&self, host: &str, name: &str, record: &T) -> Result<PathBuf> {
        let data = serde_json::to_vec_pretty(record)?;

        let path = self
            .host_dir(host)?
            .join(format!("{name}.{ARTIFACT_EXTENSION}"));
        fs::write(&path, data)?;

        Ok(path)
    }
}

/// Validate a host before using it as a directory name
///
/// # Errors
///
/// Returns error if the host could escape the capture root
fn validate_host_segment(host: &str) -> Result<()> {
    if host.is_empty() {
        return Err(FlowscribeError::InvalidUrl(
            "Host cannot be empty".to_string(),
        ));
    }

    if host == "." || host == ".." {
        return Err(FlowscribeError::InvalidUrl(format!(
            "Host cannot be '{host}'"
        )));
    }

    if host.contains('/') || host.contains('\\') {
        return Err(FlowscribeError::InvalidUrl(format!(
            "Host cannot contain path separators: {host}"
        )));
    }

    if host.contains('\0') {
        return Err(FlowscribeError::InvalidUrl(
            "Host cannot contain null bytes".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_host_dir_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());

        let first = writer.host_dir("example.com").unwrap();
        let second = writer.host_dir("example.com").unwrap();

        assert_eq!(first, second);
        assert!(first.is_dir());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_pretty_json() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());

        let path = writer
            .write("example.com:8080", "20240101_000000_abcd1234", &json!({"method": "GET"}))
            .unwrap();

        assert_eq!(
            path,
            temp_dir
                .path()
                .join("example.com:8080")
                .join("20240101_000000_abcd1234.json")
        );
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"method\": \"GET\"\n}");
    }

    #[test]
    fn test_write_same_name_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());

        writer.write("example.com", "n", &json!({"v": 1})).unwrap();
        let path = writer.write("example.com", "n", &json!({"v": 2})).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(value["v"], 2);
    }

    #[test]
    fn test_write_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let writer = ArtifactWriter::new(&blocker);
        let result = writer.write("example.com", "n", &json!({}));

        assert!(matches!(result, Err(FlowscribeError::Io(_))));
    }

    #[test]
    fn test_validate_host_segment() {
        assert!(validate_host_segment("example.com").is_ok());
        assert!(validate_host_segment("127.0.0.1:8080").is_ok());
        assert!(validate_host_segment("[::1]:443").is_ok());

        assert!(validate_host_segment("").is_err());
        assert!(validate_host_segment(".").is_err());
        assert!(validate_host_segment("..").is_err());
        assert!(validate_host_segment("a/b").is_err());
        assert!(validate_host_segment("a\\b").is_err());
        assert!(validate_host_segment("a\0b").is_err());
    }
}

//! Artifact discovery and loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::fingerprint::{ArtifactKind, ARTIFACT_EXTENSION};
use crate::record::{RequestRecord, ResponseRecord, StoredRecord};
use crate::{FlowscribeError, Result};

/// One artifact file found under a host directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// Path of the artifact file
    pub path: PathBuf,
    /// Request or response, from the file name
    pub kind: ArtifactKind,
}

/// Artifact counts for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSummary {
    /// Host directory name
    pub host: String,
    /// Number of request artifacts
    pub requests: usize,
    /// Number of response artifacts
    pub responses: usize,
}

/// Reader over an existing capture root
#[derive(Debug, Clone)]
pub struct ArtifactReader {
    root: PathBuf,
}

impl ArtifactReader {
    /// Open a capture root
    ///
    /// # Errors
    ///
    /// Returns error if `root` is not a directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(FlowscribeError::InvalidArtifact(format!(
                "Capture root is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Capture root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host directories, sorted by name
    ///
    /// # Errors
    ///
    /// Returns error if the root cannot be listed
    pub fn hosts(&self) -> Result<Vec<String>> {
        let mut hosts = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                hosts.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        hosts.sort();
        Ok(hosts)
    }

    /// Artifacts of one host in capture order
    ///
    /// Files without the artifact extension are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the host directory cannot be listed
    pub fn artifacts(&self, host: &str) -> Result<Vec<ArtifactEntry>> {
        let mut artifacts = Vec::new();
        for entry in fs::read_dir(self.root.join(host))? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ARTIFACT_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let kind = ArtifactKind::from_stem(stem);
            artifacts.push(ArtifactEntry { path, kind });
        }
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(artifacts)
    }

    /// Request and response counts per host
    ///
    /// # Errors
    ///
    /// Returns error if any directory cannot be listed
    pub fn summary(&self) -> Result<Vec<HostSummary>> {
        self.hosts()?
            .into_iter()
            .map(|host| {
                let artifacts = self.artifacts(&host)?;
                let responses = artifacts
                    .iter()
                    .filter(|a| a.kind == ArtifactKind::Response)
                    .count();
                Ok(HostSummary {
                    requests: artifacts.len() - responses,
                    responses,
                    host,
                })
            })
            .collect()
    }

    /// Load one artifact file
    ///
    /// The record shape is chosen from the file name suffix.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or does not hold a record of
    /// the expected kind
    pub fn load(path: &Path) -> Result<StoredRecord> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                FlowscribeError::InvalidArtifact(format!("No file name: {}", path.display()))
            })?;
        let data = fs::read(path)?;

        let record = match ArtifactKind::from_stem(stem) {
            ArtifactKind::Request => {
                serde_json::from_slice::<RequestRecord>(&data).map(StoredRecord::Request)
            }
            ArtifactKind::Response => {
                serde_json::from_slice::<ResponseRecord>(&data).map(StoredRecord::Response)
            }
        };

        record.map_err(|e| FlowscribeError::InvalidArtifact(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArtifactWriter;
    use serde_json::json;
    use tempfile::TempDir;

    fn request_json(url: &str) -> serde_json::Value {
        json!({
            "timestamp": 1.5,
            "method": "GET",
            "url": url,
            "path": "/",
            "query": {},
            "headers": {},
            "cookies": {},
            "content": null
        })
    }

    #[test]
    fn test_open_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        assert!(ArtifactReader::open(temp_dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_hosts_and_artifacts_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());
        writer.write("b.example", "20240101_000002_bbbbbbbb", &request_json("http://b.example/")).unwrap();
        writer.write("a.example", "20240101_000002_aaaaaaaa", &request_json("http://a.example/")).unwrap();
        writer.write("a.example", "20240101_000001_aaaaaaaa", &request_json("http://a.example/")).unwrap();
        fs::write(temp_dir.path().join("a.example").join("notes.txt"), b"x").unwrap();

        let reader = ArtifactReader::open(temp_dir.path()).unwrap();
        assert_eq!(reader.hosts().unwrap(), vec!["a.example", "b.example"]);

        let names: Vec<_> = reader
            .artifacts("a.example")
            .unwrap()
            .into_iter()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["20240101_000001_aaaaaaaa.json", "20240101_000002_aaaaaaaa.json"]
        );
    }

    #[test]
    fn test_load_request_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());
        let path = writer
            .write("example.com", "20240101_000000_abcd1234", &request_json("http://example.com/"))
            .unwrap();

        let record = ArtifactReader::load(&path).unwrap();
        assert_eq!(record.kind(), ArtifactKind::Request);
        assert_eq!(record.url(), "http://example.com/");
        assert_eq!(record.method(), "GET");
    }

    #[test]
    fn test_load_kind_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());
        let path = writer
            .write(
                "example.com",
                "20240101_000000_abcd1234_response",
                &request_json("http://example.com/"),
            )
            .unwrap();

        assert!(matches!(
            ArtifactReader::load(&path),
            Err(FlowscribeError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_summary_counts() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());
        writer.write("example.com", "1_aaaaaaaa", &request_json("http://example.com/")).unwrap();
        writer.write("example.com", "1_aaaaaaaa_response", &json!({})).unwrap();
        writer.write("example.com", "2_bbbbbbbb", &request_json("http://example.com/")).unwrap();

        let reader = ArtifactReader::open(temp_dir.path()).unwrap();
        assert_eq!(
            reader.summary().unwrap(),
            vec![HostSummary {
                host: "example.com".to_string(),
                requests: 2,
                responses: 1,
            }]
        );
    }
}

//! Capture session and its two event handlers

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::config::CaptureConfig;
use crate::fingerprint::{artifact_name, ArtifactKind};
use crate::record::{RequestRecord, ResponseRecord};
use crate::storage::{capture_root_name, ArtifactWriter};
use crate::transaction::Transaction;
use crate::{FlowscribeError, Result};

/// Snapshot of session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Request artifacts written
    pub requests: usize,
    /// Response artifacts written
    pub responses: usize,
    /// Transactions that could not be captured
    pub failures: usize,
}

/// Writes every observed transaction under one capture root
///
/// The root is fixed at construction. Handlers take `&self` and may run
/// concurrently from any number of connection tasks.
pub struct CaptureSession {
    writer: ArtifactWriter,
    requests: AtomicUsize,
    responses: AtomicUsize,
    failures: AtomicUsize,
}

impl CaptureSession {
    /// Create a session rooted at `{output_dir}/{prefix}_{epoch_seconds}`
    ///
    /// # Errors
    ///
    /// Returns error if the root directory cannot be created
    pub fn create(output_dir: &Path, prefix: &str) -> Result<Self> {
        Self::create_at(output_dir, prefix, &Local::now())
    }

    /// Create a session whose root name is derived from `started`
    ///
    /// # Errors
    ///
    /// Returns error if the root directory cannot be created
    pub fn create_at(output_dir: &Path, prefix: &str, started: &DateTime<Local>) -> Result<Self> {
        let root = output_dir.join(capture_root_name(prefix, started.timestamp()));
        fs::create_dir_all(&root)?;

        info!("Capturing transactions to {}", root.display());

        Ok(Self {
            writer: ArtifactWriter::new(root),
            requests: AtomicUsize::new(0),
            responses: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        })
    }

    /// Create a session from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the root directory cannot be created
    pub fn from_config(config: &CaptureConfig) -> Result<Self> {
        Self::create(&config.output_dir, &config.dir_prefix)
    }

    /// Capture root directory
    pub fn root(&self) -> &Path {
        self.writer.root()
    }

    /// Handle a request-observed event
    ///
    /// Stamps the capture instant on the transaction and writes the request
    /// artifact. Failures are logged and counted, never returned.
    pub fn on_request_observed(&self, transaction: &mut Transaction) {
        let result = self.capture_request_at(transaction, Local::now());
        self.report(transaction, ArtifactKind::Request, result);
    }

    /// Handle a response-observed event
    ///
    /// Writes the response artifact, including the request side of the same
    /// transaction. Failures are logged and counted, never returned.
    pub fn on_response_observed(&self, transaction: &Transaction) {
        let result = self.capture_response_at(transaction, Local::now());
        self.report(transaction, ArtifactKind::Response, result);
    }

    /// Stamp `transaction` with `now` and write its request artifact
    ///
    /// # Errors
    ///
    /// Returns error if the artifact cannot be written
    pub fn capture_request_at(
        &self,
        transaction: &mut Transaction,
        now: DateTime<Local>,
    ) -> Result<PathBuf> {
        transaction.stamp_capture(now);

        let request = transaction.request();
        let record = RequestRecord::build(request, &now);
        let name = artifact_name(request.url(), &now, ArtifactKind::Request);

        self.writer.write(request.host(), &name, &record)
    }

    /// Write the response artifact of `transaction` captured at `now`
    ///
    /// # Errors
    ///
    /// Returns error if no response is attached or the artifact cannot be
    /// written
    pub fn capture_response_at(
        &self,
        transaction: &Transaction,
        now: DateTime<Local>,
    ) -> Result<PathBuf> {
        let request = transaction.request();
        let response = transaction
            .response()
            .ok_or_else(|| FlowscribeError::MissingResponse(request.url().to_string()))?;

        let record = ResponseRecord::build(
            request,
            transaction.captured_at().as_ref(),
            response,
            &now,
        );
        let name = artifact_name(request.url(), &now, ArtifactKind::Response);

        self.writer.write(request.host(), &name, &record)
    }

    /// Current counters
    pub fn stats(&self) -> CaptureStats {
        CaptureStats {
            requests: self.requests.load(Ordering::Relaxed),
            responses: self.responses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn report(&self, transaction: &Transaction, kind: ArtifactKind, result: Result<PathBuf>) {
        let url = transaction.request().url();
        match result {
            Ok(path) => {
                let counter = match kind {
                    ArtifactKind::Request => &self.requests,
                    ArtifactKind::Response => &self.responses,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                debug!("Captured {:?} for {}: {}", kind, url, path.display());
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!("Capture of {:?} for {} failed: {}", kind, url, e);
            }
        }
    }
}

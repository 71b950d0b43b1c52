//! On-disk layout of captured artifacts
//!
//! ```text
//! {root}/
//!   {host}/
//!     {YYYYMMDD_HHMMSS}_{fingerprint}.json
//!     {YYYYMMDD_HHMMSS}_{fingerprint}_response.json
//! ```

mod reader;
mod writer;

pub use reader::{ArtifactEntry, ArtifactReader, HostSummary};
pub use writer::ArtifactWriter;

/// Default prefix of the capture root directory name
pub const DEFAULT_DIR_PREFIX: &str = "mitm_logs";

/// Name of a capture root started at `epoch_secs`
#[must_use]
pub fn capture_root_name(prefix: &str, epoch_secs: i64) -> String {
    format!("{prefix}_{epoch_secs}")
}

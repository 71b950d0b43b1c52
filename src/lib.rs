//! Flowscribe - capture intercepted HTTP traffic as JSON artifacts
//!
//! Every request and response observed by a man-in-the-middle engine is
//! written to `{root}/{host}/{YYYYMMDD_HHMMSS}_{fingerprint}[_response].json`.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_precision_loss,
    clippy::multiple_crate_versions
)]

pub mod capture;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod record;
pub mod storage;
pub mod transaction;

pub use capture::{CaptureSession, CaptureStats, FlowObserver};
pub use error::{FlowscribeError, Result};
pub use transaction::{Transaction, TransactionRequest, TransactionResponse};

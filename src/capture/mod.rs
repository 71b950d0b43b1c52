//! Capture session bound to the interception engine's lifecycle

mod observer;
mod session;

pub use observer::FlowObserver;
pub use session::{CaptureSession, CaptureStats};

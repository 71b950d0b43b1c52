//! Hook interface the interception engine drives

use crate::transaction::Transaction;

use super::CaptureSession;

/// Observer notified for every intercepted transaction
///
/// Implementations must not fail the engine: errors are handled internally.
pub trait FlowObserver: Send + Sync {
    /// A request was intercepted; the observer may stamp the transaction
    fn request(&self, transaction: &mut Transaction);

    /// The upstream response for `transaction` arrived
    fn response(&self, transaction: &Transaction);
}

impl FlowObserver for CaptureSession {
    fn request(&self, transaction: &mut Transaction) {
        self.on_request_observed(transaction);
    }

    fn response(&self, transaction: &Transaction) {
        self.on_response_observed(transaction);
    }
}

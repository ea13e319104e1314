//! Notifier doubles.

use futures::future::BoxFuture;
use gatepass_core::notify::{ConfirmationNotice, Notifier, NotifyError};
use std::sync::{Arc, Mutex};

/// Records every notice it is asked to deliver.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<ConfirmationNotice>>>,
}

impl RecordingNotifier {
    /// Create a new recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<ConfirmationNotice> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_confirmed(&self, notice: ConfirmationNotice) -> BoxFuture<'_, Result<(), NotifyError>> {
        Box::pin(async move {
            self.sent
                .lock()
                .map_err(|_| NotifyError::DeliveryFailed {
                    reason: "recorder lock poisoned".to_string(),
                })?
                .push(notice);
            Ok(())
        })
    }
}

/// Fails every delivery with a fixed reason.
#[derive(Clone, Debug)]
pub struct FailingNotifier {
    reason: String,
}

impl FailingNotifier {
    /// Create a notifier that always fails with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Notifier for FailingNotifier {
    fn notify_confirmed(&self, _notice: ConfirmationNotice) -> BoxFuture<'_, Result<(), NotifyError>> {
        let reason = self.reason.clone();
        Box::pin(async move { Err(NotifyError::DeliveryFailed { reason }) })
    }
}

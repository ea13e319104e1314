//! Console notifier for development.
//!
//! Logs each confirmation notice instead of sending it. Used when
//! notifications are enabled but no mail transport is wired in.

use futures::future::BoxFuture;
use gatepass_core::notify::{ConfirmationNotice, Notifier, NotifyError};

/// Logs confirmation notices through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn notify_confirmed(&self, notice: ConfirmationNotice) -> BoxFuture<'_, Result<(), NotifyError>> {
        Box::pin(async move {
            tracing::info!(
                identity = %notice.identity,
                holder = %notice.holder_name,
                code_bytes = notice.rendered_code.as_bytes().len(),
                "📧 Payment confirmed, entry code delivered"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use gatepass_core::{Identity, RenderedCode};

    #[tokio::test]
    async fn console_delivery_succeeds() {
        let notice = ConfirmationNotice {
            identity: Identity::new("a@x.com"),
            holder_name: "Asha".to_string(),
            rendered_code: RenderedCode::from_png(vec![0x89, b'P', b'N', b'G']),
        };

        ConsoleNotifier::new().notify_confirmed(notice).await.unwrap();
    }
}

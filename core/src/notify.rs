//! Outbound notification seam.
//!
//! Delivery itself (email transport, templates) lives outside the core.
//! The core only hands over who to notify and the rendered code, and never
//! lets a delivery failure touch store state.

use crate::render::RenderedCode;
use crate::types::Identity;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Payload handed to the delivery collaborator after payment confirmation.
#[derive(Clone, Debug)]
pub struct ConfirmationNotice {
    /// Identity (email) to deliver to
    pub identity: Identity,
    /// Holder name for the greeting
    pub holder_name: String,
    /// Entry code to attach
    pub rendered_code: RenderedCode,
}

/// Delivery failure reported by a notifier.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// Delivery is switched off in configuration
    #[error("Notifications are disabled")]
    Disabled,
    /// The provider rejected or failed the delivery
    #[error("Delivery failed: {reason}")]
    DeliveryFailed {
        /// Provider-reported reason
        reason: String,
    },
}

/// Notification delivery collaborator.
///
/// Object-safe so the application can choose a provider at startup and
/// share it as `Arc<dyn Notifier>`.
pub trait Notifier: Send + Sync {
    /// Deliver a payment confirmation with the holder's entry code.
    ///
    /// # Errors
    ///
    /// Returns error if delivery is disabled or fails.
    fn notify_confirmed(&self, notice: ConfirmationNotice) -> BoxFuture<'_, Result<(), NotifyError>>;
}

/// Notifier used when delivery is not configured.
#[derive(Clone, Debug, Default)]
pub struct DisabledNotifier;

impl DisabledNotifier {
    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn Notifier> {
        Arc::new(Self)
    }
}

impl Notifier for DisabledNotifier {
    fn notify_confirmed(&self, _notice: ConfirmationNotice) -> BoxFuture<'_, Result<(), NotifyError>> {
        Box::pin(async { Err(NotifyError::Disabled) })
    }
}

/// Outcome of the notification step, reported alongside a confirmation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationStatus {
    /// The notifier accepted the delivery
    Delivered,
    /// Delivery is not configured
    Disabled,
    /// Delivery failed; payment remains confirmed
    Failed {
        /// Failure reason
        reason: String,
    },
}

impl From<Result<(), NotifyError>> for NotificationStatus {
    fn from(result: Result<(), NotifyError>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(NotifyError::Disabled) => Self::Disabled,
            Err(NotifyError::DeliveryFailed { reason }) => Self::Failed { reason },
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => f.write_str("delivered"),
            Self::Disabled => f.write_str("disabled"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

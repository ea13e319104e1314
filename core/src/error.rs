//! Error taxonomy for the credential lifecycle.

use crate::types::{HolderSummary, Identity};
use thiserror::Error;

/// Result type alias for credential lifecycle operations.
pub type Result<T> = std::result::Result<T, GatePassError>;

/// Every failure the core can report.
///
/// `Config` is fatal and raised at startup. Everything else is request-scoped
/// and carries enough context for the caller to show a specific message.
/// Successful check-in outcomes are not errors; see
/// [`crate::services::CheckInOutcome`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatePassError {
    // ═══════════════════════════════════════════════════════════
    // Startup
    // ═══════════════════════════════════════════════════════════

    /// Required configuration is missing or unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    // ═══════════════════════════════════════════════════════════
    // Request validation
    // ═══════════════════════════════════════════════════════════

    /// Request input failed validation.
    #[error("Invalid request: {reason}")]
    Validation {
        /// What was wrong with the input
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Uniqueness
    // ═══════════════════════════════════════════════════════════

    /// A registration with this identity already exists.
    #[error("Identity {identity} is already registered")]
    DuplicateIdentity {
        /// Conflicting identity
        identity: Identity,
    },

    /// The payment reference is already bound to a registration.
    #[error("Payment reference {reference} has already been used")]
    DuplicateReference {
        /// Conflicting reference
        reference: String,
    },

    /// The registration was already confirmed under another reference.
    #[error("Payment for {identity} is already confirmed")]
    PaymentAlreadyConfirmed {
        /// Identity whose payment is confirmed
        identity: Identity,
    },

    // ═══════════════════════════════════════════════════════════
    // Door
    // ═══════════════════════════════════════════════════════════

    /// The presented credential is forged, altered, expired or malformed.
    #[error("Invalid credential")]
    InvalidCredential,

    /// No registration exists for the identity.
    #[error("No registration found for {identity}")]
    NotFound {
        /// Identity that was looked up
        identity: Identity,
    },

    /// The holder has not paid; staff should redirect them to payment.
    #[error("Payment required for {}", holder.identity)]
    PaymentRequired {
        /// Holder display info
        holder: Box<HolderSummary>,
    },

    // ═══════════════════════════════════════════════════════════
    // System
    // ═══════════════════════════════════════════════════════════

    /// Rendering the scannable code failed.
    #[error("Rendering error: {0}")]
    Rendering(String),

    /// The registration store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl GatePassError {
    /// Build a validation error.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Build a payment-required error from holder info.
    #[must_use]
    pub fn payment_required(holder: HolderSummary) -> Self {
        Self::PaymentRequired {
            holder: Box::new(holder),
        }
    }

    /// Returns `true` if the caller can fix this by changing the request.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gatepass_core::GatePassError;
    /// assert!(GatePassError::InvalidCredential.is_user_error());
    /// assert!(!GatePassError::Storage("down".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::Config(_) | Self::Rendering(_) | Self::Storage(_)
        )
    }

    /// Returns `true` if this error is a uniqueness or state conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateIdentity { .. }
                | Self::DuplicateReference { .. }
                | Self::PaymentAlreadyConfirmed { .. }
        )
    }
}

//! Payment confirmation: bind an external payment reference to a pending
//! registration.
//!
//! The reference is the only thing stopping one successful payment from
//! being replayed against several registrations, so the store checks and
//! reserves it atomically against every registration, not just the one
//! being confirmed.

use crate::environment::Clock;
use crate::error::{GatePassError, Result};
use crate::notify::{ConfirmationNotice, NotificationStatus, Notifier, NotifyError};
use crate::store::RegistrationStore;
use crate::types::{Identity, Registration};
use std::sync::Arc;

/// Longest payment reference accepted.
pub const MAX_REFERENCE_LEN: usize = 128;

/// Result of a successful confirmation.
#[derive(Clone, Debug)]
pub struct PaymentConfirmation {
    /// The registration, now paid
    pub registration: Registration,
    /// What happened to the confirmation notice
    pub notification: NotificationStatus,
}

/// Confirms payments and triggers the confirmation notice.
pub struct PaymentConfirmationService<S> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for PaymentConfirmationService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: RegistrationStore> PaymentConfirmationService<S> {
    /// Create a new payment confirmation service.
    #[must_use]
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// Bind `reference` to `identity` and mark it paid.
    ///
    /// The notice is sent only after the store write succeeded. A failed
    /// notice is logged and reported in
    /// [`PaymentConfirmation::notification`]; the confirmation stands.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the reference is blank or too long (`Validation`)
    /// - the identity is unknown (`NotFound`)
    /// - the reference is already bound (`DuplicateReference`)
    /// - the registration is already paid (`PaymentAlreadyConfirmed`)
    /// - the store fails (`Storage`)
    #[tracing::instrument(skip_all, fields(identity = %identity))]
    pub async fn confirm(&self, identity: &Identity, reference: &str) -> Result<PaymentConfirmation> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(GatePassError::validation("payment reference is required"));
        }
        if reference.len() > MAX_REFERENCE_LEN {
            return Err(GatePassError::validation(format!(
                "payment reference must be at most {MAX_REFERENCE_LEN} characters"
            )));
        }

        let registration = self
            .store
            .confirm_payment(identity, reference, self.clock.now())
            .await?;

        tracing::info!(reference, "Payment confirmed");

        let notice = ConfirmationNotice {
            identity: registration.identity.clone(),
            holder_name: registration.holder_name.clone(),
            rendered_code: registration.rendered_code.clone(),
        };

        let delivery = self.notifier.notify_confirmed(notice).await;
        match &delivery {
            Ok(()) => tracing::debug!("Confirmation notice delivered"),
            Err(NotifyError::Disabled) => tracing::debug!("Confirmation notice skipped"),
            Err(e) => tracing::warn!(error = %e, "Confirmation notice failed; payment stays confirmed"),
        }

        Ok(PaymentConfirmation {
            registration,
            notification: delivery.into(),
        })
    }
}

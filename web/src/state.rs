//! Application state for Axum handlers.

use gatepass_core::{
    CheckInService, Clock, CredentialCodec, IssuanceService, Notifier, PaymentConfirmationService,
    RegistrationStore,
};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Generic over the registration store so the same router serves
/// `PostgreSQL` in production and the in-memory store in tests. Cloned
/// (cheaply via `Arc`) for each request.
pub struct AppState<S> {
    /// Issues registrations for purchases
    pub issuance: IssuanceService<S>,
    /// Confirms payments
    pub payments: PaymentConfirmationService<S>,
    /// Checks holders in at the door
    pub checkin: CheckInService<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            issuance: self.issuance.clone(),
            payments: self.payments.clone(),
            checkin: self.checkin.clone(),
        }
    }
}

impl<S: RegistrationStore> AppState<S> {
    /// Wire the three services around one store.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        codec: Arc<CredentialCodec>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuance: IssuanceService::new(Arc::clone(&store), Arc::clone(&codec), Arc::clone(&clock)),
            payments: PaymentConfirmationService::new(Arc::clone(&store), notifier, Arc::clone(&clock)),
            checkin: CheckInService::new(store, codec, clock),
        }
    }
}

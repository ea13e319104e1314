//! Check-in at the door.
//!
//! ```text
//!   Unpaid ──confirm_payment──▶ PaidNotEntered ──mark_checked_in──▶ PaidEntered
//! ```
//!
//! `PaidEntered` is terminal. The first scan to win the store's atomic
//! update is `Admitted`; every later scan of the same credential is
//! `AlreadyCheckedIn`.

use crate::credential::CredentialCodec;
use crate::environment::Clock;
use crate::error::{GatePassError, Result};
use crate::store::RegistrationStore;
use crate::types::{AdmissionState, HolderSummary};
use serde::Serialize;
use std::sync::Arc;

/// Successful result of a scan. Both variants are legitimate outcomes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "holder", rename_all = "snake_case")]
pub enum CheckInOutcome {
    /// This scan admitted the holder
    Admitted(HolderSummary),
    /// The holder was admitted by an earlier scan
    AlreadyCheckedIn(HolderSummary),
}

impl CheckInOutcome {
    /// Holder display info.
    #[must_use]
    pub const fn holder(&self) -> &HolderSummary {
        match self {
            Self::Admitted(holder) | Self::AlreadyCheckedIn(holder) => holder,
        }
    }

    /// Returns `true` if this scan admitted the holder.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }

    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Admitted(_) => "admitted",
            Self::AlreadyCheckedIn(_) => "already_checked_in",
        }
    }
}

/// Resolves presented credentials and admits holders at most once.
pub struct CheckInService<S> {
    store: Arc<S>,
    codec: Arc<CredentialCodec>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for CheckInService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: RegistrationStore> CheckInService<S> {
    /// Create a new check-in service.
    #[must_use]
    pub fn new(store: Arc<S>, codec: Arc<CredentialCodec>, clock: Arc<dyn Clock>) -> Self {
        Self { store, codec, clock }
    }

    /// Check in the holder of `presented_token`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the token does not verify or has expired (`InvalidCredential`)
    /// - no registration matches (`NotFound`)
    /// - payment is not confirmed (`PaymentRequired`, with holder info)
    /// - the store fails (`Storage`)
    pub async fn check_in(&self, presented_token: &str) -> Result<CheckInOutcome> {
        let identity = self.codec.decode(presented_token).inspect_err(|_| {
            tracing::warn!("Rejected credential at check-in");
        })?;

        let registration = self
            .store
            .find_by_identity(&identity)
            .await?
            .ok_or_else(|| GatePassError::NotFound {
                identity: identity.clone(),
            })?;

        if registration.admission_state() == AdmissionState::Unpaid {
            tracing::info!(identity = %identity, "Check-in refused: payment required");
            return Err(GatePassError::payment_required(registration.holder_summary()));
        }

        let (registration, already) = self
            .store
            .mark_checked_in(&identity, self.clock.now())
            .await?;

        let outcome = if already {
            CheckInOutcome::AlreadyCheckedIn(registration.holder_summary())
        } else {
            CheckInOutcome::Admitted(registration.holder_summary())
        };

        tracing::info!(identity = %identity, outcome = outcome.label(), "Check-in processed");
        Ok(outcome)
    }
}

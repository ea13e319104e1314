//! Payment confirmation endpoint.
//!
//! - POST /api/payments/confirm - Bind a payment reference to a registration
//!
//! The confirmation stands even when the notice cannot be delivered; the
//! response reports what happened to it.

use crate::WebResult;
use crate::error::AppError;
use crate::metrics;
use crate::state::AppState;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use gatepass_core::{Identity, NotificationStatus, RegistrationStore};
use serde::{Deserialize, Serialize};

/// Request to confirm a payment.
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    /// Identity of the registration being paid for
    pub identity: String,
    /// External transaction reference
    pub payment_reference: String,
}

/// Response after confirming a payment.
#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    /// Identity now paid
    pub identity: Identity,
    /// Holder name
    pub holder_name: String,
    /// Reference bound to the registration
    pub payment_reference: String,
    /// When the payment was confirmed
    pub payment_confirmed_at: Option<DateTime<Utc>>,
    /// Delivery status of the confirmation notice
    pub notification: NotificationStatus,
}

/// Confirm a payment.
///
/// # Errors
///
/// - 422 if the identity or reference is malformed
/// - 404 if no registration matches
/// - 409 if the reference is already used or the registration already paid
pub async fn confirm_payment<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> WebResult<Json<ConfirmPaymentResponse>>
where
    S: RegistrationStore + 'static,
{
    let identity: Identity = request
        .identity
        .parse()
        .map_err(|e: gatepass_core::types::ParseIdentityError| AppError::validation(e.to_string()))?;

    let confirmation = state
        .payments
        .confirm(&identity, &request.payment_reference)
        .await
        .inspect_err(metrics::record_payment_rejected)?;

    metrics::record_payment_confirmed();

    let registration = confirmation.registration;
    Ok(Json(ConfirmPaymentResponse {
        identity: registration.identity,
        holder_name: registration.holder_name,
        payment_reference: registration.payment_reference.unwrap_or_default(),
        payment_confirmed_at: registration.payment_confirmed_at,
        notification: confirmation.notification,
    }))
}

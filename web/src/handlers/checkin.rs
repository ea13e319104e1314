//! Door check-in endpoint.
//!
//! - POST /api/checkin - Resolve a scanned credential and admit its holder
//!
//! A repeat scan is a 200 with `outcome: already_checked_in`, not an error.

use crate::WebResult;
use crate::metrics;
use crate::state::AppState;
use axum::{Json, extract::State};
use gatepass_core::{CheckInOutcome, RegistrationStore};
use serde::Deserialize;

/// Request carrying a scanned credential.
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    /// Token decoded from the QR code
    pub token: String,
}

/// Check in the holder of a credential.
///
/// # Errors
///
/// - 400 if the credential is invalid or expired
/// - 404 if it resolves to no registration
/// - 402 if payment is not confirmed (body details carry holder info)
pub async fn check_in<S>(
    State(state): State<AppState<S>>,
    Json(request): Json<CheckInRequest>,
) -> WebResult<Json<CheckInOutcome>>
where
    S: RegistrationStore + 'static,
{
    let outcome = state
        .checkin
        .check_in(request.token.trim())
        .await
        .inspect_err(metrics::record_checkin_refused)?;

    metrics::record_checkin(outcome.label());
    Ok(Json(outcome))
}

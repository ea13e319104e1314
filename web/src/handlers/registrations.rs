//! Registration endpoint.
//!
//! - POST /api/registrations - Issue one pass per admitted person

use crate::error::AppError;
use crate::metrics;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use gatepass_core::{Identity, PassCategory, Purchase, Registration, RegistrationStore};
use serde::Serialize;

// ============================================================================
// Request/Response Types
// ============================================================================

/// One issued pass.
#[derive(Debug, Serialize)]
pub struct IssuedPass {
    /// Identity the credential is bound to
    pub identity: Identity,
    /// Holder name as printed on the pass
    pub holder_name: String,
    /// Pass category
    pub pass_category: PassCategory,
    /// Signed credential token
    pub credential_token: String,
    /// PNG QR code as a `data:` URL
    pub code_data_url: String,
}

impl From<&Registration> for IssuedPass {
    fn from(registration: &Registration) -> Self {
        Self {
            identity: registration.identity.clone(),
            holder_name: registration.holder_name.clone(),
            pass_category: registration.pass_category,
            credential_token: registration.credential_token.as_str().to_string(),
            code_data_url: registration.rendered_code.to_data_url(),
        }
    }
}

/// Response after issuing passes.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    /// Pass category purchased
    pub pass_category: PassCategory,
    /// Number of passes issued
    pub quantity: u32,
    /// Amount due in paise
    pub amount_due_paise: u64,
    /// Amount due, formatted
    pub amount_due: String,
    /// Issued passes, in sibling order
    pub passes: Vec<IssuedPass>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Issue passes for a purchase.
///
/// Passes start unpaid; payment is confirmed separately.
///
/// # Errors
///
/// - 422 if the purchase is invalid
/// - 409 if any derived identity is already registered
pub async fn create_registrations<S>(
    State(state): State<AppState<S>>,
    Json(purchase): Json<Purchase>,
) -> Result<(StatusCode, Json<RegistrationResponse>), AppError>
where
    S: RegistrationStore + 'static,
{
    let pass_category = purchase.pass_category;
    let amount_due = purchase
        .total_amount()
        .ok_or_else(|| AppError::validation("quantity out of range"))?;

    let issued = state.issuance.issue(purchase).await?;
    metrics::record_registrations_issued(issued.len());

    let response = RegistrationResponse {
        pass_category,
        quantity: u32::try_from(issued.len()).unwrap_or(u32::MAX),
        amount_due_paise: amount_due.paise(),
        amount_due: amount_due.to_string(),
        passes: issued.iter().map(IssuedPass::from).collect(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

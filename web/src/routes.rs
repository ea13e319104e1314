//! Router configuration.

use crate::handlers::{checkin, health::health_check, payments, registrations};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use gatepass_core::RegistrationStore;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `GET /health`
/// - `POST /api/registrations`
/// - `POST /api/payments/confirm`
/// - `POST /api/checkin`
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: RegistrationStore + 'static,
{
    let api_routes = Router::new()
        .route("/registrations", post(registrations::create_registrations::<S>))
        .route("/payments/confirm", post(payments::confirm_payment::<S>))
        .route("/checkin", post(checkin::check_in::<S>));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

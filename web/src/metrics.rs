//! Business metrics for GatePass.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `gatepass_registrations_issued_total` - Registrations created by issuance
//! - `gatepass_payments_confirmed_total` - Payments bound to a registration
//! - `gatepass_payment_rejections_total{reason}` - Refused confirmations
//! - `gatepass_checkins_total{outcome}` - Check-in attempts by outcome

use gatepass_core::GatePassError;
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to parse the listen address
    #[error("Invalid metrics address {0}")]
    Address(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the Prometheus exporter with an HTTP listener on `addr` and
/// describe every GatePass metric.
///
/// Must run inside a Tokio runtime.
///
/// # Errors
///
/// Returns error if the address is invalid or a recorder is already installed.
pub fn install_exporter(addr: &str) -> Result<(), MetricsError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|_| MetricsError::Address(addr.to_string()))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_metrics();
    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "gatepass_registrations_issued_total",
        "Total number of registrations created by issuance"
    );
    describe_counter!(
        "gatepass_payments_confirmed_total",
        "Total number of confirmed payments"
    );
    describe_counter!(
        "gatepass_payment_rejections_total",
        "Total number of refused payment confirmations by reason"
    );
    describe_counter!(
        "gatepass_checkins_total",
        "Total number of check-in attempts by outcome"
    );
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record registrations created by one purchase.
pub fn record_registrations_issued(count: usize) {
    metrics::counter!("gatepass_registrations_issued_total").increment(u64::try_from(count).unwrap_or(u64::MAX));
}

/// Record a confirmed payment.
pub fn record_payment_confirmed() {
    metrics::counter!("gatepass_payments_confirmed_total").increment(1);
}

/// Record a refused payment confirmation.
pub fn record_payment_rejected(err: &GatePassError) {
    metrics::counter!("gatepass_payment_rejections_total", "reason" => reason(err)).increment(1);
}

/// Record a check-in attempt by outcome label.
pub fn record_checkin(outcome: &'static str) {
    metrics::counter!("gatepass_checkins_total", "outcome" => outcome).increment(1);
}

/// Record a refused check-in.
pub fn record_checkin_refused(err: &GatePassError) {
    record_checkin(reason(err));
}

/// Stable label for an error.
#[must_use]
pub const fn reason(err: &GatePassError) -> &'static str {
    match err {
        GatePassError::Config(_) => "config",
        GatePassError::Validation { .. } => "validation",
        GatePassError::DuplicateIdentity { .. } => "duplicate_identity",
        GatePassError::DuplicateReference { .. } => "duplicate_reference",
        GatePassError::PaymentAlreadyConfirmed { .. } => "already_confirmed",
        GatePassError::InvalidCredential => "invalid_credential",
        GatePassError::NotFound { .. } => "not_found",
        GatePassError::PaymentRequired { .. } => "payment_required",
        GatePassError::Rendering(_) => "rendering",
        GatePassError::Storage(_) => "storage",
    }
}

//! HTTP surface for GatePass.
//!
//! Thin axum adapters over the `gatepass-core` services:
//!
//! ```text
//! POST /api/registrations    → IssuanceService::issue
//! POST /api/payments/confirm → PaymentConfirmationService::confirm
//! POST /api/checkin          → CheckInService::check_in
//! GET  /health
//! ```
//!
//! Domain errors become JSON bodies `{code, message, details?}` through
//! [`AppError`].

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod notifier;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use config::{Config, ConfigError};
pub use error::AppError;
pub use notifier::ConsoleNotifier;
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

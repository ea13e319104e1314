//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by domain.

pub mod checkin;
pub mod health;
pub mod payments;
pub mod registrations;

// Re-export common handler utilities
pub use health::health_check;

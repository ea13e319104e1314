//! # GatePass Testing
//!
//! Testing utilities and in-memory collaborators for GatePass.
//!
//! This crate provides:
//! - [`InMemoryRegistrationStore`]: mutex-guarded `RegistrationStore`
//! - [`FixedClock`]: deterministic time
//! - [`RecordingNotifier`] / [`FailingNotifier`]: notification doubles
//! - [`fixtures`]: builders for codecs, purchases and registrations
//!
//! ## Example
//!
//! ```ignore
//! use gatepass_testing::{fixtures, test_clock, InMemoryRegistrationStore, RecordingNotifier};
//!
//! #[tokio::test]
//! async fn test_issue_and_confirm() {
//!     let store = Arc::new(InMemoryRegistrationStore::new());
//!     let codec = Arc::new(fixtures::test_codec());
//!     let issuance = IssuanceService::new(store.clone(), codec, Arc::new(test_clock()));
//!
//!     let issued = issuance.issue(fixtures::purchase("a@x.com", 2)).await.unwrap();
//!     assert_eq!(issued.len(), 2);
//! }
//! ```

use chrono::{DateTime, Utc};
use gatepass_core::environment::Clock;

pub mod fixtures;
pub mod notifier;
pub mod store;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use gatepass_testing::mocks::FixedClock;
    /// use gatepass_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Fixed clock pinned to the present moment.
    ///
    /// Credential expiry is verified against wall-clock time, so issuance
    /// tests need a clock close to now rather than a historic date.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(Utc::now())
    }
}

/// Install a `tracing` subscriber that writes to the test harness output.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatepass_core=debug,gatepass_testing=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use notifier::{FailingNotifier, RecordingNotifier};
pub use store::InMemoryRegistrationStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }
}

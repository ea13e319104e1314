//! Lifecycle services built on a [`RegistrationStore`](crate::store::RegistrationStore).
//!
//! - [`IssuanceService`]: purchase → registrations with credentials
//! - [`PaymentConfirmationService`]: payment reference → paid registration
//! - [`CheckInService`]: presented credential → admission outcome

pub mod checkin;
pub mod issuance;
pub mod payment;

pub use checkin::{CheckInOutcome, CheckInService};
pub use issuance::{IssuanceService, MAX_EMAIL_LEN, MAX_PURCHASE_QUANTITY};
pub use payment::{PaymentConfirmation, PaymentConfirmationService};

//! # GatePass Core
//!
//! Credential lifecycle engine for a ticketed event: signed entry
//! credentials tied to purchase records, duplicate-payment-reference
//! rejection, and at-most-once check-in under concurrent scanning.
//!
//! ## Components
//!
//! ```text
//! ┌──────────────┐   create    ┌────────────────────┐   encode   ┌──────────────────┐
//! │  Issuance    │ ──────────▶ │ RegistrationStore  │ ◀───────── │ CredentialCodec  │
//! │  Service     │             │ (authoritative)    │            │ + render         │
//! └──────────────┘             └────────────────────┘            └──────────────────┘
//!                                 ▲              ▲                        ▲
//!                  confirm_payment│              │mark_checked_in         │decode
//!                      ┌──────────┴───┐     ┌────┴─────────────┐          │
//!                      │   Payment    │     │    Check-in      │──────────┘
//!                      │ Confirmation │     │    Service       │
//!                      └──────────────┘     └──────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - `identity` is unique across all registrations
//! - a payment reference, once accepted, is unique across all registrations
//! - `payment_confirmed` and `checked_in` each flip false → true at most once
//! - check-in requires confirmed payment
//! - every credential decodes to exactly its own registration's identity
//!
//! Storage is abstracted behind [`store::RegistrationStore`]; delivery of
//! confirmation notices behind [`notify::Notifier`]; time behind
//! [`environment::Clock`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential;
pub mod environment;
pub mod error;
pub mod identity;
pub mod notify;
pub mod render;
pub mod services;
pub mod store;
pub mod types;

pub use credential::{CredentialCodec, CredentialToken, SigningSecret};
pub use environment::{Clock, RuntimeMode, SystemClock};
pub use error::{GatePassError, Result};
pub use notify::{ConfirmationNotice, NotificationStatus, Notifier, NotifyError};
pub use render::RenderedCode;
pub use services::{
    CheckInOutcome, CheckInService, IssuanceService, MAX_EMAIL_LEN, PaymentConfirmation,
    PaymentConfirmationService,
};
pub use store::RegistrationStore;
pub use types::{
    AdmissionState, HolderSummary, Identity, Money, PassCategory, Purchase, Registration,
    RegistrationId,
};

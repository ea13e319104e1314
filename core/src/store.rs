//! Registration store trait.
//!
//! The store is the authoritative record of every issued registration. It
//! owns two uniqueness invariants:
//!
//! 1. `identity` is unique across all registrations
//! 2. `payment_reference`, once set, is unique across all registrations
//!
//! # Implementation Notes
//!
//! - **CRITICAL**: `confirm_payment()` and `mark_checked_in()` MUST each be a
//!   single atomic unit (mutex critical section, row-locked transaction).
//!   A check followed by a separate write lets two concurrent requests both
//!   pass the check.
//! - Reads must be strongly consistent with the write path; a stale read of
//!   `payment_confirmed` turns into a false `PaymentRequired` at the door.
//! - Implementations never retry internally.
//! - Nothing caches `checked_in` outside the store.

use crate::error::Result;
use crate::types::{Identity, Registration};
use chrono::{DateTime, Utc};

/// Authoritative registration storage.
pub trait RegistrationStore: Send + Sync {
    /// Insert a new registration.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - a registration with the same identity exists (`DuplicateIdentity`)
    /// - the storage operation fails (`Storage`)
    fn create(
        &self,
        registration: Registration,
    ) -> impl std::future::Future<Output = Result<Registration>> + Send;

    /// Insert a batch of sibling registrations, all or nothing.
    ///
    /// A purchaser email that is already some registration's identity or
    /// purchaser email rejects the whole batch, so a returning buyer cannot
    /// obtain fresh sibling identities with a larger quantity. The check and
    /// the inserts form one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - a purchaser email in the batch has already registered
    ///   (`DuplicateIdentity`, carrying that email)
    /// - any identity in the batch already exists or repeats (`DuplicateIdentity`)
    /// - the storage operation fails (`Storage`)
    fn create_all(
        &self,
        registrations: Vec<Registration>,
    ) -> impl std::future::Future<Output = Result<Vec<Registration>>> + Send;

    /// Look up a registration by identity.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn find_by_identity(
        &self,
        identity: &Identity,
    ) -> impl std::future::Future<Output = Result<Option<Registration>>> + Send;

    /// Look up the registration a payment reference is bound to.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> impl std::future::Future<Output = Result<Option<Registration>>> + Send;

    /// Bind `reference` to the registration and mark it paid.
    ///
    /// Checks, in order: the identity exists (`NotFound`), the reference is
    /// not bound to any registration including this one
    /// (`DuplicateReference`), the registration is not already confirmed
    /// (`PaymentAlreadyConfirmed`). The checks and the write are one atomic
    /// unit.
    ///
    /// # Errors
    ///
    /// Returns the errors listed above, or `Storage` if the store fails.
    fn confirm_payment(
        &self,
        identity: &Identity,
        reference: &str,
        confirmed_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Registration>> + Send;

    /// Admit the holder at most once.
    ///
    /// # Returns
    ///
    /// - `Ok((registration, true))`: already checked in; nothing was written
    /// - `Ok((registration, false))`: this call performed the check-in
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the identity does not exist (`NotFound`)
    /// - payment is not confirmed (`PaymentRequired`)
    /// - the storage operation fails (`Storage`)
    fn mark_checked_in(
        &self,
        identity: &Identity,
        checked_in_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(Registration, bool)>> + Send;
}

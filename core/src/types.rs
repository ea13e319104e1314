//! Domain types for the credential lifecycle.
//!
//! A [`Registration`] is one admitted person. A multi-quantity purchase
//! produces several sibling registrations, each with its own [`Identity`],
//! credential token and rendered code.

use crate::credential::CredentialToken;
use crate::render::RenderedCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Creates a new random `RegistrationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RegistrationId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The unique key a credential is bound to.
///
/// Identities are normalized email addresses (trimmed, ASCII-lowercased).
/// Siblings of a multi-quantity purchase carry a positional tag in the local
/// part; see [`crate::identity::derive_identity`].
///
/// # Validation
///
/// - `FromStr::from_str()`: normalizes and validates the email shape
/// - `new()`: no validation, for values read back from trusted storage
///
/// # Examples
///
/// ```
/// use gatepass_core::types::Identity;
///
/// let identity: Identity = "  Guest@Example.COM ".parse().unwrap();
/// assert_eq!(identity.as_str(), "guest@example.com");
///
/// assert!("not-an-email".parse::<Identity>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap an already-normalized identity string without validation.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Get the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(local, domain)` around the single `@`.
    #[must_use]
    pub fn parts(&self) -> (&str, &str) {
        self.0.split_once('@').unwrap_or((self.0.as_str(), ""))
    }
}

/// Error returned when a string is not a usable identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid identity '{input}': {reason}")]
pub struct ParseIdentityError {
    input: String,
    reason: &'static str,
}

impl FromStr for Identity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let reject = |reason| ParseIdentityError {
            input: s.to_string(),
            reason,
        };

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(reject("missing '@'"));
        };
        if local.is_empty() {
            return Err(reject("empty local part"));
        }
        if domain.is_empty() || domain.contains('@') {
            return Err(reject("malformed domain"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(reject("contains whitespace"));
        }

        Ok(Self(normalized))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Money and pass categories
// ============================================================================

/// Amount in paise (1/100 rupee).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from paise
    #[must_use]
    pub const fn from_paise(paise: u64) -> Self {
        Self(paise)
    }

    /// Creates a `Money` value from whole rupees
    #[must_use]
    pub const fn from_rupees(rupees: u32) -> Self {
        // u32 * 100 always fits in u64
        Self(rupees as u64 * 100)
    }

    /// Returns the amount in paise
    #[must_use]
    pub const fn paise(&self) -> u64 {
        self.0
    }

    /// Returns the amount in whole rupees (rounded down)
    #[must_use]
    pub const fn rupees(&self) -> u64 {
        self.0 / 100
    }

    /// Multiplies by a quantity with overflow checking
    #[must_use]
    pub const fn checked_mul(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Pass category offered for the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassCategory {
    /// Single entry
    #[default]
    Stag,
    /// Entry for a couple, priced as one pass
    Couple,
    /// Family entry, priced per person
    Family,
}

impl PassCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 3] = [Self::Stag, Self::Couple, Self::Family];

    /// Unit price of one pass.
    #[must_use]
    pub const fn price(self) -> Money {
        match self {
            Self::Stag => Money::from_rupees(599),
            Self::Couple => Money::from_rupees(1099),
            Self::Family => Money::from_rupees(550),
        }
    }

    /// Stable storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stag => "stag",
            Self::Couple => "couple",
            Self::Family => "family",
        }
    }
}

impl fmt::Display for PassCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stag" => Ok(Self::Stag),
            "couple" => Ok(Self::Couple),
            "family" => Ok(Self::Family),
            other => Err(format!("Unknown pass category: {other}")),
        }
    }
}

// ============================================================================
// Purchase and registration
// ============================================================================

/// One purchase intent, as collected by the registration form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Purchaser's email; siblings derive their identities from it
    pub email: String,
    /// Holder name
    pub holder_name: String,
    /// Contact phone
    pub phone: String,
    /// Gender as entered
    pub gender: String,
    /// Age in years
    pub age: u16,
    /// Pass category
    #[serde(default)]
    pub pass_category: PassCategory,
    /// Number of people admitted by this purchase
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Optional referral code
    #[serde(default)]
    pub referral: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

impl Purchase {
    /// Amount due for the whole purchase, `None` on overflow.
    #[must_use]
    pub const fn total_amount(&self) -> Option<Money> {
        self.pass_category.price().checked_mul(self.quantity)
    }
}

/// Where a registration stands at the door.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionState {
    /// Payment not yet confirmed
    Unpaid,
    /// Paid, not yet admitted
    PaidNotEntered,
    /// Paid and admitted (terminal)
    PaidEntered,
}

/// One admitted-person record, the unit of check-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Registration ID
    pub id: RegistrationId,
    /// Unique identity the credential is bound to
    pub identity: Identity,
    /// Email the purchase was made with
    pub purchaser_email: String,
    /// Holder name
    pub holder_name: String,
    /// Contact phone
    pub phone: String,
    /// Gender
    pub gender: String,
    /// Age in years
    pub age: u16,
    /// Referral code, if any
    pub referral: Option<String>,
    /// Pass category
    pub pass_category: PassCategory,
    /// Number of siblings created by the same purchase
    pub purchase_quantity: u32,
    /// Signed credential token
    pub credential_token: CredentialToken,
    /// Scannable rendering of the token
    pub rendered_code: RenderedCode,
    /// External payment reference, once confirmed
    pub payment_reference: Option<String>,
    /// Whether payment has been confirmed
    pub payment_confirmed: bool,
    /// When payment was confirmed
    pub payment_confirmed_at: Option<DateTime<Utc>>,
    /// Whether the holder has been admitted
    pub checked_in: bool,
    /// When the holder was admitted
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// Current admission state derived from the payment and check-in flags.
    #[must_use]
    pub const fn admission_state(&self) -> AdmissionState {
        match (self.payment_confirmed, self.checked_in) {
            (false, _) => AdmissionState::Unpaid,
            (true, false) => AdmissionState::PaidNotEntered,
            (true, true) => AdmissionState::PaidEntered,
        }
    }

    /// Display payload for door staff.
    #[must_use]
    pub fn holder_summary(&self) -> HolderSummary {
        HolderSummary {
            identity: self.identity.clone(),
            holder_name: self.holder_name.clone(),
            pass_category: self.pass_category,
            purchase_quantity: self.purchase_quantity,
            checked_in: self.checked_in,
        }
    }
}

/// What door staff see about a holder after a scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderSummary {
    /// Identity the credential resolved to
    pub identity: Identity,
    /// Holder name
    pub holder_name: String,
    /// Pass category
    pub pass_category: PassCategory,
    /// Purchase quantity, for display
    pub purchase_quantity: u32,
    /// Check-in flag at the time of the response
    pub checked_in: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_normalized() {
        let identity: Identity = " A.B@X.Com".parse().unwrap();
        assert_eq!(identity.as_str(), "a.b@x.com");
        assert_eq!(identity.parts(), ("a.b", "x.com"));
    }

    #[test]
    fn identity_rejects_malformed_input() {
        for input in ["", "plain", "@x.com", "a@", "a@b@c", "a b@x.com"] {
            assert!(input.parse::<Identity>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn pass_prices() {
        assert_eq!(PassCategory::Stag.price().rupees(), 599);
        assert_eq!(PassCategory::Couple.price().rupees(), 1099);
        assert_eq!(PassCategory::Family.price().rupees(), 550);
    }

    #[test]
    fn pass_category_round_trips_through_storage_key() {
        for category in PassCategory::ALL {
            assert_eq!(category.as_str().parse::<PassCategory>().unwrap(), category);
        }
        assert!("vip".parse::<PassCategory>().is_err());
    }

    #[test]
    fn total_amount_multiplies_unit_price() {
        let purchase = Purchase {
            email: "a@x.com".to_string(),
            holder_name: "A".to_string(),
            phone: "1".to_string(),
            gender: "f".to_string(),
            age: 30,
            pass_category: PassCategory::Family,
            quantity: 3,
            referral: None,
        };
        assert_eq!(purchase.total_amount(), Some(Money::from_rupees(1650)));
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_paise(59_950).to_string(), "₹599.50");
    }
}

//! Builders for common test scenarios.

use chrono::{Duration, Utc};
use gatepass_core::credential::{CredentialCodec, CredentialToken, SigningSecret};
use gatepass_core::environment::RuntimeMode;
use gatepass_core::render::RenderedCode;
use gatepass_core::types::{Identity, PassCategory, Purchase, Registration, RegistrationId};

/// Signing secret shared by test codecs.
pub const TEST_SECRET: &str = "test-secret-0123456789abcdef-0123456789";

/// Codec with [`TEST_SECRET`] and a one-day credential lifetime.
///
/// # Panics
///
/// Never in practice; [`TEST_SECRET`] satisfies the production length rule.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_codec() -> CredentialCodec {
    let secret = SigningSecret::resolve(Some(TEST_SECRET), RuntimeMode::Production)
        .expect("test secret satisfies the length rule");
    CredentialCodec::new(&secret, Duration::days(1))
}

/// A valid purchase for `email` with the given quantity.
#[must_use]
pub fn purchase(email: &str, quantity: u32) -> Purchase {
    Purchase {
        email: email.to_string(),
        holder_name: "Test Holder".to_string(),
        phone: "9000000000".to_string(),
        gender: "other".to_string(),
        age: 30,
        pass_category: PassCategory::Stag,
        quantity,
        referral: None,
    }
}

/// An unpaid registration for `identity` with placeholder credential fields.
///
/// Store tests only care about identities and flags; the token here does not
/// verify against any codec.
#[must_use]
pub fn registration(identity: &str) -> Registration {
    Registration {
        id: RegistrationId::new(),
        identity: Identity::new(identity),
        purchaser_email: identity.to_string(),
        holder_name: "Test Holder".to_string(),
        phone: "9000000000".to_string(),
        gender: "other".to_string(),
        age: 30,
        referral: None,
        pass_category: PassCategory::Stag,
        purchase_quantity: 1,
        credential_token: CredentialToken::new(format!("placeholder-token-{identity}")),
        rendered_code: RenderedCode::from_png(Vec::new()),
        payment_reference: None,
        payment_confirmed: false,
        payment_confirmed_at: None,
        checked_in: false,
        checked_in_at: None,
        created_at: Utc::now(),
    }
}

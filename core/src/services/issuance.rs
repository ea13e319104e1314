//! Issuance: one purchase intent in, 1..N registrations out.

use crate::credential::CredentialCodec;
use crate::environment::Clock;
use crate::error::{GatePassError, Result};
use crate::identity::derive_all;
use crate::render::render;
use crate::store::RegistrationStore;
use crate::types::{Purchase, Registration, RegistrationId};
use std::sync::Arc;

/// Largest number of passes one purchase may request.
pub const MAX_PURCHASE_QUANTITY: u32 = 10;

/// Oldest age accepted on the form.
pub const MAX_AGE: u16 = 120;

/// Longest purchaser email accepted, in bytes (RFC 5321 path limit).
///
/// Keeps every sibling's signed token small enough for one QR symbol.
pub const MAX_EMAIL_LEN: usize = 254;

/// Creates registrations and mints a credential and code for each one.
pub struct IssuanceService<S> {
    store: Arc<S>,
    codec: Arc<CredentialCodec>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for IssuanceService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: RegistrationStore> IssuanceService<S> {
    /// Create a new issuance service.
    #[must_use]
    pub fn new(store: Arc<S>, codec: Arc<CredentialCodec>, clock: Arc<dyn Clock>) -> Self {
        Self { store, codec, clock }
    }

    /// Issue one registration per admitted person in `purchase`.
    ///
    /// With `quantity == 1` the identity is the purchaser's email. With
    /// `quantity > 1` every sibling gets a derived identity and its own
    /// token, so each code admits exactly one person. The batch is created
    /// all or nothing.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the purchase fails validation (`Validation`)
    /// - the purchaser email or any derived identity is already registered
    ///   (`DuplicateIdentity`)
    /// - signing, rendering or storage fails
    #[tracing::instrument(skip_all, fields(email = %purchase.email, quantity = purchase.quantity))]
    pub async fn issue(&self, purchase: Purchase) -> Result<Vec<Registration>> {
        let purchase = validate(purchase)?;
        let identities = derive_all(&purchase.email, purchase.quantity)?;
        let now = self.clock.now();
        let siblings = purchase.quantity > 1;

        let mut registrations = Vec::with_capacity(identities.len());
        for (position, identity) in (1..=purchase.quantity).zip(identities) {
            let credential_token = self.codec.issue(&identity, now)?;
            let rendered_code = render(&credential_token)?;

            let (holder_name, phone) = if siblings {
                (
                    format!("{} ({position})", purchase.holder_name),
                    format!("{}-{position}", purchase.phone),
                )
            } else {
                (purchase.holder_name.clone(), purchase.phone.clone())
            };

            registrations.push(Registration {
                id: RegistrationId::new(),
                identity,
                purchaser_email: purchase.email.clone(),
                holder_name,
                phone,
                gender: purchase.gender.clone(),
                age: purchase.age,
                referral: purchase.referral.clone(),
                pass_category: purchase.pass_category,
                purchase_quantity: purchase.quantity,
                credential_token,
                rendered_code,
                payment_reference: None,
                payment_confirmed: false,
                payment_confirmed_at: None,
                checked_in: false,
                checked_in_at: None,
                created_at: now,
            });
        }

        let created = self.store.create_all(registrations).await?;

        tracing::info!(
            count = created.len(),
            pass_category = %purchase.pass_category,
            "Registrations issued"
        );

        Ok(created)
    }
}

/// Trim and check a purchase the way the registration form requires.
///
/// The email comes back normalized the same way identities are, so the
/// stored purchaser email matches a single-pass identity byte for byte.
fn validate(mut purchase: Purchase) -> Result<Purchase> {
    purchase.email = purchase.email.trim().to_ascii_lowercase();
    purchase.holder_name = purchase.holder_name.trim().to_string();
    purchase.phone = purchase.phone.trim().to_string();
    purchase.gender = purchase.gender.trim().to_string();
    purchase.referral = purchase
        .referral
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    for (field, value) in [
        ("email", &purchase.email),
        ("name", &purchase.holder_name),
        ("phone", &purchase.phone),
        ("gender", &purchase.gender),
    ] {
        if value.is_empty() {
            return Err(GatePassError::validation(format!("{field} is required")));
        }
    }

    if purchase.email.len() > MAX_EMAIL_LEN {
        return Err(GatePassError::validation(format!(
            "email must be at most {MAX_EMAIL_LEN} bytes"
        )));
    }

    if purchase.age == 0 || purchase.age > MAX_AGE {
        return Err(GatePassError::validation(format!(
            "age must be between 1 and {MAX_AGE}"
        )));
    }

    if purchase.quantity == 0 || purchase.quantity > MAX_PURCHASE_QUANTITY {
        return Err(GatePassError::validation(format!(
            "quantity must be between 1 and {MAX_PURCHASE_QUANTITY}"
        )));
    }

    Ok(purchase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PassCategory;

    fn purchase() -> Purchase {
        Purchase {
            email: " A@X.com ".to_string(),
            holder_name: " Asha ".to_string(),
            phone: "98765".to_string(),
            gender: "female".to_string(),
            age: 28,
            pass_category: PassCategory::Stag,
            quantity: 1,
            referral: Some("  ".to_string()),
        }
    }

    #[test]
    fn validate_trims_fields() {
        let Ok(valid) = validate(purchase()) else {
            unreachable!("fixture purchase is valid");
        };
        assert_eq!(valid.email, "a@x.com");
        assert_eq!(valid.holder_name, "Asha");
        assert_eq!(valid.referral, None);
    }

    #[test]
    fn validate_rejects_overlong_email() {
        let mut p = purchase();
        p.email = format!("{}@x.com", "a".repeat(MAX_EMAIL_LEN));
        assert!(matches!(validate(p), Err(GatePassError::Validation { .. })));

        let mut p = purchase();
        p.email = format!("{}@x.com", "a".repeat(MAX_EMAIL_LEN - "@x.com".len()));
        assert!(validate(p).is_ok());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut p = purchase();
        p.phone = "   ".to_string();
        assert_eq!(
            validate(p),
            Err(GatePassError::validation("phone is required"))
        );
    }

    #[test]
    fn validate_rejects_quantity_out_of_range() {
        for quantity in [0, MAX_PURCHASE_QUANTITY + 1] {
            let mut p = purchase();
            p.quantity = quantity;
            assert!(matches!(validate(p), Err(GatePassError::Validation { .. })));
        }
    }

    #[test]
    fn validate_rejects_age_out_of_range() {
        let mut p = purchase();
        p.age = 0;
        assert!(validate(p).is_err());
    }
}

//! Sibling identity derivation.
//!
//! A purchase of `total` passes made with `base` produces `total`
//! registrations. The identities follow one documented format:
//!
//! | `total` | identity |
//! |---|---|
//! | 1 | normalized `base` |
//! | n > 1 | `local+{index}@domain`, `index` in `1..=n` |
//!
//! Normalization trims surrounding whitespace and lowercases ASCII. A local
//! part that already contains `+` keeps it: `a+vip@x.com` becomes
//! `a+vip+1@x.com`.

use crate::error::{GatePassError, Result};
use crate::types::Identity;

/// Derive the identity of sibling `index` (1-based) out of `total`.
///
/// # Examples
///
/// ```
/// use gatepass_core::identity::derive_identity;
///
/// assert_eq!(derive_identity("A@X.com", 1, 1).unwrap().as_str(), "a@x.com");
/// assert_eq!(derive_identity("a@x.com", 2, 2).unwrap().as_str(), "a+2@x.com");
/// ```
///
/// # Errors
///
/// Returns [`GatePassError::Validation`] if `base` is not an email address,
/// `total` is zero, or `index` is outside `1..=total`.
pub fn derive_identity(base: &str, index: u32, total: u32) -> Result<Identity> {
    if total == 0 {
        return Err(GatePassError::validation("quantity must be at least 1"));
    }
    if index == 0 || index > total {
        return Err(GatePassError::validation(format!(
            "sibling index {index} is outside 1..={total}"
        )));
    }

    let identity: Identity = base
        .parse()
        .map_err(|e: crate::types::ParseIdentityError| GatePassError::validation(e.to_string()))?;

    if total == 1 {
        return Ok(identity);
    }

    let (local, domain) = identity.parts();
    Ok(Identity::new(format!("{local}+{index}@{domain}")))
}

/// Derive all `total` sibling identities for `base`, in order.
///
/// # Errors
///
/// Same as [`derive_identity`].
pub fn derive_all(base: &str, total: u32) -> Result<Vec<Identity>> {
    (1..=total).map(|index| derive_identity(base, index, total)).collect()
}

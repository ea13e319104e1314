//! Signed entry credentials.
//!
//! A credential is an HS256 JWT whose `sub` claim is the holder's
//! [`Identity`] and whose `exp` claim bounds its validity. Signing lets the
//! door authenticate possession without a store round-trip for tamper
//! detection; the store is still consulted for payment and check-in state.
//!
//! The codec cannot be built without a [`SigningSecret`], and a secret can
//! only be obtained through [`SigningSecret::resolve`], which refuses to
//! invent one outside [`RuntimeMode::Development`].

use crate::environment::RuntimeMode;
use crate::error::{GatePassError, Result};
use crate::types::Identity;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum secret length accepted outside development.
pub const MIN_SECRET_BYTES: usize = 32;

/// Default credential lifetime.
pub const DEFAULT_CREDENTIAL_TTL_DAYS: i64 = 60;

/// Longest configurable credential lifetime (ten years).
pub const MAX_CREDENTIAL_TTL_DAYS: i64 = 3650;

const DEVELOPMENT_SECRET: &str = "gatepass-development-secret-do-not-deploy";

/// Process-wide HMAC key for credentials.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Resolve the signing secret supplied by configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatePassError::Config`] if:
    /// - no secret is configured and `mode` is not development
    /// - the secret is shorter than [`MIN_SECRET_BYTES`] outside development
    /// - the secret is empty
    pub fn resolve(configured: Option<&str>, mode: RuntimeMode) -> Result<Self> {
        match configured.map(str::trim) {
            Some("") => Err(GatePassError::Config(
                "credential signing secret is empty".to_string(),
            )),
            Some(secret) if !mode.is_development() && secret.len() < MIN_SECRET_BYTES => {
                Err(GatePassError::Config(format!(
                    "credential signing secret must be at least {MIN_SECRET_BYTES} bytes"
                )))
            }
            Some(secret) => Ok(Self(secret.as_bytes().to_vec())),
            None if mode.is_development() => {
                tracing::warn!(
                    "No credential signing secret configured; using the built-in development secret"
                );
                Ok(Self(DEVELOPMENT_SECRET.as_bytes().to_vec()))
            }
            None => Err(GatePassError::Config(
                "credential signing secret is required outside development mode".to_string(),
            )),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

/// A signed credential, as carried by the rendered code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialToken(String);

impl CredentialToken {
    /// Wrap a token string read back from storage.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CredentialClaims {
    sub: String,
    exp: i64,
}

/// Encodes and verifies credentials with one process-wide secret.
#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl CredentialCodec {
    /// Build a codec from a resolved secret and a credential lifetime.
    #[must_use]
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Sign `identity` with the given expiry.
    ///
    /// The same identity, expiry and secret always produce the same token.
    ///
    /// # Errors
    ///
    /// Returns [`GatePassError::Config`] if the claims cannot be signed.
    pub fn encode(&self, identity: &Identity, expiry: DateTime<Utc>) -> Result<CredentialToken> {
        let claims = CredentialClaims {
            sub: identity.as_str().to_string(),
            exp: expiry.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(CredentialToken)
            .map_err(|e| GatePassError::Config(format!("credential signing failed: {e}")))
    }

    /// Sign `identity` for the configured lifetime starting at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`GatePassError::Config`] if the expiry falls outside the
    /// representable time range or the claims cannot be signed.
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<CredentialToken> {
        let expiry = now.checked_add_signed(self.ttl).ok_or_else(|| {
            GatePassError::Config(format!("credential lifetime {} overflows expiry", self.ttl))
        })?;
        self.encode(identity, expiry)
    }

    /// Verify a presented token and return the identity it is bound to.
    ///
    /// Expiry is checked against wall-clock time with no leeway.
    ///
    /// # Errors
    ///
    /// Returns [`GatePassError::InvalidCredential`] for a bad signature, an
    /// expired token, an empty subject, or input that is not a token at all.
    pub fn decode(&self, token: &str) -> Result<Identity> {
        let data = jsonwebtoken::decode::<CredentialClaims>(
            token.trim(),
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Credential rejected");
            GatePassError::InvalidCredential
        })?;

        if data.claims.sub.is_empty() {
            return Err(GatePassError::InvalidCredential);
        }

        Ok(Identity::new(data.claims.sub))
    }
}

impl fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn codec() -> CredentialCodec {
        let secret = SigningSecret::resolve(Some(SECRET), RuntimeMode::Production).unwrap();
        CredentialCodec::new(&secret, Duration::days(DEFAULT_CREDENTIAL_TTL_DAYS))
    }

    fn identity(s: &str) -> Identity {
        s.parse().unwrap()
    }

    #[test]
    fn missing_secret_is_fatal_in_production() {
        let err = SigningSecret::resolve(None, RuntimeMode::Production).unwrap_err();
        assert!(matches!(err, GatePassError::Config(_)));
    }

    #[test]
    fn missing_secret_falls_back_in_development() {
        assert!(SigningSecret::resolve(None, RuntimeMode::Development).is_ok());
    }

    #[test]
    fn short_secret_is_rejected_in_production() {
        let err = SigningSecret::resolve(Some("short"), RuntimeMode::Production).unwrap_err();
        assert!(matches!(err, GatePassError::Config(_)));
        assert!(SigningSecret::resolve(Some("short"), RuntimeMode::Development).is_ok());
    }

    #[test]
    fn blank_secret_is_rejected_everywhere() {
        assert!(SigningSecret::resolve(Some("   "), RuntimeMode::Development).is_err());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = SigningSecret::resolve(Some(SECRET), RuntimeMode::Production).unwrap();
        assert!(!format!("{secret:?}").contains(SECRET));
    }

    #[test]
    fn encoding_is_deterministic() {
        let codec = codec();
        let expiry = Utc::now() + Duration::days(1);
        let a = codec.encode(&identity("a@x.com"), expiry).unwrap();
        let b = codec.encode(&identity("a@x.com"), expiry).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let token = codec
            .encode(&identity("a@x.com"), Utc::now() - Duration::minutes(5))
            .unwrap();
        assert_eq!(codec.decode(token.as_str()), Err(GatePassError::InvalidCredential));
    }

    #[test]
    fn overflowing_lifetime_is_an_error() {
        let secret = SigningSecret::resolve(Some(SECRET), RuntimeMode::Production).unwrap();
        let codec = CredentialCodec::new(&secret, Duration::days(1_000_000_000));

        let err = codec.issue(&identity("a@x.com"), Utc::now()).unwrap_err();

        assert!(matches!(err, GatePassError::Config(_)));
    }

    #[test]
    fn longest_configurable_lifetime_issues() {
        let secret = SigningSecret::resolve(Some(SECRET), RuntimeMode::Production).unwrap();
        let codec = CredentialCodec::new(&secret, Duration::days(MAX_CREDENTIAL_TTL_DAYS));

        let token = codec.issue(&identity("a@x.com"), Utc::now()).unwrap();

        assert_eq!(codec.decode(token.as_str()).unwrap(), identity("a@x.com"));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let other = SigningSecret::resolve(
            Some("ffffffffffffffffffffffffffffffff"),
            RuntimeMode::Production,
        )
        .unwrap();
        let foreign = CredentialCodec::new(&other, Duration::days(1));
        let token = foreign.issue(&identity("a@x.com"), Utc::now()).unwrap();
        assert_eq!(codec().decode(token.as_str()), Err(GatePassError::InvalidCredential));
    }

    #[test]
    fn garbage_is_rejected_without_panicking() {
        let codec = codec();
        for input in ["", "abc", "a.b.c", "....", "eyJ.eyJ.sig", "\u{0}\u{1}"] {
            assert_eq!(codec.decode(input), Err(GatePassError::InvalidCredential));
        }
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(local in "[a-z0-9]{1,16}", domain in "[a-z]{1,10}\\.[a-z]{2,3}") {
            let codec = codec();
            let id = identity(&format!("{local}@{domain}"));
            let token = codec.issue(&id, Utc::now()).unwrap();
            prop_assert_eq!(codec.decode(token.as_str()).unwrap(), id);
        }

        #[test]
        fn any_altered_byte_is_rejected(position in any::<prop::sample::Index>(), replacement in "[A-Za-z0-9_.-]") {
            let codec = codec();
            let token = codec.issue(&identity("guest@example.com"), Utc::now()).unwrap();
            let mut bytes = token.as_str().as_bytes().to_vec();
            let index = position.index(bytes.len());
            let replacement = replacement.as_bytes()[0];
            prop_assume!(bytes[index] != replacement);
            bytes[index] = replacement;
            let altered = String::from_utf8(bytes).unwrap();
            prop_assert_eq!(codec.decode(&altered), Err(GatePassError::InvalidCredential));
        }
    }
}

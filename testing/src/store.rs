//! In-memory registration store.
//!
//! Both uniqueness indexes live behind one `Mutex`, so every check-then-write
//! in [`RegistrationStore`] runs as a single critical section. This is the
//! in-process equivalent of the row lock the `PostgreSQL` store takes.

use chrono::{DateTime, Utc};
use gatepass_core::error::{GatePassError, Result};
use gatepass_core::store::RegistrationStore;
use gatepass_core::types::{Identity, Registration};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    by_identity: HashMap<Identity, Registration>,
    by_reference: HashMap<String, Identity>,
    purchasers: HashSet<String>,
}

impl Tables {
    fn insert(&mut self, registration: Registration) {
        if let Some(reference) = &registration.payment_reference {
            self.by_reference
                .insert(reference.clone(), registration.identity.clone());
        }
        self.purchasers.insert(registration.purchaser_email.clone());
        self.by_identity
            .insert(registration.identity.clone(), registration);
    }

    fn has_registered(&self, purchaser_email: &str) -> bool {
        self.purchasers.contains(purchaser_email)
            || self
                .by_identity
                .contains_key(&Identity::new(purchaser_email))
    }
}

/// HashMap-backed [`RegistrationStore`] for tests and local development.
///
/// # Example
///
/// ```
/// use gatepass_testing::InMemoryRegistrationStore;
///
/// let store = InMemoryRegistrationStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryRegistrationStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRegistrationStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| GatePassError::Storage("registration table lock poisoned".to_string()))
    }

    /// Number of stored registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |t| t.by_identity.len())
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every registration, ordered by identity.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Registration> {
        let mut all: Vec<Registration> = self
            .lock()
            .map(|t| t.by_identity.values().cloned().collect())
            .unwrap_or_default();
        all.sort_by(|a, b| a.identity.cmp(&b.identity));
        all
    }
}

impl RegistrationStore for InMemoryRegistrationStore {
    async fn create(&self, registration: Registration) -> Result<Registration> {
        let mut tables = self.lock()?;

        if tables.by_identity.contains_key(&registration.identity) {
            return Err(GatePassError::DuplicateIdentity {
                identity: registration.identity,
            });
        }
        if let Some(reference) = &registration.payment_reference {
            if tables.by_reference.contains_key(reference) {
                return Err(GatePassError::DuplicateReference {
                    reference: reference.clone(),
                });
            }
        }

        tables.insert(registration.clone());
        Ok(registration)
    }

    async fn create_all(&self, registrations: Vec<Registration>) -> Result<Vec<Registration>> {
        let mut tables = self.lock()?;

        for registration in &registrations {
            if tables.has_registered(&registration.purchaser_email) {
                return Err(GatePassError::DuplicateIdentity {
                    identity: Identity::new(registration.purchaser_email.as_str()),
                });
            }
        }

        let mut seen = HashSet::with_capacity(registrations.len());
        for registration in &registrations {
            if tables.by_identity.contains_key(&registration.identity)
                || !seen.insert(&registration.identity)
            {
                return Err(GatePassError::DuplicateIdentity {
                    identity: registration.identity.clone(),
                });
            }
        }

        for registration in &registrations {
            tables.insert(registration.clone());
        }
        Ok(registrations)
    }

    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<Registration>> {
        Ok(self.lock()?.by_identity.get(identity).cloned())
    }

    async fn find_by_payment_reference(&self, reference: &str) -> Result<Option<Registration>> {
        let tables = self.lock()?;
        Ok(tables
            .by_reference
            .get(reference)
            .and_then(|identity| tables.by_identity.get(identity))
            .cloned())
    }

    async fn confirm_payment(
        &self,
        identity: &Identity,
        reference: &str,
        confirmed_at: DateTime<Utc>,
    ) -> Result<Registration> {
        let mut tables = self.lock()?;
        let Tables {
            by_identity,
            by_reference,
            ..
        } = &mut *tables;

        let registration = by_identity
            .get_mut(identity)
            .ok_or_else(|| GatePassError::NotFound {
                identity: identity.clone(),
            })?;

        if by_reference.contains_key(reference) {
            return Err(GatePassError::DuplicateReference {
                reference: reference.to_string(),
            });
        }
        if registration.payment_confirmed {
            return Err(GatePassError::PaymentAlreadyConfirmed {
                identity: identity.clone(),
            });
        }

        registration.payment_reference = Some(reference.to_string());
        registration.payment_confirmed = true;
        registration.payment_confirmed_at = Some(confirmed_at);
        by_reference.insert(reference.to_string(), identity.clone());

        Ok(registration.clone())
    }

    async fn mark_checked_in(
        &self,
        identity: &Identity,
        checked_in_at: DateTime<Utc>,
    ) -> Result<(Registration, bool)> {
        let mut tables = self.lock()?;

        let registration = tables
            .by_identity
            .get_mut(identity)
            .ok_or_else(|| GatePassError::NotFound {
                identity: identity.clone(),
            })?;

        if registration.checked_in {
            return Ok((registration.clone(), true));
        }
        if !registration.payment_confirmed {
            return Err(GatePassError::payment_required(registration.holder_summary()));
        }

        registration.checked_in = true;
        registration.checked_in_at = Some(checked_in_at);

        Ok((registration.clone(), false))
    }
}

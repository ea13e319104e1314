//! `PostgreSQL` registration store for GatePass.
//!
//! Implements [`RegistrationStore`] on a `sqlx` connection pool. The
//! uniqueness rules are enforced by the schema itself:
//!
//! - `registrations_identity_key`: one registration per identity
//! - `registrations_payment_reference_key`: partial unique index, one
//!   registration per accepted payment reference
//!
//! Batch issuance takes a transaction-scoped advisory lock per purchaser
//! email before checking that the purchaser has not registered already.
//! Payment confirmation runs in a transaction holding the registration's row
//! lock. Check-in is a single conditional `UPDATE`, so concurrent scans of the
//! same credential serialize on the row and exactly one of them flips the flag.
//!
//! # Example
//!
//! ```no_run
//! use gatepass_postgres::PostgresRegistrationStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgres://localhost/gatepass").await?;
//! let store = PostgresRegistrationStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use gatepass_core::credential::CredentialToken;
use gatepass_core::error::{GatePassError, Result};
use gatepass_core::render::RenderedCode;
use gatepass_core::store::RegistrationStore;
use gatepass_core::types::{Identity, PassCategory, Registration, RegistrationId};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

const IDENTITY_CONSTRAINT: &str = "registrations_identity_key";
const REFERENCE_CONSTRAINT: &str = "registrations_payment_reference_key";

const COLUMNS: &str = "id, identity, purchaser_email, holder_name, phone, gender, age, \
     referral, pass_category, purchase_quantity, credential_token, rendered_code, \
     payment_reference, payment_confirmed, payment_confirmed_at, checked_in, \
     checked_in_at, created_at";

/// `PostgreSQL`-backed [`RegistrationStore`].
#[derive(Clone, Debug)]
pub struct PostgresRegistrationStore {
    pool: PgPool,
}

impl PostgresRegistrationStore {
    /// Create a store on an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`GatePassError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GatePassError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Registration>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM registrations WHERE {clause}"))
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GatePassError::Storage(format!("Failed to load registration: {e}")))?;

        row.as_ref().map(row_to_registration).transpose()
    }
}

impl RegistrationStore for PostgresRegistrationStore {
    async fn create(&self, registration: Registration) -> Result<Registration> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| GatePassError::Storage(format!("Failed to acquire connection: {e}")))?;

        insert(&mut *conn, &registration).await?;
        tracing::debug!(identity = %registration.identity, "Registration stored");
        Ok(registration)
    }

    async fn create_all(&self, registrations: Vec<Registration>) -> Result<Vec<Registration>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GatePassError::Storage(format!("Failed to begin transaction: {e}")))?;

        let mut purchasers: Vec<&str> = registrations
            .iter()
            .map(|r| r.purchaser_email.as_str())
            .collect();
        purchasers.sort_unstable();
        purchasers.dedup();

        for purchaser in purchasers {
            // Serializes concurrent issuance for one purchaser until commit.
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(purchaser)
                .execute(&mut *tx)
                .await
                .map_err(|e| GatePassError::Storage(format!("Failed to lock purchaser: {e}")))?;

            let (registered,): (bool,) = sqlx::query_as(
                "SELECT EXISTS (SELECT 1 FROM registrations \
                 WHERE identity = $1 OR purchaser_email = $1)",
            )
            .bind(purchaser)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| GatePassError::Storage(format!("Failed to check purchaser: {e}")))?;

            if registered {
                return Err(GatePassError::DuplicateIdentity {
                    identity: Identity::new(purchaser),
                });
            }
        }

        // Any failure drops `tx`, rolling back the rows already inserted.
        for registration in &registrations {
            insert(&mut *tx, registration).await?;
        }

        tx.commit()
            .await
            .map_err(|e| GatePassError::Storage(format!("Failed to commit registrations: {e}")))?;

        tracing::debug!(count = registrations.len(), "Registration batch stored");
        Ok(registrations)
    }

    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<Registration>> {
        self.fetch_one_where("identity = $1", identity.as_str()).await
    }

    async fn find_by_payment_reference(&self, reference: &str) -> Result<Option<Registration>> {
        self.fetch_one_where("payment_reference = $1", reference).await
    }

    async fn confirm_payment(
        &self,
        identity: &Identity,
        reference: &str,
        confirmed_at: DateTime<Utc>,
    ) -> Result<Registration> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GatePassError::Storage(format!("Failed to begin transaction: {e}")))?;

        let locked: Option<(bool,)> = sqlx::query_as(
            "SELECT payment_confirmed FROM registrations WHERE identity = $1 FOR UPDATE",
        )
        .bind(identity.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| GatePassError::Storage(format!("Failed to lock registration: {e}")))?;

        let Some((already_paid,)) = locked else {
            return Err(GatePassError::NotFound {
                identity: identity.clone(),
            });
        };

        let (reference_taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE payment_reference = $1)",
        )
        .bind(reference)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| GatePassError::Storage(format!("Failed to check payment reference: {e}")))?;

        if reference_taken {
            return Err(GatePassError::DuplicateReference {
                reference: reference.to_string(),
            });
        }
        if already_paid {
            return Err(GatePassError::PaymentAlreadyConfirmed {
                identity: identity.clone(),
            });
        }

        // A concurrent confirmation of another identity with the same
        // reference is caught here by the partial unique index.
        let row = sqlx::query(&format!(
            "UPDATE registrations \
             SET payment_reference = $2, payment_confirmed = TRUE, payment_confirmed_at = $3 \
             WHERE identity = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(identity.as_str())
        .bind(reference)
        .bind(confirmed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, identity, Some(reference)))?;

        let registration = row_to_registration(&row)?;

        tx.commit()
            .await
            .map_err(|e| map_write_error(e, identity, Some(reference)))?;

        Ok(registration)
    }

    async fn mark_checked_in(
        &self,
        identity: &Identity,
        checked_in_at: DateTime<Utc>,
    ) -> Result<(Registration, bool)> {
        let updated = sqlx::query(&format!(
            "UPDATE registrations \
             SET checked_in = TRUE, checked_in_at = $2 \
             WHERE identity = $1 AND payment_confirmed AND NOT checked_in \
             RETURNING {COLUMNS}"
        ))
        .bind(identity.as_str())
        .bind(checked_in_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatePassError::Storage(format!("Failed to check in: {e}")))?;

        if let Some(row) = updated {
            return Ok((row_to_registration(&row)?, false));
        }

        // Both flags only ever move to true, so the row read here explains
        // why the update matched nothing.
        let current = self
            .find_by_identity(identity)
            .await?
            .ok_or_else(|| GatePassError::NotFound {
                identity: identity.clone(),
            })?;

        if current.checked_in {
            Ok((current, true))
        } else {
            Err(GatePassError::payment_required(current.holder_summary()))
        }
    }
}

async fn insert(conn: &mut PgConnection, registration: &Registration) -> Result<()> {
    let age = i16::try_from(registration.age)
        .map_err(|_| GatePassError::validation("age out of range"))?;
    let quantity = i32::try_from(registration.purchase_quantity)
        .map_err(|_| GatePassError::validation("quantity out of range"))?;

    sqlx::query(&format!(
        "INSERT INTO registrations ({COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"
    ))
    .bind(*registration.id.as_uuid())
    .bind(registration.identity.as_str())
    .bind(&registration.purchaser_email)
    .bind(&registration.holder_name)
    .bind(&registration.phone)
    .bind(&registration.gender)
    .bind(age)
    .bind(registration.referral.as_deref())
    .bind(registration.pass_category.as_str())
    .bind(quantity)
    .bind(registration.credential_token.as_str())
    .bind(registration.rendered_code.as_bytes())
    .bind(registration.payment_reference.as_deref())
    .bind(registration.payment_confirmed)
    .bind(registration.payment_confirmed_at)
    .bind(registration.checked_in)
    .bind(registration.checked_in_at)
    .bind(registration.created_at)
    .execute(conn)
    .await
    .map_err(|e| {
        map_write_error(
            e,
            &registration.identity,
            registration.payment_reference.as_deref(),
        )
    })?;

    Ok(())
}

/// Translate unique violations on the two uniqueness constraints into
/// domain errors.
fn map_write_error(err: sqlx::Error, identity: &Identity, reference: Option<&str>) -> GatePassError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match (db.constraint(), reference) {
                (Some(IDENTITY_CONSTRAINT), _) => {
                    return GatePassError::DuplicateIdentity {
                        identity: identity.clone(),
                    };
                }
                (Some(REFERENCE_CONSTRAINT), Some(reference)) => {
                    return GatePassError::DuplicateReference {
                        reference: reference.to_string(),
                    };
                }
                _ => {}
            }
        }
    }
    GatePassError::Storage(format!("Failed to write registration: {err}"))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| GatePassError::Storage(format!("Failed to read column {name}: {e}")))
}

fn row_to_registration(row: &PgRow) -> Result<Registration> {
    let age: i16 = column(row, "age")?;
    let quantity: i32 = column(row, "purchase_quantity")?;
    let category: String = column(row, "pass_category")?;

    Ok(Registration {
        id: RegistrationId::from_uuid(column(row, "id")?),
        identity: Identity::new(column::<String>(row, "identity")?),
        purchaser_email: column(row, "purchaser_email")?,
        holder_name: column(row, "holder_name")?,
        phone: column(row, "phone")?,
        gender: column(row, "gender")?,
        age: u16::try_from(age)
            .map_err(|_| GatePassError::Storage(format!("Invalid stored age: {age}")))?,
        referral: column(row, "referral")?,
        pass_category: category
            .parse::<PassCategory>()
            .map_err(GatePassError::Storage)?,
        purchase_quantity: u32::try_from(quantity)
            .map_err(|_| GatePassError::Storage(format!("Invalid stored quantity: {quantity}")))?,
        credential_token: CredentialToken::new(column::<String>(row, "credential_token")?),
        rendered_code: RenderedCode::from_png(column(row, "rendered_code")?),
        payment_reference: column(row, "payment_reference")?,
        payment_confirmed: column(row, "payment_confirmed")?,
        payment_confirmed_at: column(row, "payment_confirmed_at")?,
        checked_in: column(row, "checked_in")?,
        checked_in_at: column(row, "checked_in_at")?,
        created_at: column(row, "created_at")?,
    })
}

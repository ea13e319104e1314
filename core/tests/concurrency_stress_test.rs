//! Concurrency stress tests.
//!
//! Many scanners presenting the same credential at once, and many clients
//! racing to bind the same payment reference. Exactly one must win.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect

use gatepass_core::notify::DisabledNotifier;
use gatepass_core::{
    CheckInOutcome, CheckInService, GatePassError, Identity, IssuanceService,
    PaymentConfirmationService,
};
use gatepass_testing::{InMemoryRegistrationStore, fixtures, init_test_tracing, test_clock};
use std::sync::Arc;

const SCANNERS: usize = 50;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_scans_admit_exactly_once() {
    init_test_tracing();
    let store = Arc::new(InMemoryRegistrationStore::new());
    let codec = Arc::new(fixtures::test_codec());
    let clock = Arc::new(test_clock());
    let issuance = IssuanceService::new(store.clone(), codec.clone(), clock.clone());
    let payments =
        PaymentConfirmationService::new(store.clone(), DisabledNotifier::shared(), clock.clone());
    let checkin = CheckInService::new(store.clone(), codec, clock);

    let issued = issuance.issue(fixtures::purchase("door@x.com", 1)).await.unwrap();
    payments
        .confirm(&"door@x.com".parse::<Identity>().unwrap(), "TXN-DOOR")
        .await
        .unwrap();
    let token = issued[0].credential_token.as_str().to_string();

    let handles: Vec<_> = (0..SCANNERS)
        .map(|_| {
            let checkin = checkin.clone();
            let token = token.clone();
            tokio::spawn(async move { checkin.check_in(&token).await })
        })
        .collect();

    let mut admitted = 0;
    let mut already = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            CheckInOutcome::Admitted(_) => admitted += 1,
            CheckInOutcome::AlreadyCheckedIn(_) => already += 1,
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(already, SCANNERS - 1);
    assert!(store.snapshot()[0].checked_in);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_confirmations_bind_reference_once() {
    init_test_tracing();
    let store = Arc::new(InMemoryRegistrationStore::new());
    let codec = Arc::new(fixtures::test_codec());
    let clock = Arc::new(test_clock());
    let issuance = IssuanceService::new(store.clone(), codec, clock.clone());
    let payments = PaymentConfirmationService::new(store.clone(), DisabledNotifier::shared(), clock);

    let issued = issuance.issue(fixtures::purchase("crowd@x.com", 10)).await.unwrap();

    let handles: Vec<_> = issued
        .iter()
        .map(|registration| {
            let payments = payments.clone();
            let identity = registration.identity.clone();
            tokio::spawn(async move { payments.confirm(&identity, "TXN-SHARED").await })
        })
        .collect();

    let mut confirmed = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => confirmed += 1,
            Err(GatePassError::DuplicateReference { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(confirmed, 1);
    assert_eq!(duplicates, 9);
    let paid = store.snapshot().iter().filter(|r| r.payment_confirmed).count();
    assert_eq!(paid, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_issuance_of_same_email_creates_one_batch() {
    init_test_tracing();
    let store = Arc::new(InMemoryRegistrationStore::new());
    let issuance = IssuanceService::new(
        store.clone(),
        Arc::new(fixtures::test_codec()),
        Arc::new(test_clock()),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let issuance = issuance.clone();
            tokio::spawn(async move { issuance.issue(fixtures::purchase("race@x.com", 3)).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(batch) => {
                assert_eq!(batch.len(), 3);
                succeeded += 1;
            }
            Err(err) => assert!(matches!(err, GatePassError::DuplicateIdentity { .. })),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(store.len(), 3);
}

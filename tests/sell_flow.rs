//! Offer creation against a mocked exchange.

use alloy::primitives::{Address, U256};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Notify;

use alloy::primitives::Signature;
use yam_market::blockchain::ConfirmationStatus;
use yam_market::contracts::abi::Permit;
use yam_market::notifications::NotificationId;
use yam_market::permit::{permit_digest, PermitDomain};
use yam_market::sell::{FormError, SellActions, SellFormValues, SkipReason, SubmitOutcome};

mod common;
use common::{buyer_token, offer_token, MockBackend, RecordingNotifier, EXCHANGE};

fn form() -> SellFormValues {
    SellFormValues {
        offer_token_address: offer_token().to_string(),
        buyer_token_address: buyer_token().to_string(),
        price: "52.5".into(),
        amount: "2.5".into(),
        ..SellFormValues::default()
    }
}

fn actions(backend: MockBackend) -> (Arc<MockBackend>, Arc<RecordingNotifier>, SellActions<MockBackend, RecordingNotifier>) {
    let backend = Arc::new(backend);
    let notifier = Arc::new(RecordingNotifier::default());
    let actions = SellActions::new(Arc::clone(&backend), Arc::clone(&notifier));
    (backend, notifier, actions)
}

/// `n / 10` tokens of 18 decimals.
fn tenths(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(17u64))
}

#[tokio::test]
async fn test_successful_offer() {
    let mut backend = MockBackend::connected();
    // 1 token already approved.
    backend.allowance = tenths(10);
    let (backend, notifier, actions) = actions(backend);

    let outcome = actions.submit(&form()).await;
    let SubmitOutcome::Submitted { tx_hash, confirmation } = outcome else {
        panic!("expected a submission");
    };
    assert_eq!(tx_hash, MockBackend::tx_hash());
    assert!(!actions.is_submitting());
    assert_eq!(confirmation.await.unwrap(), NotificationId::CreateOfferSuccess);

    let submitted = backend.submitted.lock().unwrap();
    let call = &submitted[0];
    assert_eq!(call.offerToken, offer_token());
    assert_eq!(call.buyerToken, buyer_token());
    assert_eq!(call.buyer, Address::ZERO);
    // Existing allowance is folded into the offer, as the permit must cover it.
    assert_eq!(call.amount, tenths(35));
    assert_eq!(call.price, U256::from(52_500_000u64));
    assert!(call.v == 27 || call.v == 28);

    let permits = backend.permits.lock().unwrap();
    let (owner, spender, value, deadline) = permits[0];
    assert_eq!(Some(owner), backend.wallet.as_ref().map(|w| w.address()));
    assert_eq!(spender, EXCHANGE);
    assert_eq!(value, call.amount);
    assert_eq!(call.deadline, deadline);
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    assert!(deadline > U256::from(now) && deadline <= U256::from(now + 3601));

    let events = notifier.events();
    assert_eq!(events.len(), 2);
    let (updated, loading) = &events[0];
    assert!(!*updated);
    assert_eq!(loading.id, NotificationId::CreateOfferLoading);
    assert!(loading.loading);
    let hash = tx_hash.to_string();
    assert_eq!(loading.key.as_deref(), Some(hash.as_str()));
    assert_eq!(loading.href, Some(format!("https://explorer.test/tx/{hash}")));

    let (updated, done) = &events[1];
    assert!(*updated);
    assert_eq!(done.id, NotificationId::CreateOfferSuccess);
    assert_eq!(done.key, loading.key);
}

#[tokio::test]
async fn test_signature_verifies_against_submitted_call() {
    let mut backend = MockBackend::connected();
    backend.allowance = tenths(10);
    let (backend, _, actions) = actions(backend);

    let SubmitOutcome::Submitted { confirmation, .. } = actions.submit(&form()).await else {
        panic!("expected a submission");
    };
    confirmation.await.unwrap();

    let owner = backend.wallet.as_ref().map(|w| w.address()).unwrap();
    let submitted = backend.submitted.lock().unwrap();
    let call = &submitted[0];
    // What the exchange hands to `permit`: the offer's own amount and deadline.
    let permit = Permit {
        owner,
        spender: EXCHANGE,
        value: call.amount,
        nonce: U256::from(3u64),
        deadline: call.deadline,
    };
    let domain = PermitDomain {
        name: "RealToken Test".into(),
        version: "1".into(),
        chain_id: 100,
        token: call.offerToken,
    };
    let signature = Signature::new(
        U256::from_be_bytes(call.r.0),
        U256::from_be_bytes(call.s.0),
        call.v == 28,
    );
    let recovered = signature
        .recover_address_from_prehash(&permit_digest(&domain, &permit))
        .unwrap();
    assert_eq!(recovered, owner);
}

#[tokio::test]
async fn test_failed_receipt() {
    let mut backend = MockBackend::connected();
    backend.receipt = ConfirmationStatus::Failed("status 0".into());
    let (_, notifier, actions) = actions(backend);

    let SubmitOutcome::Submitted { confirmation, .. } = actions.submit(&form()).await else {
        panic!("expected a submission");
    };
    assert_eq!(confirmation.await.unwrap(), NotificationId::CreateOfferError);
    assert_eq!(
        notifier.ids(),
        vec![NotificationId::CreateOfferLoading, NotificationId::CreateOfferError]
    );
}

#[tokio::test]
async fn test_private_offer_sends_buyer() {
    let buyer = Address::repeat_byte(0x33);
    let (backend, _, actions) = actions(MockBackend::connected());
    let form = SellFormValues {
        is_private_offer: true,
        buyer_address: buyer.to_string(),
        ..form()
    };

    let SubmitOutcome::Submitted { confirmation, .. } = actions.submit(&form).await else {
        panic!("expected a submission");
    };
    confirmation.await.unwrap();
    assert_eq!(backend.submitted.lock().unwrap()[0].buyer, buyer);
}

#[tokio::test]
async fn test_not_connected_is_skipped() {
    let (backend, notifier, actions) = actions(MockBackend::disconnected());

    let outcome = actions.submit(&form()).await;
    assert!(matches!(outcome, SubmitOutcome::Skipped(SkipReason::NotConnected)));
    assert_eq!(backend.chain_reads.load(Ordering::SeqCst), 0);
    assert!(notifier.events().is_empty());
}

#[tokio::test]
async fn test_invalid_form_is_skipped() {
    let (backend, notifier, actions) = actions(MockBackend::connected());
    let form = SellFormValues {
        buyer_token_address: String::new(),
        ..form()
    };

    let outcome = actions.submit(&form).await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Skipped(SkipReason::InvalidForm(FormError::Missing(_)))
    ));
    assert_eq!(backend.chain_reads.load(Ordering::SeqCst), 0);
    assert!(notifier.events().is_empty());
}

#[tokio::test]
async fn test_submit_error_notifies_invalid() {
    let mut backend = MockBackend::connected();
    backend.fail_submit = true;
    let (backend, notifier, actions) = actions(backend);

    let outcome = actions.submit(&form()).await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert!(!actions.is_submitting());
    assert!(backend.submitted.lock().unwrap().is_empty());
    assert_eq!(notifier.ids(), vec![NotificationId::CreateOfferInvalid]);
}

#[tokio::test]
async fn test_unknown_token_fails_before_signing() {
    let (backend, notifier, actions) = actions(MockBackend::connected());
    let form = SellFormValues {
        offer_token_address: Address::repeat_byte(0x99).to_string(),
        ..form()
    };

    assert!(matches!(actions.submit(&form).await, SubmitOutcome::Failed(_)));
    assert!(backend.permits.lock().unwrap().is_empty());
    assert_eq!(notifier.ids(), vec![NotificationId::CreateOfferInvalid]);
}

#[tokio::test]
async fn test_second_submission_while_in_flight() {
    let gate = Arc::new(Notify::new());
    let mut backend = MockBackend::connected();
    backend.gate = Some(Arc::clone(&gate));
    let (_, _, actions) = actions(backend);
    let form = form();

    let (first, second, _) = tokio::join!(actions.submit(&form), actions.submit(&form), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        gate.notify_one();
    });

    assert!(matches!(first, SubmitOutcome::Submitted { .. }));
    assert!(matches!(second, SubmitOutcome::Skipped(SkipReason::InFlight)));
    assert!(!actions.is_submitting());
}

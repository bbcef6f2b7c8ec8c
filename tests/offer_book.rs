//! Offer book refresh and shutdown.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::timeout;

use yam_market::lifecycle::Shutdown;
use yam_market::offers::{OfferBook, OfferBookState, OfferFilter, OfferPoller};

mod common;
use common::{alice, bob, fast_retry, public_offer, MockSource};

const WAIT: Duration = Duration::from_secs(5);

fn book(source: &Arc<MockSource>) -> OfferBook<MockSource> {
    let poller = OfferPoller::new(Arc::clone(source), fast_retry());
    // Long interval: only the immediate first tick and explicit refreshes run.
    OfferBook::new(poller, OfferFilter::Public, Duration::from_secs(3600))
}

#[tokio::test]
async fn test_poll_once_keeps_listing_on_error() {
    let source = Arc::new(MockSource::with_offers(vec![public_offer(alice(), 1)]));
    let book = book(&source);
    let state = book.subscribe();
    assert_eq!(*state.borrow(), OfferBookState::Loading);
    assert!(book.refresh_handle().is_refreshing());

    let report = book.poll_once().await.unwrap();
    assert_eq!(report.listed, 1);
    assert_eq!(state.borrow().offers().len(), 1);
    assert!(!book.refresh_handle().is_refreshing());

    source.fail_count.store(true, Ordering::SeqCst);
    assert_eq!(source.health_checks.load(Ordering::SeqCst), 0);
    assert!(book.poll_once().await.is_none());
    assert_eq!(state.borrow().offers().len(), 1);
    assert_eq!(source.health_checks.load(Ordering::SeqCst), 1);
    assert!(!book.refresh_handle().is_refreshing());
}

#[tokio::test]
async fn test_refresh_during_pass_stays_pending() {
    let source = Arc::new(MockSource::with_offers(vec![public_offer(alice(), 1)]));
    let gate = Arc::new(Notify::new());
    *source.show_gate.lock().unwrap() = Some(Arc::clone(&gate));
    let book = book(&source);
    let handle = book.refresh_handle();

    let (report, ()) = tokio::join!(book.poll_once(), async {
        source.show_started.notified().await;
        handle.refresh();
        gate.notify_one();
    });
    assert_eq!(report.unwrap().listed, 1);
    // Requested after the pass had started, so still owed.
    assert!(handle.is_refreshing());

    *source.show_gate.lock().unwrap() = None;
    book.poll_once().await.unwrap();
    assert!(!handle.is_refreshing());
}

#[tokio::test]
async fn test_shutdown_mid_pass_publishes_nothing() {
    let source = Arc::new(MockSource::with_offers(vec![public_offer(alice(), 1)]));
    *source.show_gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    let book = book(&source);
    let state = book.subscribe();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(book.run(shutdown.subscribe()));

    timeout(WAIT, source.show_started.notified()).await.unwrap();
    shutdown.trigger();
    timeout(WAIT, task).await.unwrap().unwrap();

    assert_eq!(*state.borrow(), OfferBookState::Loading);
}

#[tokio::test]
async fn test_run_refresh_and_shutdown() {
    let source = Arc::new(MockSource::with_offers(vec![public_offer(alice(), 1)]));
    let book = book(&source);
    let mut state = book.subscribe();
    let refresh = book.refresh_handle();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(book.run(shutdown.subscribe()));

    timeout(WAIT, state.changed()).await.unwrap().unwrap();
    assert_eq!(state.borrow_and_update().offers().len(), 1);

    source.create(public_offer(bob(), 2));
    refresh.refresh();
    assert!(refresh.is_refreshing());
    timeout(WAIT, state.changed()).await.unwrap().unwrap();
    {
        let current = state.borrow_and_update();
        let ids: Vec<&str> = current.offers().iter().map(|o| o.offer_id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
    }

    shutdown.trigger();
    timeout(WAIT, task).await.unwrap().unwrap();
    // The book is gone with its sender.
    assert!(state.changed().await.is_err());
}

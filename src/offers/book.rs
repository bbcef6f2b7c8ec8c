//! Continuously refreshed offer listing.
//!
//! ```text
//! interval tick ─┐
//! refresh()  ────┼─▶ OfferPoller::fetch ─▶ watch::Sender<OfferBookState> ─▶ subscribers
//! shutdown  ─────┘   (in-flight pass is discarded on shutdown)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Notify};
use tokio::time::MissedTickBehavior;

use crate::blockchain::BlockchainResult;
use crate::offers::poller::{OfferPoller, PollReport, PollResult};
use crate::offers::source::OfferSource;
use crate::offers::types::{Offer, OfferFilter};

/// What subscribers currently see.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OfferBookState {
    /// No pass has completed yet.
    #[default]
    Loading,
    Ready(Vec<Offer>),
}

impl OfferBookState {
    pub fn offers(&self) -> &[Offer] {
        match self {
            OfferBookState::Loading => &[],
            OfferBookState::Ready(offers) => offers,
        }
    }
}

/// Cloneable trigger for an immediate refresh.
///
/// Requests are numbered. A published pass settles every request made
/// before it started, so a `refresh()` issued mid-pass stays pending.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    notify: Arc<Notify>,
    requested: Arc<AtomicU64>,
    settled: Arc<AtomicU64>,
}

impl RefreshHandle {
    fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
            // The first pass is owed from the start.
            requested: Arc::new(AtomicU64::new(1)),
            settled: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Ask for a pass as soon as the current one (if any) finishes.
    pub fn refresh(&self) {
        self.requested.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// True from the moment a pass is requested until a pass started after
    /// the request is published.
    pub fn is_refreshing(&self) -> bool {
        self.requested.load(Ordering::SeqCst) > self.settled.load(Ordering::SeqCst)
    }

    /// Number the pass about to start.
    fn begin(&self) -> u64 {
        self.requested.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn settle(&self, pass: u64) {
        self.settled.fetch_max(pass, Ordering::SeqCst);
    }
}

pub struct OfferBook<S> {
    poller: OfferPoller<S>,
    filter: OfferFilter,
    interval: Duration,
    trigger: RefreshHandle,
    state_tx: watch::Sender<OfferBookState>,
}

impl<S: OfferSource> OfferBook<S> {
    pub fn new(poller: OfferPoller<S>, filter: OfferFilter, interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(OfferBookState::Loading);
        Self {
            poller,
            filter,
            interval,
            trigger: RefreshHandle::new(),
            state_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<OfferBookState> {
        self.state_tx.subscribe()
    }

    pub fn refresh_handle(&self) -> RefreshHandle {
        self.trigger.clone()
    }

    pub fn filter(&self) -> OfferFilter {
        self.filter
    }

    /// Run a single pass and publish it.
    pub async fn poll_once(&self) -> Option<PollReport> {
        let pass = self.trigger.begin();
        let result = self.poller.fetch(self.filter).await;
        self.publish(pass, result).await
    }

    /// A failed pass keeps the previous listing and checks the RPC.
    async fn publish(
        &self,
        pass: u64,
        result: BlockchainResult<PollResult>,
    ) -> Option<PollReport> {
        let report = match result {
            Ok(PollResult { offers, report, .. }) => {
                self.state_tx.send_replace(OfferBookState::Ready(offers));
                Some(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Offer poll failed, keeping previous listing");
                if !self.poller.source().is_healthy().await {
                    tracing::warn!("Offer source unhealthy");
                }
                None
            }
        };
        self.trigger.settle(pass);
        report
    }

    /// Poll on every interval tick and on every refresh request until shutdown.
    ///
    /// The first tick fires immediately. A pass still running when shutdown
    /// arrives is dropped without publishing.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            filter = ?self.filter,
            "Offer book started"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {}
                _ = self.trigger.notify.notified() => {
                    tracing::debug!("Refresh requested");
                }
            }

            let pass = self.trigger.begin();
            let result = tokio::select! {
                result = self.poller.fetch(self.filter) => result,
                _ = shutdown.recv() => {
                    tracing::debug!("Discarding in-flight poll");
                    break;
                }
            };
            self.publish(pass, result).await;
        }

        tracing::info!("Offer book stopped");
    }
}

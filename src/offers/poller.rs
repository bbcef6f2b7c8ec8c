//! One pass over the exchange: reconcile events with the live offer count,
//! fetch each surviving offer, scale it, and filter it.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::blockchain::{BlockchainError, BlockchainResult};
use crate::observability::metrics;
use crate::offers::source::OfferSource;
use crate::offers::types::{Offer, OfferFilter, OnChainOffer, TokenMetadata};
use crate::resilience::{retry_async, RetryPolicy};
use crate::units::{to_decimal_string, UnitsError};

/// Counters describing one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollReport {
    /// Ids that survived the event reconciliation.
    pub candidates: usize,
    /// Offers that passed the filter.
    pub listed: usize,
    /// Offers dropped because a read or a conversion failed.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct PollResult {
    pub offers: Vec<Offer>,
    pub report: PollReport,
    pub elapsed: Duration,
}

pub struct OfferPoller<S> {
    source: Arc<S>,
    retry: RetryPolicy,
}

impl<S> Clone for OfferPoller<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            retry: self.retry,
        }
    }
}

impl<S: OfferSource> OfferPoller<S> {
    pub fn new(source: Arc<S>, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Ids worth fetching: every id below the count plus any id seen in a
    /// creation event, minus every deleted id.
    pub async fn candidate_ids(&self) -> BlockchainResult<BTreeSet<u64>> {
        let source = &self.source;
        let deleted: BTreeSet<u64> =
            retry_async(&self.retry, "deleted_offer_ids", move || source.deleted_offer_ids())
                .await?
                .into_iter()
                .collect();
        let count = retry_async(&self.retry, "offer_count", move || source.offer_count()).await?;
        let created = match retry_async(&self.retry, "created_offer_ids", move || {
            source.created_offer_ids()
        })
        .await
        {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Creation events unavailable, relying on offer count");
                Vec::new()
            }
        };

        let candidates: BTreeSet<u64> = (0..count)
            .chain(created)
            .filter(|id| !deleted.contains(id))
            .collect();

        tracing::debug!(
            offer_count = count,
            deleted = deleted.len(),
            candidates = candidates.len(),
            "Reconciled offer ids"
        );
        Ok(candidates)
    }

    /// Run one poll pass.
    ///
    /// Failing to list ids fails the pass. A failure on a single offer only skips
    /// that offer.
    pub async fn fetch(&self, filter: OfferFilter) -> BlockchainResult<PollResult> {
        let started = Instant::now();
        let candidates = match self.candidate_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                metrics::record_poll_failure();
                return Err(e);
            }
        };

        let mut report = PollReport {
            candidates: candidates.len(),
            ..PollReport::default()
        };
        let mut offers = Vec::new();

        for id in candidates {
            match self.fetch_one(id).await {
                Ok((raw, offer)) => {
                    if filter.matches(&raw) {
                        offers.push(offer);
                    }
                }
                Err(e) => {
                    report.skipped += 1;
                    tracing::warn!(offer_id = id, error = %e, "Error when fetching offer");
                }
            }
        }

        report.listed = offers.len();
        let elapsed = started.elapsed();
        metrics::record_poll(report.listed, report.skipped, elapsed);
        tracing::info!(
            listed = report.listed,
            skipped = report.skipped,
            candidates = report.candidates,
            elapsed_ms = elapsed.as_millis() as u64,
            "Offers polled"
        );

        Ok(PollResult {
            offers,
            report,
            elapsed,
        })
    }

    async fn fetch_one(&self, id: u64) -> BlockchainResult<(OnChainOffer, Offer)> {
        let source = &self.source;
        let raw = retry_async(&self.retry, "show_offer", move || source.show_offer(id)).await?;
        let offer_token = source.token_metadata(raw.offer_token).await?;
        let buyer_token = source.token_metadata(raw.buyer_token).await?;

        let offer = build_offer(id, &raw, &offer_token, &buyer_token)
            .map_err(|e| BlockchainError::Decode(e.to_string()))?;
        Ok((raw, offer))
    }
}

/// Scale price by the buyer token's decimals and amount by the offer token's.
pub fn build_offer(
    id: u64,
    raw: &OnChainOffer,
    offer_token: &TokenMetadata,
    buyer_token: &TokenMetadata,
) -> Result<Offer, UnitsError> {
    Ok(Offer {
        offer_id: id.to_string(),
        offer_token_address: raw.offer_token,
        offer_token_name: offer_token.name.clone(),
        offer_token_decimals: offer_token.decimals.to_string(),
        buyer_token_address: raw.buyer_token,
        buyer_token_name: buyer_token.name.clone(),
        buyer_token_decimals: buyer_token.decimals.to_string(),
        seller_address: raw.seller,
        buyer_address: raw.buyer,
        price: to_decimal_string(raw.price, buyer_token.decimals)?,
        amount: to_decimal_string(raw.amount, offer_token.decimals)?,
    })
}

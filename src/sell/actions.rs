//! Offer creation: validate, sign a permit, submit, then follow the receipt.

use alloy::primitives::{Address, TxHash};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::blockchain::{BlockchainError, ConfirmationStatus};
use crate::contracts::abi::Permit;
use crate::notifications::{NotificationId, NotificationPayload, Notifier};
use crate::observability::metrics;
use crate::permit::{deadline_from_now, OFFER_PERMIT_TTL_SECS};
use crate::sell::backend::{CreateOfferCall, SellBackend};
use crate::sell::form::{FormError, SellFormValues, ValidatedSellForm};
use crate::units::{parse_decimal, UnitsError};

#[derive(Debug, Error)]
pub enum SellError {
    #[error(transparent)]
    Units(#[from] UnitsError),

    #[error(transparent)]
    Chain(#[from] BlockchainError),
}

/// Why a submission never reached the chain.
#[derive(Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotConnected,
    InFlight,
    InvalidForm(FormError),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Skipped(SkipReason),
    Failed(SellError),
    /// Transaction broadcast. The handle resolves to the notification that
    /// closed the loading one.
    Submitted {
        tx_hash: TxHash,
        confirmation: JoinHandle<NotificationId>,
    },
}

pub struct SellActions<B, N> {
    backend: Arc<B>,
    notifier: Arc<N>,
    submitting: AtomicBool,
}

impl<B, N> SellActions<B, N>
where
    B: SellBackend + 'static,
    N: Notifier + 'static,
{
    pub fn new(backend: Arc<B>, notifier: Arc<N>) -> Self {
        Self {
            backend,
            notifier,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub async fn submit(&self, form: &SellFormValues) -> SubmitOutcome {
        let Some(account) = self.backend.account() else {
            return skipped(SkipReason::NotConnected);
        };
        let valid = match form.validate() {
            Ok(valid) => valid,
            Err(e) => {
                tracing::debug!(error = %e, "Sell form rejected");
                return skipped(SkipReason::InvalidForm(e));
            }
        };
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return skipped(SkipReason::InFlight);
        }

        let sent = self.create_offer(account, &valid).await;
        self.submitting.store(false, Ordering::Release);

        match sent {
            Ok(tx_hash) => {
                metrics::record_submission("submitted");
                let confirmation = self.follow(tx_hash);
                SubmitOutcome::Submitted {
                    tx_hash,
                    confirmation,
                }
            }
            Err(e) => {
                tracing::error!(
                    offer_token = %valid.offer_token,
                    buyer_token = %valid.buyer_token,
                    error = %e,
                    "Offer creation failed"
                );
                metrics::record_submission("failed");
                self.notifier
                    .show(NotificationId::CreateOfferInvalid.build(None));
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn create_offer(
        &self,
        account: Address,
        form: &ValidatedSellForm,
    ) -> Result<TxHash, SellError> {
        let backend = &self.backend;
        let offer_decimals = backend.token_decimals(form.offer_token).await?;
        let buyer_decimals = backend.token_decimals(form.buyer_token).await?;
        let amount = parse_decimal(&form.amount, offer_decimals)?;
        let price = parse_decimal(&form.price, buyer_decimals)?;

        let allowance = backend.allowance(form.offer_token, account).await?;
        let (domain, nonce) = backend.permit_params(form.offer_token, account).await?;
        let permit = Permit {
            owner: account,
            spender: backend.exchange_address(),
            value: amount.saturating_add(allowance),
            nonce,
            deadline: deadline_from_now(OFFER_PERMIT_TTL_SECS),
        };
        let signature = backend.sign_permit(&domain, &permit).await?;

        let call = CreateOfferCall {
            offerToken: form.offer_token,
            buyerToken: form.buyer_token,
            buyer: form.buyer,
            price,
            // The contract calls `permit` with the offer amount, so both must match.
            amount: permit.value,
            deadline: signature.deadline,
            v: signature.v,
            r: signature.r,
            s: signature.s,
        };
        let tx_hash = backend.submit_offer(call).await?;

        tracing::info!(
            tx_hash = %tx_hash,
            offer_token = %form.offer_token,
            buyer_token = %form.buyer_token,
            private = form.buyer != Address::ZERO,
            "Offer submitted"
        );
        Ok(tx_hash)
    }

    /// Show the loading notification and replace it once the receipt is in.
    fn follow(&self, tx_hash: TxHash) -> JoinHandle<NotificationId> {
        let hash = tx_hash.to_string();
        let payload = NotificationPayload {
            key: hash.clone(),
            href: self.backend.tx_url(&tx_hash),
            hash,
        };
        self.notifier
            .show(NotificationId::CreateOfferLoading.build(Some(&payload)));

        let backend = Arc::clone(&self.backend);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let id = match backend.wait_for_receipt(tx_hash).await {
                Ok(status) if status.status_code() == 1 => NotificationId::CreateOfferSuccess,
                Ok(ConfirmationStatus::Failed(reason)) => {
                    tracing::warn!(tx_hash = %tx_hash, reason = %reason, "Offer transaction failed");
                    NotificationId::CreateOfferError
                }
                Ok(status) => {
                    tracing::warn!(tx_hash = %tx_hash, status = ?status, "Offer transaction unconfirmed");
                    NotificationId::CreateOfferError
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt unavailable");
                    NotificationId::CreateOfferError
                }
            };
            metrics::record_submission(if id == NotificationId::CreateOfferSuccess {
                "confirmed"
            } else {
                "reverted"
            });
            notifier.update(id.build(Some(&payload)));
            id
        })
    }
}

fn skipped(reason: SkipReason) -> SubmitOutcome {
    tracing::debug!(reason = ?reason, "Submission skipped");
    metrics::record_submission("skipped");
    SubmitOutcome::Skipped(reason)
}

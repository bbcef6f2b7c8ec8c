//! Confirmation monitoring for submitted transactions.

use alloy::primitives::TxHash;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};

/// The parts of a receipt the wait looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MinedReceipt {
    success: bool,
    block_number: Option<u64>,
}

/// Chain reads needed to follow a transaction.
trait ReceiptSource: Sync {
    fn receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = BlockchainResult<Option<MinedReceipt>>> + Send;

    fn block_number(&self) -> impl Future<Output = BlockchainResult<u64>> + Send;
}

impl ReceiptSource for BlockchainClient {
    async fn receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<MinedReceipt>> {
        Ok(self
            .get_transaction_receipt(tx_hash)
            .await?
            .map(|r| MinedReceipt {
                success: r.status(),
                block_number: r.block_number,
            }))
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.get_block_number().await
    }
}

/// Poll for the receipt of `tx_hash` until it has the configured depth.
///
/// RPC errors while polling are retried on the next tick. Gives up with
/// [`BlockchainError::ConfirmationTimeout`] after the configured timeout.
pub async fn wait_for_confirmation(
    client: &BlockchainClient,
    tx_hash: TxHash,
) -> BlockchainResult<ConfirmationStatus> {
    let config = client.config();
    poll_confirmation(
        client,
        tx_hash,
        config.confirmation_blocks,
        Duration::from_secs(config.confirmation_timeout_secs),
        Duration::from_millis(config.receipt_poll_ms),
    )
    .await
}

async fn poll_confirmation<R: ReceiptSource>(
    source: &R,
    tx_hash: TxHash,
    required_confirmations: u32,
    wait: Duration,
    poll_interval: Duration,
) -> BlockchainResult<ConfirmationStatus> {
    let result = timeout(wait, async {
        let mut ticker = interval(poll_interval);

        loop {
            ticker.tick().await;

            let receipt = match source.receipt(tx_hash).await {
                Ok(Some(r)) => r,
                Ok(None) => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
                Err(e) => {
                    tracing::debug!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed");
                    continue;
                }
            };

            if !receipt.success {
                return ConfirmationStatus::Failed("Transaction reverted".to_string());
            }

            let current_block = match source.block_number().await {
                Ok(n) => n,
                Err(e) => {
                    tracing::debug!(tx_hash = %tx_hash, error = %e, "Block number lookup failed");
                    continue;
                }
            };
            let tx_block = receipt.block_number.unwrap_or(current_block);
            let status = confirmation_depth(tx_block, current_block, required_confirmations);

            if let ConfirmationStatus::Confirmed { .. } = status {
                return status;
            }

            tracing::debug!(
                tx_hash = %tx_hash,
                status = ?status,
                "Waiting for confirmations"
            );
        }
    })
    .await;

    result.map_err(|_| BlockchainError::ConfirmationTimeout(wait.as_secs()))
}

/// A receipt in `tx_block` counts as one confirmation.
fn confirmation_depth(tx_block: u64, current_block: u64, required: u32) -> ConfirmationStatus {
    let current = (current_block.saturating_sub(tx_block) + 1).min(u32::MAX as u64) as u32;
    if current >= required {
        ConfirmationStatus::Confirmed {
            block_number: tx_block,
        }
    } else {
        ConfirmationStatus::Confirming { current, required }
    }
}

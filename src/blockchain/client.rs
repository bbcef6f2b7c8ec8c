//! Blockchain RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoints of one chain
//! - Query chain state (block number, logs, contract calls, receipts)
//! - Submit transactions through an optional signing provider
//! - Handle timeouts and network errors gracefully

use alloy::network::EthereumWallet;
use alloy::primitives::{Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log, TransactionReceipt, TransactionRequest};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;

/// RPC client for a single chain, with failover across endpoints.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Read providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Signing provider on the primary endpoint, present once a wallet is attached.
    signer: Option<Arc<dyn Provider + Send + Sync>>,
    rpc_url: url::Url,
    chain_id: u64,
    config: BlockchainConfig,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a read-only client for `chain_id`.
    ///
    /// Invalid failover URLs are skipped with a warning; an invalid primary URL is an error.
    pub fn new(
        chain_id: u64,
        rpc_url: &str,
        failover_urls: &[String],
        config: BlockchainConfig,
    ) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url.clone()))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                ),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::debug!(
            rpc_url = %rpc_url,
            chain_id = chain_id,
            failovers = providers.len() - 1,
            "Blockchain client created"
        );

        Ok(Self {
            providers,
            signer: None,
            rpc_url: primary_url,
            chain_id,
            config,
            timeout_duration,
        })
    }

    /// Attach a wallet, enabling [`send_transaction`](Self::send_transaction).
    pub fn with_wallet(mut self, wallet: &Wallet) -> Self {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(wallet.signer().clone()))
            .connect_http(self.rpc_url.clone());
        self.signer = Some(Arc::new(provider) as Arc<dyn Provider + Send + Sync>);
        self
    }

    /// Whether a wallet is attached.
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Verify the connected chain ID matches the expected one.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let actual = self.get_chain_id().await?;
        if actual != self.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.chain_id,
                actual,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_chain_id()).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_block_number()).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get block number".to_string()))
    }

    /// Fetch logs matching `filter`.
    pub async fn get_logs(&self, filter: &Filter) -> BlockchainResult<Vec<Log>> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_logs(filter)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get logs".to_string()))
    }

    /// Execute a read-only `eth_call` and return the raw return data.
    pub async fn call(&self, tx: &TransactionRequest) -> BlockchainResult<Bytes> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.call(tx.clone()).into_future();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to execute call".to_string()))
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_transaction_receipt(tx_hash)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get receipt".to_string()))
    }

    /// Sign and broadcast a transaction. Nonce, gas and chain id are filled by the provider.
    ///
    /// Never retried or failed over: a broadcast may have reached the node even when the
    /// response was lost.
    pub async fn send_transaction(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| BlockchainError::NotAvailable("no wallet connected".to_string()))?;

        match timeout(self.timeout_duration, signer.send_transaction(tx)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(BlockchainError::Rpc(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    /// Check if the chain is reachable.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_rpc_health(self.chain_id, healthy);
        healthy
    }

    /// Chain this client talks to.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("chain_id", &self.chain_id)
            .field("providers", &self.providers.len())
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

//! Write side of the exchange, abstracted for the sell flow.

use alloy::primitives::{Address, TxHash, U256};
use std::future::Future;

use crate::blockchain::transaction::wait_for_confirmation;
use crate::blockchain::{BlockchainError, BlockchainResult, ConfirmationStatus, Wallet};
use crate::chains::Chain;
use crate::contracts::abi::{IRealTokenYamUpgradeable, Permit};
use crate::contracts::YamContract;
use crate::offers::OfferSource;
use crate::permit::{self, PermitDomain, PermitSignature};

pub type CreateOfferCall = IRealTokenYamUpgradeable::createOfferWithPermitCall;

/// Everything creating an offer needs from the chain and the wallet.
pub trait SellBackend: Send + Sync {
    /// Connected account, if a wallet is attached.
    fn account(&self) -> Option<Address>;

    /// Spender of the permit.
    fn exchange_address(&self) -> Address;

    fn tx_url(&self, hash: &TxHash) -> String;

    fn token_decimals(&self, token: Address)
        -> impl Future<Output = BlockchainResult<u8>> + Send;

    /// Allowance already granted by `owner` to the exchange.
    fn allowance(
        &self,
        token: Address,
        owner: Address,
    ) -> impl Future<Output = BlockchainResult<U256>> + Send;

    /// EIP-712 domain and current permit nonce of `owner` on `token`.
    fn permit_params(
        &self,
        token: Address,
        owner: Address,
    ) -> impl Future<Output = BlockchainResult<(PermitDomain, U256)>> + Send;

    fn sign_permit(
        &self,
        domain: &PermitDomain,
        permit: &Permit,
    ) -> impl Future<Output = BlockchainResult<PermitSignature>> + Send;

    fn submit_offer(
        &self,
        call: CreateOfferCall,
    ) -> impl Future<Output = BlockchainResult<TxHash>> + Send;

    fn wait_for_receipt(
        &self,
        hash: TxHash,
    ) -> impl Future<Output = BlockchainResult<ConfirmationStatus>> + Send;
}

/// [`SellBackend`] over a live deployment and a local wallet.
#[derive(Debug, Clone)]
pub struct YamSeller {
    contract: YamContract,
    wallet: Option<Wallet>,
    chain: Chain,
}

impl YamSeller {
    pub fn new(contract: YamContract, wallet: Option<Wallet>, chain: Chain) -> Self {
        Self {
            contract,
            wallet,
            chain,
        }
    }

    fn wallet(&self) -> BlockchainResult<&Wallet> {
        self.wallet
            .as_ref()
            .ok_or_else(|| BlockchainError::NotAvailable("no wallet connected".to_string()))
    }
}

impl SellBackend for YamSeller {
    fn account(&self) -> Option<Address> {
        self.wallet.as_ref().map(Wallet::address)
    }

    fn exchange_address(&self) -> Address {
        self.contract.address()
    }

    fn tx_url(&self, hash: &TxHash) -> String {
        self.chain.tx_url(hash)
    }

    async fn token_decimals(&self, token: Address) -> BlockchainResult<u8> {
        self.contract.token_decimals(token).await
    }

    async fn allowance(&self, token: Address, owner: Address) -> BlockchainResult<U256> {
        self.contract
            .allowance(token, owner, self.contract.address())
            .await
    }

    async fn permit_params(
        &self,
        token: Address,
        owner: Address,
    ) -> BlockchainResult<(PermitDomain, U256)> {
        let metadata = self.contract.token_metadata(token).await?;
        let version = self.contract.permit_version(token).await;
        let nonce = self.contract.permit_nonce(token, owner).await?;
        let domain = PermitDomain {
            name: metadata.name,
            version,
            chain_id: self.chain.chain_id.as_u64(),
            token,
        };
        Ok((domain, nonce))
    }

    async fn sign_permit(
        &self,
        domain: &PermitDomain,
        permit: &Permit,
    ) -> BlockchainResult<PermitSignature> {
        permit::sign_permit(self.wallet()?, domain, permit).await
    }

    async fn submit_offer(&self, call: CreateOfferCall) -> BlockchainResult<TxHash> {
        self.wallet()?;
        self.contract.submit_offer(call).await
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        wait_for_confirmation(self.contract.client(), hash).await
    }
}

//! In-memory chain doubles shared by the integration tests.
#![allow(dead_code)]

use alloy::primitives::{Address, TxHash, U256};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use yam_market::blockchain::{BlockchainError, BlockchainResult, ConfirmationStatus, Wallet};
use yam_market::config::RetryConfig;
use yam_market::contracts::abi::Permit;
use yam_market::notifications::{Notification, NotificationId, Notifier};
use yam_market::offers::{OfferSource, OnChainOffer, TokenMetadata};
use yam_market::permit::{self, PermitDomain, PermitSignature};
use yam_market::sell::{CreateOfferCall, SellBackend};

pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn offer_token() -> Address {
    Address::repeat_byte(0x11)
}

pub fn buyer_token() -> Address {
    Address::repeat_byte(0x22)
}

pub fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

/// Retries without noticeable delay.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        base_delay_ms: 1,
        max_delay_ms: 2,
    }
}

/// Public offer of `amount` whole offer tokens at 50 buyer tokens.
pub fn public_offer(seller: Address, amount: u64) -> OnChainOffer {
    OnChainOffer {
        offer_token: offer_token(),
        buyer_token: buyer_token(),
        seller,
        buyer: Address::ZERO,
        price: U256::from(50_000_000u64),
        amount: U256::from(amount) * U256::from(10u64).pow(U256::from(18u64)),
    }
}

pub fn private_offer(seller: Address, buyer: Address, amount: u64) -> OnChainOffer {
    OnChainOffer {
        buyer,
        ..public_offer(seller, amount)
    }
}

fn rpc_error(what: &str) -> BlockchainError {
    BlockchainError::Rpc(format!("mock: {what} unavailable"))
}

/// Offer book held in memory.
#[derive(Default)]
pub struct MockSource {
    pub count: AtomicU32,
    pub deleted: Mutex<Vec<u64>>,
    pub created: Mutex<Vec<u64>>,
    pub offers: Mutex<HashMap<u64, OnChainOffer>>,
    /// `show_offer` fails for these ids.
    pub failing: Mutex<HashSet<u64>>,
    pub fail_created: AtomicBool,
    /// Every `offer_count` call fails while set.
    pub fail_count: AtomicBool,
    /// The next n `offer_count` calls fail.
    pub transient_count_failures: AtomicU32,
    pub show_calls: AtomicU32,
    /// While set, `show_offer` waits for a permit on this gate.
    pub show_gate: Mutex<Option<Arc<Notify>>>,
    /// Signalled on every `show_offer` call.
    pub show_started: Notify,
    pub health_checks: AtomicU32,
}

impl MockSource {
    /// Offers with ids 0..n, in order.
    pub fn with_offers(offers: Vec<OnChainOffer>) -> Self {
        let source = Self::default();
        source.count.store(offers.len() as u32, Ordering::SeqCst);
        *source.offers.lock().unwrap() = offers.into_iter().enumerate().map(|(i, o)| (i as u64, o)).collect();
        source
    }

    pub fn delete(&self, id: u64) {
        self.deleted.lock().unwrap().push(id);
    }

    /// Append an offer through a creation event only.
    pub fn create(&self, offer: OnChainOffer) -> u64 {
        let mut offers = self.offers.lock().unwrap();
        let id = offers.keys().max().map_or(0, |m| m + 1);
        offers.insert(id, offer);
        self.created.lock().unwrap().push(id);
        id
    }
}

impl OfferSource for MockSource {
    async fn deleted_offer_ids(&self) -> BlockchainResult<Vec<u64>> {
        Ok(self.deleted.lock().unwrap().clone())
    }

    async fn created_offer_ids(&self) -> BlockchainResult<Vec<u64>> {
        if self.fail_created.load(Ordering::SeqCst) {
            return Err(rpc_error("logs"));
        }
        Ok(self.created.lock().unwrap().clone())
    }

    async fn offer_count(&self) -> BlockchainResult<u64> {
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(rpc_error("getOfferCount"));
        }
        let transient = self.transient_count_failures.load(Ordering::SeqCst);
        if transient > 0 {
            self.transient_count_failures.store(transient - 1, Ordering::SeqCst);
            return Err(rpc_error("getOfferCount"));
        }
        Ok(self.count.load(Ordering::SeqCst) as u64)
    }

    async fn show_offer(&self, id: u64) -> BlockchainResult<OnChainOffer> {
        self.show_calls.fetch_add(1, Ordering::SeqCst);
        self.show_started.notify_one();
        let gate = self.show_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.lock().unwrap().contains(&id) {
            return Err(rpc_error("showOffer"));
        }
        // Unknown ids read as the contract's empty struct.
        Ok(self.offers.lock().unwrap().get(&id).cloned().unwrap_or(OnChainOffer {
            offer_token: offer_token(),
            buyer_token: buyer_token(),
            seller: Address::ZERO,
            buyer: Address::ZERO,
            price: U256::ZERO,
            amount: U256::ZERO,
        }))
    }

    async fn token_metadata(&self, token: Address) -> BlockchainResult<TokenMetadata> {
        if token == offer_token() {
            Ok(TokenMetadata {
                name: "RealToken Test".into(),
                decimals: 18,
            })
        } else if token == buyer_token() {
            Ok(TokenMetadata {
                name: "USD Coin".into(),
                decimals: 6,
            })
        } else {
            Err(rpc_error("decimals"))
        }
    }

    async fn is_healthy(&self) -> bool {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        !self.fail_count.load(Ordering::SeqCst)
    }
}

pub const EXCHANGE: Address = Address::new([0xee; 20]);

/// Exchange with a real local signer and canned chain responses.
pub struct MockBackend {
    pub wallet: Option<Wallet>,
    pub allowance: U256,
    pub receipt: ConfirmationStatus,
    pub fail_submit: bool,
    /// When set, `submit_offer` waits for a notification.
    pub gate: Option<Arc<Notify>>,
    pub submitted: Mutex<Vec<CreateOfferCall>>,
    /// `(owner, spender, value, deadline)` of every signed permit.
    pub permits: Mutex<Vec<(Address, Address, U256, U256)>>,
    pub chain_reads: AtomicU32,
}

impl MockBackend {
    pub fn connected() -> Self {
        Self {
            wallet: Some(Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap()),
            allowance: U256::ZERO,
            receipt: ConfirmationStatus::Confirmed { block_number: 42 },
            fail_submit: false,
            gate: None,
            submitted: Mutex::new(Vec::new()),
            permits: Mutex::new(Vec::new()),
            chain_reads: AtomicU32::new(0),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            wallet: None,
            ..Self::connected()
        }
    }

    pub fn tx_hash() -> TxHash {
        TxHash::repeat_byte(0xab)
    }
}

impl SellBackend for MockBackend {
    fn account(&self) -> Option<Address> {
        self.wallet.as_ref().map(Wallet::address)
    }

    fn exchange_address(&self) -> Address {
        EXCHANGE
    }

    fn tx_url(&self, hash: &TxHash) -> String {
        format!("https://explorer.test/tx/{hash}")
    }

    async fn token_decimals(&self, token: Address) -> BlockchainResult<u8> {
        self.chain_reads.fetch_add(1, Ordering::SeqCst);
        if token == offer_token() {
            Ok(18)
        } else if token == buyer_token() {
            Ok(6)
        } else {
            Err(rpc_error("decimals"))
        }
    }

    async fn allowance(&self, _token: Address, _owner: Address) -> BlockchainResult<U256> {
        self.chain_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.allowance)
    }

    async fn permit_params(
        &self,
        token: Address,
        _owner: Address,
    ) -> BlockchainResult<(PermitDomain, U256)> {
        self.chain_reads.fetch_add(1, Ordering::SeqCst);
        Ok((
            PermitDomain {
                name: "RealToken Test".into(),
                version: "1".into(),
                chain_id: 100,
                token,
            },
            U256::from(3u64),
        ))
    }

    async fn sign_permit(
        &self,
        domain: &PermitDomain,
        permit: &Permit,
    ) -> BlockchainResult<PermitSignature> {
        self.permits
            .lock()
            .unwrap()
            .push((permit.owner, permit.spender, permit.value, permit.deadline));
        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| BlockchainError::NotAvailable("no wallet".into()))?;
        permit::sign_permit(wallet, domain, permit).await
    }

    async fn submit_offer(&self, call: CreateOfferCall) -> BlockchainResult<TxHash> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_submit {
            return Err(BlockchainError::Rpc("mock: user rejected".into()));
        }
        self.submitted.lock().unwrap().push(call);
        Ok(Self::tx_hash())
    }

    async fn wait_for_receipt(&self, _hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        Ok(self.receipt.clone())
    }
}

/// Keeps every notification in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(bool, Notification)>>,
}

impl RecordingNotifier {
    /// `(is_update, notification)` pairs.
    pub fn events(&self) -> Vec<(bool, Notification)> {
        self.events.lock().unwrap().clone()
    }

    pub fn ids(&self) -> Vec<NotificationId> {
        self.events().into_iter().map(|(_, n)| n.id).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notification: Notification) {
        self.events.lock().unwrap().push((false, notification));
    }

    fn update(&self, notification: Notification) {
        self.events.lock().unwrap().push((true, notification));
    }
}

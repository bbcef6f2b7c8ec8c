//! Off-chain EIP-2612 permit signatures.
//!
//! The holder signs an EIP-712 `Permit` message; the exchange submits it with
//! the offer, so no separate `approve` transaction is needed.

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::blockchain::{BlockchainResult, Wallet};
use crate::contracts::abi::Permit;

/// How long a permit signed for a new offer stays valid.
pub const OFFER_PERMIT_TTL_SECS: u64 = 3600;

/// The token-specific half of the EIP-712 domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub token: Address,
}

impl PermitDomain {
    pub fn eip712(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(self.name.clone().into()),
            Some(self.version.clone().into()),
            Some(U256::from(self.chain_id)),
            Some(self.token),
            None,
        )
    }
}

/// Split signature in the `(v, r, s)` form the contract expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermitSignature {
    /// 27 or 28.
    pub v: u8,
    pub r: B256,
    pub s: B256,
    pub deadline: U256,
}

/// Unix timestamp `secs` seconds from now.
pub fn deadline_from_now(secs: u64) -> U256 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    U256::from(now + secs)
}

/// Digest the holder signs.
pub fn permit_digest(domain: &PermitDomain, permit: &Permit) -> B256 {
    permit.eip712_signing_hash(&domain.eip712())
}

/// Sign `permit` with `wallet`. The wallet must be the permit's owner.
pub async fn sign_permit(
    wallet: &Wallet,
    domain: &PermitDomain,
    permit: &Permit,
) -> BlockchainResult<PermitSignature> {
    let digest = permit_digest(domain, permit);
    let signature = wallet.sign_hash(digest).await?;

    tracing::debug!(
        token = %domain.token,
        spender = %permit.spender,
        value = %permit.value,
        "Permit signed"
    );

    Ok(PermitSignature {
        v: 27 + signature.v() as u8,
        r: B256::from(signature.r().to_be_bytes::<32>()),
        s: B256::from(signature.s().to_be_bytes::<32>()),
        deadline: permit.deadline,
    })
}

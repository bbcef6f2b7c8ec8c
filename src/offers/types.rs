//! Offer view models.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::chains::ZERO_ADDRESS;

/// Raw offer as returned by `showOffer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainOffer {
    pub offer_token: Address,
    pub buyer_token: Address,
    pub seller: Address,
    pub buyer: Address,
    /// Price per offer token, in buyer-token base units.
    pub price: U256,
    /// Remaining amount, in offer-token base units.
    pub amount: U256,
}

/// Immutable ERC-20 metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub decimals: u8,
}

/// An offer ready for display; chain-scaled values are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub offer_id: String,
    pub offer_token_address: Address,
    pub offer_token_name: String,
    pub offer_token_decimals: String,
    pub buyer_token_address: Address,
    pub buyer_token_name: String,
    pub buyer_token_decimals: String,
    pub seller_address: Address,
    pub buyer_address: Address,
    pub price: String,
    pub amount: String,
}

/// Which offers a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OfferFilter {
    /// Open offers anyone can take: non-empty and without a designated buyer.
    #[default]
    Public,
    /// Offers created by this account.
    BySeller(Address),
    /// Private offers reserved for this account.
    ByBuyer(Address),
}

impl OfferFilter {
    /// Build from the two listing flags; the seller flag wins when both are set.
    pub fn from_flags(account: Option<Address>, by_seller: bool, by_buyer: bool) -> Self {
        match account {
            Some(a) if by_seller => OfferFilter::BySeller(a),
            Some(a) if by_buyer => OfferFilter::ByBuyer(a),
            _ => OfferFilter::Public,
        }
    }

    pub fn matches(&self, offer: &OnChainOffer) -> bool {
        match self {
            OfferFilter::Public => !offer.amount.is_zero() && offer.buyer == ZERO_ADDRESS,
            OfferFilter::BySeller(account) => offer.seller == *account,
            OfferFilter::ByBuyer(account) => offer.buyer == *account,
        }
    }
}

//! Sell form values and their validation.

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::chains::ZERO_ADDRESS;
use crate::units::{parse_decimal, UnitsError};

/// Smallest price or amount accepted by the form.
pub const MIN_VALUE: &str = "0.000001";

/// Raw user input, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellFormValues {
    pub offer_token_address: String,
    pub buyer_token_address: String,
    /// Price per offer token, in buyer tokens.
    pub price: String,
    /// Offer tokens to sell.
    pub amount: String,
    /// Only used when `is_private_offer` is set.
    pub buyer_address: String,
    pub is_private_offer: bool,
}

impl Default for SellFormValues {
    fn default() -> Self {
        Self {
            offer_token_address: String::new(),
            buyer_token_address: String::new(),
            price: "50".to_string(),
            amount: "1".to_string(),
            buyer_address: ZERO_ADDRESS.to_string(),
            is_private_offer: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} is not a valid address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: {source}")]
    InvalidNumber {
        field: &'static str,
        #[source]
        source: UnitsError,
    },

    #[error("{0} must be at least 0.000001")]
    BelowMinimum(&'static str),

    #[error("a private offer needs a buyer address")]
    MissingPrivateBuyer,
}

/// Form values that passed validation. Numbers are still unscaled: decimals are
/// only known once the tokens are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSellForm {
    pub offer_token: Address,
    pub buyer_token: Address,
    pub price: String,
    pub amount: String,
    /// Zero address for public offers.
    pub buyer: Address,
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Missing(field));
    }
    value.parse().map_err(|_| FormError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

fn check_amount(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Missing(field));
    }
    // 18 digits covers any token the exchange lists.
    let scaled = parse_decimal(value, 18).map_err(|source| FormError::InvalidNumber { field, source })?;
    let minimum = parse_decimal(MIN_VALUE, 18).unwrap_or(U256::from(1u64));
    if scaled < minimum {
        return Err(FormError::BelowMinimum(field));
    }
    Ok(value.to_string())
}

impl SellFormValues {
    pub fn validate(&self) -> Result<ValidatedSellForm, FormError> {
        let offer_token = parse_address("offer token address", &self.offer_token_address)?;
        let buyer_token = parse_address("buyer token address", &self.buyer_token_address)?;
        let price = check_amount("price", &self.price)?;
        let amount = check_amount("amount", &self.amount)?;

        let buyer = if self.is_private_offer {
            match parse_address("buyer address", &self.buyer_address) {
                Ok(a) if a != ZERO_ADDRESS => a,
                Ok(_) | Err(FormError::Missing(_)) => return Err(FormError::MissingPrivateBuyer),
                Err(e) => return Err(e),
            }
        } else {
            ZERO_ADDRESS
        };

        Ok(ValidatedSellForm {
            offer_token,
            buyer_token,
            price,
            amount,
            buyer,
        })
    }
}

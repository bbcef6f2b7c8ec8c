//! Native currencies of the supported chains.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

pub const ETH: Currency = Currency {
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
};

/// xDAI, the gas token of Gnosis Chain.
pub const DAI: Currency = Currency {
    name: "xDAI",
    symbol: "xDAI",
    decimals: 18,
};

//! Minimal ABIs of the contracts the client touches.

use alloy::sol;

sol! {
    /// RealToken YAM: peer-to-peer offer book.
    interface IRealTokenYamUpgradeable {
        #[derive(Debug)]
        event OfferCreated(
            address indexed offerToken,
            address indexed buyerToken,
            address seller,
            address buyer,
            uint256 indexed offerId,
            uint256 price,
            uint256 amount
        );

        #[derive(Debug)]
        event OfferDeleted(uint256 indexed offerId);

        function getOfferCount() external view returns (uint256);

        function showOffer(uint256 offerId)
            external
            view
            returns (
                address offerToken,
                address buyerToken,
                address seller,
                address buyer,
                uint256 price,
                uint256 amount
            );

        function createOfferWithPermit(
            address offerToken,
            address buyerToken,
            address buyer,
            uint256 price,
            uint256 amount,
            uint256 deadline,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external;
    }
}

sol! {
    interface IERC20 {
        function name() external view returns (string);
        function decimals() external view returns (uint8);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

sol! {
    /// EIP-2612 extension (CoinBridgeToken and most bridged stablecoins).
    interface IERC20Permit {
        function nonces(address owner) external view returns (uint256);
        function version() external view returns (string);
    }
}

sol! {
    /// EIP-712 message signed by the token holder.
    #[derive(Debug, PartialEq, Eq)]
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::keccak256;
    use alloy::sol_types::{SolCall, SolEvent, SolStruct};

    #[test]
    fn test_event_signatures() {
        assert_eq!(
            IRealTokenYamUpgradeable::OfferDeleted::SIGNATURE,
            "OfferDeleted(uint256)"
        );
        assert_eq!(
            IRealTokenYamUpgradeable::OfferCreated::SIGNATURE_HASH,
            keccak256("OfferCreated(address,address,address,address,uint256,uint256,uint256)")
        );
    }

    #[test]
    fn test_call_selectors() {
        assert_eq!(
            IRealTokenYamUpgradeable::showOfferCall::SIGNATURE,
            "showOffer(uint256)"
        );
        assert_eq!(IERC20::decimalsCall::SELECTOR, [0x31, 0x3c, 0xe5, 0x67]);
    }

    #[test]
    fn test_permit_type_hash() {
        assert_eq!(
            Permit::eip712_encode_type(),
            "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)"
        );
    }
}

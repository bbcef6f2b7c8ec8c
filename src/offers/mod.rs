//! Offer listing.
//!
//! # Data Flow
//! ```text
//! OfferSource (contracts::YamContract, or a mock)
//!     → poller.rs (deleted/created events + count → candidate ids → showOffer)
//!     → types.rs (scaled Offer, OfferFilter)
//!     → book.rs (interval + refresh loop, watch channel)
//! ```

pub mod book;
pub mod poller;
pub mod source;
pub mod types;

pub use book::{OfferBook, OfferBookState, RefreshHandle};
pub use poller::{build_offer, OfferPoller, PollReport, PollResult};
pub use source::OfferSource;
pub use types::{Offer, OfferFilter, OnChainOffer, TokenMetadata};

//! Selling: create an offer against a permit instead of an `approve`.

pub mod actions;
pub mod backend;
pub mod form;

pub use actions::{SellActions, SellError, SkipReason, SubmitOutcome};
pub use backend::{CreateOfferCall, SellBackend, YamSeller};
pub use form::{FormError, SellFormValues, ValidatedSellForm, MIN_VALUE};

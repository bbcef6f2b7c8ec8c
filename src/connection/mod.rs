//! Wallet and network connection.
//!
//! The network connector is always active so offers can be listed without a
//! wallet. The local key connector is restored eagerly when the previous run
//! used it.

pub mod eager;
pub mod session;

pub use eager::{connect_eagerly, connect_with, Connection, ConnectionError};
pub use session::{Connector, Session, SessionError, SessionStore};

//! Persisted session state.
//!
//! A tiny key/value store standing in for browser-local storage. The only
//! key the application uses is `walletAddress`.

pub mod store;

pub use store::{SessionError, SessionStore, WALLET_ADDRESS_KEY};

//! Typed client for the HopeChain JSON API.

pub mod client;

pub use client::{
    ConnectionStatus, Dashboard, DonationReceipt, HopeChainClient, SdkError, StatsSnapshot,
};

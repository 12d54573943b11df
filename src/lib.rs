//! HopeChain: a minimal donation service on the Stellar testnet.

pub mod config;
pub mod donation;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod session;
pub mod stellar;

pub use config::schema::AppConfig;
pub use donation::DonationService;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

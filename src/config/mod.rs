//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults pointing at the Stellar testnet
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    AppConfig, ContractConfig, LogFormat, NetworkConfig, ObservabilityConfig, ServerConfig,
    SessionConfig, StatsConfig, StatsMode, TimeoutConfig, WalletConfig,
};
pub use validation::{validate_config, ValidationError};

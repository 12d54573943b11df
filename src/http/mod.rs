//! HTTP surface: the two screens and the JSON API behind them.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (x-request-id, span)
//!     → server.rs (routes → DonationService)
//!     → response.rs (error → status + JSON body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};

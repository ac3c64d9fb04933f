//! # Bazaar Server
//!
//! HTTP JSON API for the Bazaar POS backend.
//!
//! Library target so integration tests can build the router against an
//! in-memory database without binding a socket.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::router;
pub use state::AppState;

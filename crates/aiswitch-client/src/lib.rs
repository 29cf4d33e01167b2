//! aiswitch REST Client
//!
//! This crate talks to the aiswitch configuration and logging API:
//! - HTTP client construction
//! - `ConsoleApi` trait and its `reqwest` implementation
//! - `ConsoleStore`, the cached read state invalidated by mutations

pub mod api;
pub mod client;
pub mod store;

pub use api::{ApiConfig, ConsoleApi, HttpConsoleApi};
pub use store::ConsoleStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status_code}: {message}")]
    Status { status_code: u16, message: String },

    /// A 200 acknowledgement whose message is not a success
    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] aiswitch_core::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

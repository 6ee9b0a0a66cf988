//! Hosted record-store client for Meridian Market
//!
//! The storefront delegates all persistence and authentication to a
//! hosted backend-as-a-service exposing a generic REST record store.
//! This crate provides the typed client for that boundary: request
//! builders with equality/inequality filters and ordering, an HTTP
//! implementation, retry with exponential backoff, admin credential
//! checking, and an in-memory store for tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod rest;
pub mod test_utils;

pub use auth::Credentials;
pub use rest::{
    DeleteRequest, Filter, HttpRecordStore, InsertRequest, OrderBy, RecordStore, RetryConfig,
    SelectRequest, StoreConfig, StoreError, UpdateRequest,
};
pub use test_utils::MemoryStore;

/// Errors raised while loading client configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    /// The configured base URL could not be used
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}

//! Error types for the tokenstore library.
//!
//! This module defines all error types used throughout the library.
//! All errors implement `std::error::Error` and are designed to provide
//! clear, actionable error messages.
//!
//! Lookups that simply find nothing are not errors: they return `Ok(None)`
//! or `Ok(false)`. The variants below cover structural problems only:
//! a malformed alias, a missing token, a backend outage. No operation is
//! retried internally; retry policy belongs to the caller or the backend.

use thiserror::Error;

/// The main error type for tokenstore operations.
#[derive(Error, Debug)]
pub enum TokenStoreError {
    /// The store was used before a token source was bound.
    #[error("Token framework not initialized")]
    NotInitialized,

    /// Backend communication with a token failed. Fatal to the in-flight
    /// operation; not retried by this layer.
    #[error("Token unavailable: {0}")]
    TokenUnavailable(String),

    /// No token with the given name is registered.
    #[error("Token not found: {0}")]
    TokenNotFound(String),

    /// Malformed alias string, e.g. more than one `:` separator.
    #[error("Invalid alias: {0}")]
    InvalidAlias(String),

    /// Mutation that the token model cannot express.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Certificate bytes failed to decode.
    #[error("Certificate encoding error: {0}")]
    Encoding(String),
}

impl From<der::Error> for TokenStoreError {
    fn from(err: der::Error) -> Self {
        TokenStoreError::Encoding(err.to_string())
    }
}

/// A specialized Result type for tokenstore operations.
pub type Result<T> = std::result::Result<T, TokenStoreError>;

//! tokenstore: an aggregated keystore over cryptographic tokens.
//!
//! This library bridges a collection of independent, token-scoped
//! credential repositories (certificates, private keys, and symmetric
//! keys, each owned by one of several security tokens) into a single
//! logical keystore addressed by opaque string aliases. It covers:
//!
//! - Token aggregation and exclusion rules (the administrative
//!   internal-crypto token never appears in enumeration)
//! - Deterministic alias derivation and parsing
//! - Certificate/key entry disambiguation with a
//!   cert-first-then-key lookup policy
//! - Trust-chain construction across token boundaries
//!
//! # Architecture
//!
//! The store depends only on the [`backend::TokenBackend`] capability
//! interface; cryptographic operations, token authentication, and TLS
//! integration are external collaborators behind it. The store holds
//! no state beyond its backend reference and optional token scope:
//! every operation re-derives its view from live token state, so there
//! is nothing to go stale and reads are safe from any thread.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tokenstore::backend::memory::MemoryBackend;
//! use tokenstore::backend::{KeyAlgorithm, PrivateKeyEntry};
//! use tokenstore::store::TokenKeyStore;
//!
//! # fn example() -> tokenstore::error::Result<()> {
//! let backend = MemoryBackend::new();
//! backend.add_private_key(
//!     "internal",
//!     PrivateKeyEntry::new(vec![0xab, 0xcd], KeyAlgorithm::Rsa),
//! )?;
//!
//! let store = TokenKeyStore::new(Arc::new(backend));
//! assert!(store.contains_alias("abcd")?);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod store;

// Re-export commonly used types
pub use error::{Result, TokenStoreError};
pub use store::TokenKeyStore;

//! The aggregated keystore built from token state.
//!
//! Control flow: [`facade::TokenKeyStore`] parses or derives aliases
//! via [`alias`], resolves tokens via [`registry`], locates entries via
//! [`resolver`], and builds issuer chains via [`chain`]. No layer
//! caches results; every call re-queries live token state.

pub mod alias;
pub mod chain;
pub mod facade;
pub mod registry;
pub mod resolver;

pub use facade::TokenKeyStore;
pub use registry::TokenRegistry;

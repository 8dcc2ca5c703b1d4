//! Token enumeration and resolution.
//!
//! The registry is a thin view over a [`TokenBackend`] that applies the
//! aggregation rules: the administrative internal-crypto token never
//! appears in enumeration, and the internal key-storage token is the
//! default target for unprefixed aliases. Enumeration order follows the
//! backend's registration order, which is stable within a process run;
//! first-match-wins alias resolution is deterministic because of it.

use crate::backend::{Token, TokenBackend};
use crate::error::{Result, TokenStoreError};
use std::sync::Arc;

/// Registry over the tokens of a single backend.
#[derive(Clone)]
pub struct TokenRegistry {
    backend: Arc<dyn TokenBackend>,
}

impl TokenRegistry {
    /// Create a registry over the given backend.
    pub fn new(backend: Arc<dyn TokenBackend>) -> Self {
        Self { backend }
    }

    /// All tokens visible to the store, excluding the administrative
    /// internal-crypto token.
    pub fn tokens(&self) -> Result<Vec<Token>> {
        let tokens = self.backend.list_tokens()?;
        Ok(tokens
            .into_iter()
            .filter(|token| !self.backend.is_internal_token(token))
            .collect())
    }

    /// The internal key-storage token, the default target for
    /// unprefixed key aliases.
    pub fn internal_token(&self) -> Result<Token> {
        self.backend
            .list_tokens()?
            .into_iter()
            .find(|token| self.backend.is_internal_key_storage_token(token))
            .ok_or(TokenStoreError::NotInitialized)
    }

    /// Resolve a token by name, failing with `TokenNotFound` if no
    /// token with that name is registered.
    pub fn token_by_name(&self, name: &str) -> Result<Token> {
        self.backend
            .list_tokens()?
            .into_iter()
            .find(|token| token.name() == name)
            .ok_or_else(|| TokenStoreError::TokenNotFound(name.to_string()))
    }

    /// The alias prefix for entries on the given token: `None` for the
    /// internal key-storage token, the token name otherwise.
    pub fn token_prefix<'t>(&self, token: &'t Token) -> Option<&'t str> {
        if self.backend.is_internal_key_storage_token(token) {
            None
        } else {
            Some(token.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{MemoryBackend, INTERNAL_CRYPTO_TOKEN_NAME, INTERNAL_TOKEN_NAME};

    fn registry_with_tokens() -> TokenRegistry {
        let mut backend = MemoryBackend::new();
        backend.add_token("hsm1");
        TokenRegistry::new(Arc::new(backend))
    }

    #[test]
    fn test_tokens_excludes_internal_crypto_token() {
        let registry = registry_with_tokens();
        let names: Vec<String> = registry
            .tokens()
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();

        assert_eq!(names, vec![INTERNAL_TOKEN_NAME.to_string(), "hsm1".to_string()]);
    }

    #[test]
    fn test_internal_token() {
        let registry = registry_with_tokens();
        let internal = registry.internal_token().unwrap();

        assert_eq!(internal.name(), INTERNAL_TOKEN_NAME);
    }

    #[test]
    fn test_internal_token_missing_is_not_initialized() {
        let registry = TokenRegistry::new(Arc::new(MemoryBackend::empty()));
        let result = registry.internal_token();

        assert!(matches!(result, Err(TokenStoreError::NotInitialized)));
    }

    #[test]
    fn test_token_by_name() {
        let registry = registry_with_tokens();

        assert_eq!(registry.token_by_name("hsm1").unwrap().name(), "hsm1");
        assert!(matches!(
            registry.token_by_name("nope"),
            Err(TokenStoreError::TokenNotFound(_))
        ));
    }

    #[test]
    fn test_token_by_name_finds_internal_crypto_token() {
        // Excluded from enumeration, but still resolvable by name.
        let registry = registry_with_tokens();
        let token = registry.token_by_name(INTERNAL_CRYPTO_TOKEN_NAME).unwrap();

        assert_eq!(token.name(), INTERNAL_CRYPTO_TOKEN_NAME);
    }

    #[test]
    fn test_token_prefix() {
        let registry = registry_with_tokens();
        let internal = registry.internal_token().unwrap();
        let hsm1 = registry.token_by_name("hsm1").unwrap();

        assert_eq!(registry.token_prefix(&internal), None);
        assert_eq!(registry.token_prefix(&hsm1), Some("hsm1"));
    }
}

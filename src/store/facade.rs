//! The keystore-shaped public surface.
//!
//! [`TokenKeyStore`] aggregates every in-scope token into one logical
//! keystore addressed by string aliases. Nothing is cached: every call
//! re-derives its view from live token state, so a store instance can
//! be shared freely across threads for reads. The only state a store
//! holds is its backend reference and the optional token scope, both
//! fixed at construction.

use crate::backend::{KeyEntry, Token, TokenBackend};
use crate::error::{Result, TokenStoreError};
use crate::store::alias;
use crate::store::chain::build_chain;
use crate::store::registry::TokenRegistry;
use crate::store::resolver;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use x509_cert::Certificate;

/// An aggregated keystore view over a collection of tokens.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tokenstore::backend::memory::MemoryBackend;
/// use tokenstore::backend::{KeyAlgorithm, PrivateKeyEntry};
/// use tokenstore::store::TokenKeyStore;
///
/// # fn example() -> tokenstore::error::Result<()> {
/// let backend = MemoryBackend::new();
/// backend.add_private_key(
///     "internal",
///     PrivateKeyEntry::new(vec![0xab, 0xcd], KeyAlgorithm::Rsa),
/// )?;
///
/// let store = TokenKeyStore::new(Arc::new(backend));
/// assert!(store.contains_alias("abcd")?);
/// # Ok(())
/// # }
/// ```
pub struct TokenKeyStore {
    backend: Arc<dyn TokenBackend>,
    registry: TokenRegistry,
    scope: Option<Token>,
}

impl TokenKeyStore {
    /// Create a store over all tokens of the backend (minus the
    /// internal-crypto token, which is never enumerated).
    pub fn new(backend: Arc<dyn TokenBackend>) -> Self {
        let registry = TokenRegistry::new(backend.clone());
        Self {
            backend,
            registry,
            scope: None,
        }
    }

    /// Create a store bound to a single named token. The scope is
    /// immutable for the lifetime of the store.
    pub fn scoped(backend: Arc<dyn TokenBackend>, token_name: &str) -> Result<Self> {
        let registry = TokenRegistry::new(backend.clone());
        let token = registry.token_by_name(token_name)?;
        Ok(Self {
            backend,
            registry,
            scope: Some(token),
        })
    }

    /// The tokens this store draws entries from.
    fn in_scope_tokens(&self) -> Result<Vec<Token>> {
        match &self.scope {
            Some(token) => Ok(vec![token.clone()]),
            None => self.registry.tokens(),
        }
    }

    /// All aliases across the in-scope tokens: certificate nicknames
    /// plus derived key aliases, deduplicated.
    ///
    /// Recomputed live on every call. A token that becomes unavailable
    /// mid-enumeration fails the whole operation rather than producing
    /// a partial set.
    pub fn aliases(&self) -> Result<HashSet<String>> {
        let mut aliases = HashSet::new();

        for token in self.in_scope_tokens()? {
            let prefix = self.registry.token_prefix(&token);
            debug!("enumerating token: {}", token.name());

            for cert in self.backend.certificates(&token)? {
                aliases.insert(cert.nickname);
            }
            for key in self.backend.private_keys(&token)? {
                aliases.insert(alias::private_key_alias(&key, prefix));
            }
            for key in self.backend.symmetric_keys(&token)? {
                aliases.insert(alias::symmetric_key_alias(&key, prefix));
            }
        }

        Ok(aliases)
    }

    /// Number of distinct aliases.
    pub fn size(&self) -> Result<usize> {
        Ok(self.aliases()?.len())
    }

    /// Membership test against the live alias set.
    pub fn contains_alias(&self, alias: &str) -> Result<bool> {
        Ok(self.aliases()?.contains(alias))
    }

    /// First certificate with a matching nickname, re-encoded into the
    /// generic X.509 representation. `Ok(None)` if absent.
    pub fn certificate(&self, alias: &str) -> Result<Option<Certificate>> {
        debug!("certificate({})", alias);
        let tokens = self.in_scope_tokens()?;

        match resolver::find_certificate(&*self.backend, &tokens, alias)? {
            Some((_, entry)) => Ok(Some(resolver::decode_certificate(&entry)?)),
            None => Ok(None),
        }
    }

    /// Reverse lookup: the alias of the certificate with exactly these
    /// DER bytes, or `Ok(None)` if no in-scope token holds them.
    pub fn certificate_alias(&self, der: &[u8]) -> Result<Option<String>> {
        for token in self.in_scope_tokens()? {
            for cert in self.backend.certificates(&token)? {
                if cert.der == der {
                    return Ok(Some(cert.nickname));
                }
            }
        }
        Ok(None)
    }

    /// Ordered issuer chain for the certificate at `alias`, leaf first.
    /// `Ok(None)` if the leaf is absent; a partial chain is a normal
    /// result.
    pub fn certificate_chain(&self, alias: &str) -> Result<Option<Vec<Certificate>>> {
        debug!("certificate_chain({})", alias);
        let tokens = self.in_scope_tokens()?;

        let leaf = match resolver::find_certificate(&*self.backend, &tokens, alias)? {
            Some((_, entry)) => entry,
            None => return Ok(None),
        };

        let entries = build_chain(&*self.backend, &tokens, leaf)?;
        let chain = entries
            .iter()
            .map(resolver::decode_certificate)
            .collect::<Result<Vec<Certificate>>>()?;

        Ok(Some(chain))
    }

    /// Two-phase key lookup (certificate association first, then raw
    /// identifier). The credential is accepted for interface
    /// compatibility but not consulted; token authentication is the
    /// backend's responsibility.
    pub fn key(&self, alias: &str, _credential: Option<&str>) -> Result<Option<KeyEntry>> {
        debug!("key({})", alias);
        let tokens = self.in_scope_tokens()?;
        resolver::find_key(&*self.backend, &self.registry, &tokens, alias)
    }

    /// True iff a certificate matches and has no associated private
    /// key.
    pub fn is_certificate_entry(&self, alias: &str) -> Result<bool> {
        let tokens = self.in_scope_tokens()?;
        resolver::is_certificate_entry(&*self.backend, &tokens, alias)
    }

    /// True iff the alias resolves to a key, including via a
    /// certificate's associated key.
    pub fn is_key_entry(&self, alias: &str) -> Result<bool> {
        Ok(self.key(alias, None)?.is_some())
    }

    /// Delete every entry whose derived alias equals `alias`; a deleted
    /// certificate takes its associated private key with it. A
    /// nonexistent alias is a no-op.
    pub fn delete_entry(&self, alias: &str) -> Result<()> {
        debug!("delete_entry({})", alias);
        let tokens = self.in_scope_tokens()?;
        resolver::delete_entry(&*self.backend, &self.registry, &tokens, alias)
    }

    /// Unsupported: the token model cannot hold a trusted certificate
    /// without an associated private key.
    pub fn set_certificate_entry(&self, _alias: &str, _der: &[u8]) -> Result<()> {
        Err(TokenStoreError::Unsupported(
            "storing trusted certificate entries is not supported by the token model".to_string(),
        ))
    }

    /// Unsupported: the token model only accepts key handles already
    /// resident on a token, not raw key material.
    pub fn set_key_entry(&self, _alias: &str, _key_material: &[u8]) -> Result<()> {
        Err(TokenStoreError::Unsupported(
            "storing raw key material is not supported; import the key on a token instead"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{MemoryBackend, INTERNAL_CRYPTO_TOKEN_NAME, INTERNAL_TOKEN_NAME};
    use crate::backend::{CertificateEntry, KeyAlgorithm, PrivateKeyEntry, SymmetricKeyEntry};

    fn populated_backend() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        backend.add_token("hsm1");

        backend
            .add_certificate(
                INTERNAL_TOKEN_NAME,
                CertificateEntry::new("server-cert", vec![1], "CN=server", "CN=CA-root"),
            )
            .unwrap();
        backend
            .add_private_key(
                INTERNAL_TOKEN_NAME,
                PrivateKeyEntry::new(vec![0xab, 0xcd], KeyAlgorithm::Rsa),
            )
            .unwrap();
        backend
            .add_symmetric_key("hsm1", SymmetricKeyEntry::new("sess-key", KeyAlgorithm::Aes))
            .unwrap();
        backend
    }

    #[test]
    fn test_aliases_aggregation() {
        let store = TokenKeyStore::new(Arc::new(populated_backend()));
        let aliases = store.aliases().unwrap();

        assert_eq!(aliases.len(), 3);
        assert!(aliases.contains("server-cert"));
        assert!(aliases.contains("abcd"));
        assert!(aliases.contains("hsm1:sess-key"));
    }

    #[test]
    fn test_size_and_contains() {
        let store = TokenKeyStore::new(Arc::new(populated_backend()));

        assert_eq!(store.size().unwrap(), 3);
        assert!(store.contains_alias("hsm1:sess-key").unwrap());
        assert!(!store.contains_alias("ghost").unwrap());
    }

    #[test]
    fn test_internal_crypto_token_entries_not_enumerated() {
        let backend = populated_backend();
        backend
            .add_certificate(
                INTERNAL_CRYPTO_TOKEN_NAME,
                CertificateEntry::new("admin-cert", vec![9], "CN=admin", "CN=admin"),
            )
            .unwrap();

        let store = TokenKeyStore::new(Arc::new(backend));
        assert!(!store.aliases().unwrap().contains("admin-cert"));
    }

    #[test]
    fn test_scoped_store_restricts_enumeration() {
        let store = TokenKeyStore::scoped(Arc::new(populated_backend()), "hsm1").unwrap();
        let aliases = store.aliases().unwrap();

        assert_eq!(aliases.len(), 1);
        assert!(aliases.contains("hsm1:sess-key"));
    }

    #[test]
    fn test_scoped_store_unknown_token() {
        let result = TokenKeyStore::scoped(Arc::new(populated_backend()), "nope");
        assert!(matches!(result, Err(TokenStoreError::TokenNotFound(_))));
    }

    #[test]
    fn test_unavailable_token_fails_enumeration() {
        let backend = populated_backend();
        backend.set_token_available("hsm1", false).unwrap();

        let store = TokenKeyStore::new(Arc::new(backend));
        let result = store.aliases();

        assert!(matches!(result, Err(TokenStoreError::TokenUnavailable(_))));
    }

    #[test]
    fn test_mutating_entries_not_expressible() {
        let store = TokenKeyStore::new(Arc::new(populated_backend()));

        assert!(matches!(
            store.set_certificate_entry("trusted", &[1, 2, 3]),
            Err(TokenStoreError::Unsupported(_))
        ));
        assert!(matches!(
            store.set_key_entry("raw", &[4, 5, 6]),
            Err(TokenStoreError::Unsupported(_))
        ));
    }

    #[test]
    fn test_certificate_alias_reverse_lookup() {
        let store = TokenKeyStore::new(Arc::new(populated_backend()));

        assert_eq!(
            store.certificate_alias(&[1]).unwrap(),
            Some("server-cert".to_string())
        );
        assert_eq!(store.certificate_alias(&[42]).unwrap(), None);
    }

    #[test]
    fn test_empty_backend_key_lookup_not_initialized() {
        let store = TokenKeyStore::new(Arc::new(MemoryBackend::empty()));
        let result = store.key("abcd", None);

        assert!(matches!(result, Err(TokenStoreError::NotInitialized)));
    }
}

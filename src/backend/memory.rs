//! In-memory token backend.
//!
//! A reference implementation of [`TokenBackend`] backed by plain
//! collections. It exists for tests and for embedding the store in
//! processes that have no hardware token: each registered token gets
//! its own lock so mutations on one token never serialize against
//! reads on another, and an availability switch simulates a token that
//! drops off the bus mid-operation.

use crate::backend::{
    CertificateEntry, KeyEntry, PrivateKeyEntry, SymmetricKeyEntry, Token, TokenBackend,
};
use crate::error::{Result, TokenStoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Name of the default internal key-storage token.
pub const INTERNAL_TOKEN_NAME: &str = "internal";

/// Name of the administrative internal-crypto token.
pub const INTERNAL_CRYPTO_TOKEN_NAME: &str = "internal-crypto";

/// Objects resident on a single token.
#[derive(Default)]
struct TokenObjects {
    certificates: Vec<CertificateEntry>,
    private_keys: Vec<PrivateKeyEntry>,
    symmetric_keys: Vec<SymmetricKeyEntry>,
    /// Certificate nickname -> unique ID of the associated private key.
    key_owners: HashMap<String, Vec<u8>>,
}

/// A registered token slot.
struct MemoryToken {
    token: Token,
    internal_crypto: bool,
    internal_key_storage: bool,
    available: AtomicBool,
    objects: RwLock<TokenObjects>,
}

impl MemoryToken {
    fn new(name: &str, internal_crypto: bool, internal_key_storage: bool) -> Self {
        Self {
            token: Token::new(name),
            internal_crypto,
            internal_key_storage,
            available: AtomicBool::new(true),
            objects: RwLock::new(TokenObjects::default()),
        }
    }
}

/// An in-memory collection of tokens implementing [`TokenBackend`].
///
/// Token registration happens up front via [`MemoryBackend::add_token`];
/// entries can be added and removed at any time through shared
/// references, so a backend behind an `Arc` stays mutable from tests.
///
/// # Example
///
/// ```rust
/// use tokenstore::backend::memory::MemoryBackend;
/// use tokenstore::backend::{KeyAlgorithm, SymmetricKeyEntry};
///
/// # fn example() -> tokenstore::error::Result<()> {
/// let mut backend = MemoryBackend::new();
/// backend.add_token("hsm1");
/// backend.add_symmetric_key("hsm1", SymmetricKeyEntry::new("sess-key", KeyAlgorithm::Aes))?;
/// # Ok(())
/// # }
/// ```
pub struct MemoryBackend {
    tokens: Vec<MemoryToken>,
}

impl MemoryBackend {
    /// Create a backend with the two internal tokens registered: the
    /// internal-crypto token and the internal key-storage token.
    pub fn new() -> Self {
        Self {
            tokens: vec![
                MemoryToken::new(INTERNAL_CRYPTO_TOKEN_NAME, true, false),
                MemoryToken::new(INTERNAL_TOKEN_NAME, false, true),
            ],
        }
    }

    /// Create a backend with no tokens at all. A store over an empty
    /// backend fails with `NotInitialized` as soon as it needs the
    /// internal key-storage token.
    pub fn empty() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Register a named token. Enumeration order is registration order.
    pub fn add_token(&mut self, name: &str) -> Token {
        let slot = MemoryToken::new(name, false, false);
        let token = slot.token.clone();
        self.tokens.push(slot);
        token
    }

    /// Flip a token's availability. An unavailable token fails every
    /// per-token operation with `TokenUnavailable`.
    pub fn set_token_available(&self, name: &str, available: bool) -> Result<()> {
        let slot = self.slot_by_name(name)?;
        slot.available.store(available, Ordering::SeqCst);
        Ok(())
    }

    /// Add a certificate to the named token.
    pub fn add_certificate(&self, token_name: &str, cert: CertificateEntry) -> Result<()> {
        let slot = self.slot_by_name(token_name)?;
        slot.objects.write().unwrap().certificates.push(cert);
        Ok(())
    }

    /// Add a private key to the named token.
    pub fn add_private_key(&self, token_name: &str, key: PrivateKeyEntry) -> Result<()> {
        let slot = self.slot_by_name(token_name)?;
        slot.objects.write().unwrap().private_keys.push(key);
        Ok(())
    }

    /// Add a symmetric key to the named token.
    pub fn add_symmetric_key(&self, token_name: &str, key: SymmetricKeyEntry) -> Result<()> {
        let slot = self.slot_by_name(token_name)?;
        slot.objects.write().unwrap().symmetric_keys.push(key);
        Ok(())
    }

    /// Record that the certificate with the given nickname owns the
    /// private key with the given unique ID, both on the named token.
    pub fn associate_key(
        &self,
        token_name: &str,
        cert_nickname: &str,
        unique_id: &[u8],
    ) -> Result<()> {
        let slot = self.slot_by_name(token_name)?;
        slot.objects
            .write()
            .unwrap()
            .key_owners
            .insert(cert_nickname.to_string(), unique_id.to_vec());
        Ok(())
    }

    fn slot_by_name(&self, name: &str) -> Result<&MemoryToken> {
        self.tokens
            .iter()
            .find(|slot| slot.token.name() == name)
            .ok_or_else(|| TokenStoreError::TokenNotFound(name.to_string()))
    }

    /// Resolve a token handle to its slot, checking availability.
    fn slot(&self, token: &Token) -> Result<&MemoryToken> {
        let slot = self
            .tokens
            .iter()
            .find(|slot| slot.token == *token)
            .ok_or_else(|| TokenStoreError::TokenNotFound(token.name().to_string()))?;

        if !slot.available.load(Ordering::SeqCst) {
            return Err(TokenStoreError::TokenUnavailable(token.name().to_string()));
        }

        Ok(slot)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBackend for MemoryBackend {
    fn list_tokens(&self) -> Result<Vec<Token>> {
        Ok(self.tokens.iter().map(|slot| slot.token.clone()).collect())
    }

    fn is_internal_token(&self, token: &Token) -> bool {
        self.tokens
            .iter()
            .any(|slot| slot.token == *token && slot.internal_crypto)
    }

    fn is_internal_key_storage_token(&self, token: &Token) -> bool {
        self.tokens
            .iter()
            .any(|slot| slot.token == *token && slot.internal_key_storage)
    }

    fn certificates(&self, token: &Token) -> Result<Vec<CertificateEntry>> {
        let slot = self.slot(token)?;
        Ok(slot.objects.read().unwrap().certificates.clone())
    }

    fn private_keys(&self, token: &Token) -> Result<Vec<PrivateKeyEntry>> {
        let slot = self.slot(token)?;
        Ok(slot.objects.read().unwrap().private_keys.clone())
    }

    fn symmetric_keys(&self, token: &Token) -> Result<Vec<SymmetricKeyEntry>> {
        let slot = self.slot(token)?;
        Ok(slot.objects.read().unwrap().symmetric_keys.clone())
    }

    fn private_key_for_certificate(
        &self,
        token: &Token,
        cert: &CertificateEntry,
    ) -> Result<Option<PrivateKeyEntry>> {
        let slot = self.slot(token)?;
        let objects = slot.objects.read().unwrap();

        let unique_id = match objects.key_owners.get(&cert.nickname) {
            Some(id) => id,
            None => return Ok(None),
        };

        Ok(objects
            .private_keys
            .iter()
            .find(|key| key.unique_id == *unique_id)
            .cloned())
    }

    fn delete_certificate(&self, token: &Token, cert: &CertificateEntry) -> Result<()> {
        let slot = self.slot(token)?;
        let mut objects = slot.objects.write().unwrap();

        objects
            .certificates
            .retain(|c| !(c.nickname == cert.nickname && c.der == cert.der));
        objects.key_owners.remove(&cert.nickname);

        Ok(())
    }

    fn delete_certificate_with_key(
        &self,
        token: &Token,
        cert: &CertificateEntry,
    ) -> Result<()> {
        let slot = self.slot(token)?;
        // One write-lock acquisition covers the key, the association,
        // and the certificate.
        let mut objects = slot.objects.write().unwrap();

        if let Some(unique_id) = objects.key_owners.remove(&cert.nickname) {
            objects.private_keys.retain(|k| k.unique_id != unique_id);
        }
        objects
            .certificates
            .retain(|c| !(c.nickname == cert.nickname && c.der == cert.der));

        Ok(())
    }

    fn delete_key(&self, token: &Token, key: &KeyEntry) -> Result<()> {
        let slot = self.slot(token)?;
        let mut objects = slot.objects.write().unwrap();

        match key {
            KeyEntry::Private(private) => {
                objects
                    .private_keys
                    .retain(|k| k.unique_id != private.unique_id);
                objects
                    .key_owners
                    .retain(|_, id| *id != private.unique_id);
            }
            KeyEntry::Symmetric(symmetric) => {
                objects
                    .symmetric_keys
                    .retain(|k| k.nickname != symmetric.nickname);
            }
        }

        Ok(())
    }
}

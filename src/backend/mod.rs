//! Token backend abstraction.
//!
//! A token is an independent repository of certificates and keys,
//! addressable by name. The store never talks to a concrete token
//! implementation directly; it consumes the [`TokenBackend`] capability
//! interface, with one implementation per real or test backend.
//!
//! Two tokens are distinguished: the administrative internal-crypto
//! token, which is always excluded from enumeration, and the internal
//! key-storage token, whose entries get unprefixed aliases.

pub mod memory;

use crate::error::Result;

/// A handle to a cryptographic token.
///
/// Tokens compare equal by name. Token names must not contain `:`,
/// which the alias syntax reserves as the token/identifier separator;
/// backends are expected to enforce this by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    name: String,
}

impl Token {
    /// Create a token handle with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The token's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Algorithm tag attached to a key entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    Ec,
    Ed25519,
    Aes,
    Hmac,
}

/// A certificate as stored on a token.
///
/// The subject and issuer identities are carried as token-level
/// metadata so issuer chains can be walked without re-parsing DER on
/// every hop. Whether the certificate has an associated private key is
/// not a stored field; it is determined by a separate
/// [`TokenBackend::private_key_for_certificate`] lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateEntry {
    /// Human-assigned label. Not guaranteed unique across tokens.
    pub nickname: String,

    /// DER-encoded certificate bytes.
    pub der: Vec<u8>,

    /// Subject distinguished name.
    pub subject: String,

    /// Issuer distinguished name.
    pub issuer: String,
}

impl CertificateEntry {
    /// Create a certificate entry.
    pub fn new(
        nickname: impl Into<String>,
        der: Vec<u8>,
        subject: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            der,
            subject: subject.into(),
            issuer: issuer.into(),
        }
    }

    /// True if the certificate's subject and issuer are the same
    /// identity, i.e. the end of an issuer chain.
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }
}

/// A private key as stored on a token.
///
/// Private keys have no inherent string name; the token assigns an
/// opaque binary unique ID.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivateKeyEntry {
    /// Opaque binary identifier assigned by the owning token.
    pub unique_id: Vec<u8>,

    /// Algorithm tag.
    pub algorithm: KeyAlgorithm,
}

impl PrivateKeyEntry {
    /// Create a private key entry.
    pub fn new(unique_id: Vec<u8>, algorithm: KeyAlgorithm) -> Self {
        Self {
            unique_id,
            algorithm,
        }
    }
}

/// A symmetric key as stored on a token, identified by nickname.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricKeyEntry {
    /// Human-assigned label.
    pub nickname: String,

    /// Algorithm tag.
    pub algorithm: KeyAlgorithm,
}

impl SymmetricKeyEntry {
    /// Create a symmetric key entry.
    pub fn new(nickname: impl Into<String>, algorithm: KeyAlgorithm) -> Self {
        Self {
            nickname: nickname.into(),
            algorithm,
        }
    }
}

/// A key handle as surfaced by the store.
///
/// The two variants are matched exhaustively wherever the store needs
/// to dispatch on the key kind; there is no open-ended type testing.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyEntry {
    Private(PrivateKeyEntry),
    Symmetric(SymmetricKeyEntry),
}

impl KeyEntry {
    /// The algorithm tag of either variant.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            KeyEntry::Private(key) => key.algorithm,
            KeyEntry::Symmetric(key) => key.algorithm,
        }
    }
}

/// Capability interface to a collection of cryptographic tokens.
///
/// Implementations must serialize mutations (`delete_certificate`,
/// `delete_key`) per token relative to other mutations and to in-flight
/// reads on that token. All calls are synchronous and blocking; a token
/// that cannot be reached fails the call with
/// [`TokenUnavailable`](crate::error::TokenStoreError::TokenUnavailable)
/// rather than returning partial results.
pub trait TokenBackend: Send + Sync {
    /// All registered tokens, including the internal ones. Enumeration
    /// order must be stable within a process run.
    fn list_tokens(&self) -> Result<Vec<Token>>;

    /// True if the token is the administrative internal-crypto token.
    fn is_internal_token(&self, token: &Token) -> bool;

    /// True if the token is the default internal key-storage token.
    fn is_internal_key_storage_token(&self, token: &Token) -> bool;

    /// Certificates resident on the token.
    fn certificates(&self, token: &Token) -> Result<Vec<CertificateEntry>>;

    /// Private keys resident on the token.
    fn private_keys(&self, token: &Token) -> Result<Vec<PrivateKeyEntry>>;

    /// Symmetric keys resident on the token.
    fn symmetric_keys(&self, token: &Token) -> Result<Vec<SymmetricKeyEntry>>;

    /// Backward lookup from a certificate to its associated private key
    /// on the same token. `Ok(None)` if the certificate has no key.
    fn private_key_for_certificate(
        &self,
        token: &Token,
        cert: &CertificateEntry,
    ) -> Result<Option<PrivateKeyEntry>>;

    /// Delete a certificate from the token. Deleting a certificate
    /// that is no longer present is a no-op.
    fn delete_certificate(&self, token: &Token, cert: &CertificateEntry) -> Result<()>;

    /// Delete a certificate and its associated private key (if any) as
    /// a single mutation on the token: a concurrent reader must never
    /// observe the certificate still present with its key already
    /// gone. Deleting a certificate that is no longer present is a
    /// no-op.
    fn delete_certificate_with_key(&self, token: &Token, cert: &CertificateEntry)
        -> Result<()>;

    /// Delete a key from the token. Deleting a key that is no longer
    /// present is a no-op.
    fn delete_key(&self, token: &Token, key: &KeyEntry) -> Result<()>;
}

//! Entry lookup and deletion across the in-scope tokens.
//!
//! Lookups follow the cert-first-then-key policy: an alias that names a
//! certificate with an associated private key resolves to that key
//! before the alias is ever parsed as a raw key identifier. Absence is
//! a normal return value here; only structural problems (bad alias
//! syntax, missing token, backend outage) surface as errors.

use crate::backend::{CertificateEntry, KeyEntry, Token, TokenBackend};
use crate::error::Result;
use crate::store::alias::{self, parse_alias};
use crate::store::registry::TokenRegistry;
use der::Decode;
use tracing::debug;
use x509_cert::Certificate;

/// First certificate across the given tokens whose nickname matches
/// the alias, together with its owning token.
pub fn find_certificate(
    backend: &dyn TokenBackend,
    tokens: &[Token],
    alias: &str,
) -> Result<Option<(Token, CertificateEntry)>> {
    for token in tokens {
        for cert in backend.certificates(token)? {
            if cert.nickname == alias {
                debug!("cert found: {} on token {}", alias, token.name());
                return Ok(Some((token.clone(), cert)));
            }
        }
    }

    debug!("cert not found: {}", alias);
    Ok(None)
}

/// Re-decode a token certificate into the generic X.509 representation.
pub fn decode_certificate(entry: &CertificateEntry) -> Result<Certificate> {
    Ok(Certificate::from_der(&entry.der)?)
}

/// Two-phase key lookup.
///
/// Phase 1 resolves the alias as a certificate nickname and follows the
/// certificate→key association on the owning token; a hit takes
/// precedence even when the alias would also parse as a raw key
/// identifier. Phase 2 parses the alias, resolves the designated token
/// (the internal key-storage token when unprefixed), and scans its
/// private keys by lowercase hex ID, then its symmetric keys by
/// nickname.
pub fn find_key(
    backend: &dyn TokenBackend,
    registry: &TokenRegistry,
    tokens: &[Token],
    alias: &str,
) -> Result<Option<KeyEntry>> {
    if let Some((token, cert)) = find_certificate(backend, tokens, alias)? {
        if let Some(private) = backend.private_key_for_certificate(&token, &cert)? {
            debug!("key found via cert: {}", alias);
            return Ok(Some(KeyEntry::Private(private)));
        }
        debug!("cert has no associated key, searching for key: {}", alias);
    }

    let parsed = parse_alias(alias)?;
    let token = match parsed.token.as_deref() {
        Some(name) => registry.token_by_name(name)?,
        None => registry.internal_token()?,
    };

    for key in backend.private_keys(&token)? {
        if hex::encode(&key.unique_id) == parsed.identifier {
            debug!("private key found: {}", parsed.identifier);
            return Ok(Some(KeyEntry::Private(key)));
        }
    }

    for key in backend.symmetric_keys(&token)? {
        if key.nickname == parsed.identifier {
            debug!("symmetric key found: {}", parsed.identifier);
            return Ok(Some(KeyEntry::Symmetric(key)));
        }
    }

    debug!("key not found: {}", alias);
    Ok(None)
}

/// True iff a certificate matches the alias and that certificate has no
/// associated private key. A certificate with an associated key is a
/// key entry, not a certificate entry.
pub fn is_certificate_entry(
    backend: &dyn TokenBackend,
    tokens: &[Token],
    alias: &str,
) -> Result<bool> {
    match find_certificate(backend, tokens, alias)? {
        Some((token, cert)) => Ok(backend
            .private_key_for_certificate(&token, &cert)?
            .is_none()),
        None => Ok(false),
    }
}

/// Delete every certificate and key across the given tokens whose
/// derived alias equals `alias`. A deleted certificate takes its
/// associated private key with it in a single per-token mutation, so
/// readers never observe the certificate without its key. Deleting a
/// nonexistent alias is a no-op.
pub fn delete_entry(
    backend: &dyn TokenBackend,
    registry: &TokenRegistry,
    tokens: &[Token],
    alias: &str,
) -> Result<()> {
    for token in tokens {
        let prefix = registry.token_prefix(token);

        for cert in backend.certificates(token)? {
            if cert.nickname == alias {
                debug!("deleting cert and any associated key: {} on token {}", alias, token.name());
                backend.delete_certificate_with_key(token, &cert)?;
            }
        }

        for key in backend.private_keys(token)? {
            if alias::private_key_alias(&key, prefix) == alias {
                debug!("deleting private key: {}", alias);
                backend.delete_key(token, &KeyEntry::Private(key))?;
            }
        }

        for key in backend.symmetric_keys(token)? {
            if alias::symmetric_key_alias(&key, prefix) == alias {
                debug!("deleting symmetric key: {}", alias);
                backend.delete_key(token, &KeyEntry::Symmetric(key))?;
            }
        }
    }

    Ok(())
}

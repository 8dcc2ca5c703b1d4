//! Issuer chain construction across token boundaries.
//!
//! Starting from a leaf certificate, repeatedly search the in-scope
//! tokens for a certificate whose subject matches the current issuer.
//! The walk stops at a self-issued certificate or when no issuer can
//! be found; a partial chain is a normal result, never an error.

use crate::backend::{CertificateEntry, Token, TokenBackend};
use crate::error::Result;
use tracing::debug;

/// Build an ordered issuer chain, leaf first.
///
/// Always returns at least `[leaf]`. A certificate already present in
/// the chain (by DER equality) is never appended again, so the walk
/// terminates even if issuer relationships form a cycle.
pub fn build_chain(
    backend: &dyn TokenBackend,
    tokens: &[Token],
    leaf: CertificateEntry,
) -> Result<Vec<CertificateEntry>> {
    let mut chain = vec![leaf];

    loop {
        let last = &chain[chain.len() - 1];
        if last.is_self_issued() {
            debug!("chain ends at self-issued cert: {}", last.subject);
            break;
        }
        let issuer_subject = last.issuer.clone();

        match find_by_subject(backend, tokens, &issuer_subject)? {
            Some(issuer) if chain.iter().all(|c| c.der != issuer.der) => {
                debug!("chain: appending issuer {}", issuer.subject);
                chain.push(issuer);
            }
            Some(_) => {
                // Issuer already in the chain: cycle guard.
                debug!("chain: issuer cycle at {}", issuer_subject);
                break;
            }
            None => {
                debug!("chain: no issuer found for {}", issuer_subject);
                break;
            }
        }
    }

    Ok(chain)
}

/// First certificate across the given tokens whose subject matches.
fn find_by_subject(
    backend: &dyn TokenBackend,
    tokens: &[Token],
    subject: &str,
) -> Result<Option<CertificateEntry>> {
    for token in tokens {
        for cert in backend.certificates(token)? {
            if cert.subject == subject {
                return Ok(Some(cert));
            }
        }
    }
    Ok(None)
}

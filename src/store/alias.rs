//! Alias derivation and parsing.
//!
//! Every entry in the aggregate store is addressed by a single string
//! alias. Certificates keep their bare nickname regardless of token.
//! Keys are addressed by identifier: lowercase hex of the unique ID
//! for private keys, the nickname for symmetric keys. The identifier
//! is prefixed with `<token-name>:` unless the key lives on the
//! internal key-storage token.
//!
//! Aliases are not guaranteed unique across the aggregate store: two
//! tokens can independently produce colliding strings, in which case
//! lookups resolve first-match-wins under the registry's enumeration
//! order. Token names must not contain `:`; a name that did would make
//! derivation and parsing non-inverse, so backends keep names
//! colon-free by construction.

use crate::backend::{KeyEntry, PrivateKeyEntry, SymmetricKeyEntry};
use crate::error::{Result, TokenStoreError};

/// An alias split into its token and identifier parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAlias {
    /// The named token, or `None` for the internal key-storage token.
    pub token: Option<String>,

    /// Key identifier: lowercase hex unique ID or symmetric nickname.
    pub identifier: String,
}

/// Prefix an identifier with the token name, unless the entry lives on
/// the internal key-storage token (`token_name` is `None`).
fn prefixed(identifier: String, token_name: Option<&str>) -> String {
    match token_name {
        Some(name) => format!("{}:{}", name, identifier),
        None => identifier,
    }
}

/// Alias of a private key: lowercase hex of its unique ID, prefixed
/// with the token name for non-internal tokens.
pub fn private_key_alias(key: &PrivateKeyEntry, token_name: Option<&str>) -> String {
    prefixed(hex::encode(&key.unique_id), token_name)
}

/// Alias of a symmetric key: its nickname, with the same prefixing
/// rule as private keys.
pub fn symmetric_key_alias(key: &SymmetricKeyEntry, token_name: Option<&str>) -> String {
    prefixed(key.nickname.clone(), token_name)
}

/// Alias of either key variant.
pub fn key_alias(key: &KeyEntry, token_name: Option<&str>) -> String {
    match key {
        KeyEntry::Private(private) => private_key_alias(private, token_name),
        KeyEntry::Symmetric(symmetric) => symmetric_key_alias(symmetric, token_name),
    }
}

/// Parse an alias into its token and identifier parts.
///
/// Zero or one `:` separator is valid. An empty token-name segment
/// (`:abcd`) normalizes to the internal key-storage token. Two or more
/// separators fail with `InvalidAlias`.
///
/// # Example
///
/// ```rust
/// use tokenstore::store::alias::parse_alias;
///
/// # fn example() -> tokenstore::error::Result<()> {
/// let parsed = parse_alias("hsm1:sess-key")?;
/// assert_eq!(parsed.token.as_deref(), Some("hsm1"));
/// assert_eq!(parsed.identifier, "sess-key");
/// # Ok(())
/// # }
/// ```
pub fn parse_alias(alias: &str) -> Result<ParsedAlias> {
    let parts: Vec<&str> = alias.split(':').collect();

    match parts.as_slice() {
        [identifier] => Ok(ParsedAlias {
            token: None,
            identifier: (*identifier).to_string(),
        }),
        [token, identifier] => Ok(ParsedAlias {
            token: if token.is_empty() {
                None
            } else {
                Some((*token).to_string())
            },
            identifier: (*identifier).to_string(),
        }),
        _ => Err(TokenStoreError::InvalidAlias(alias.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::KeyAlgorithm;

    #[test]
    fn test_private_key_alias_internal() {
        let key = PrivateKeyEntry::new(vec![0xab, 0xcd], KeyAlgorithm::Rsa);
        assert_eq!(private_key_alias(&key, None), "abcd");
    }

    #[test]
    fn test_private_key_alias_named_token() {
        let key = PrivateKeyEntry::new(vec![0xab, 0xcd], KeyAlgorithm::Rsa);
        assert_eq!(private_key_alias(&key, Some("hsm1")), "hsm1:abcd");
    }

    #[test]
    fn test_hex_identifier_is_lowercase() {
        let key = PrivateKeyEntry::new(vec![0xde, 0xad, 0xbe, 0xef], KeyAlgorithm::Ec);
        let alias = private_key_alias(&key, None);

        assert_eq!(alias, "deadbeef");
        assert_eq!(alias, alias.to_lowercase());
    }

    #[test]
    fn test_symmetric_key_alias() {
        let key = SymmetricKeyEntry::new("sess-key", KeyAlgorithm::Aes);

        assert_eq!(symmetric_key_alias(&key, None), "sess-key");
        assert_eq!(symmetric_key_alias(&key, Some("hsm1")), "hsm1:sess-key");
    }

    #[test]
    fn test_parse_alias_unprefixed() {
        let parsed = parse_alias("abcd").unwrap();
        assert_eq!(parsed.token, None);
        assert_eq!(parsed.identifier, "abcd");
    }

    #[test]
    fn test_parse_alias_prefixed() {
        let parsed = parse_alias("hsm1:abcd").unwrap();
        assert_eq!(parsed.token.as_deref(), Some("hsm1"));
        assert_eq!(parsed.identifier, "abcd");
    }

    #[test]
    fn test_parse_alias_empty_token_segment() {
        // ":abcd" normalizes to the internal key-storage token.
        let parsed = parse_alias(":abcd").unwrap();
        assert_eq!(parsed.token, None);
        assert_eq!(parsed.identifier, "abcd");
    }

    #[test]
    fn test_parse_alias_too_many_separators() {
        let result = parse_alias("a:b:c");
        assert!(matches!(result, Err(TokenStoreError::InvalidAlias(_))));
    }

    #[test]
    fn test_derive_parse_round_trip() {
        let private = PrivateKeyEntry::new(vec![0x01, 0x2f], KeyAlgorithm::Rsa);
        let symmetric = SymmetricKeyEntry::new("sess-key", KeyAlgorithm::Aes);

        for token_name in [None, Some("hsm1")] {
            let parsed = parse_alias(&private_key_alias(&private, token_name)).unwrap();
            assert_eq!(parsed.token.as_deref(), token_name);
            assert_eq!(parsed.identifier, "012f");

            let parsed = parse_alias(&symmetric_key_alias(&symmetric, token_name)).unwrap();
            assert_eq!(parsed.token.as_deref(), token_name);
            assert_eq!(parsed.identifier, "sess-key");
        }
    }

    #[test]
    fn test_key_alias_dispatch() {
        let private = KeyEntry::Private(PrivateKeyEntry::new(vec![0xff], KeyAlgorithm::Rsa));
        let symmetric =
            KeyEntry::Symmetric(SymmetricKeyEntry::new("sess-key", KeyAlgorithm::Aes));

        assert_eq!(key_alias(&private, Some("hsm1")), "hsm1:ff");
        assert_eq!(key_alias(&symmetric, None), "sess-key");
    }
}

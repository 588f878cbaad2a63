//! Cryptographic signing primitives for venue authentication.
//!
//! Venue REST APIs authenticate private requests with a MAC over a
//! canonical serialization of the request; the exact message layout and
//! output encoding are venue-specific and must match bit-for-bit or the
//! venue rejects the signature. This module provides the shared pieces:
//! HMAC signing, keyless hashing, digest encoding and the URL-encoding
//! helpers the canonical serializations are built from.

use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{Error, Result};

/// Supported MAC/hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
    /// MD5 (legacy venues only).
    Md5,
}

/// Output encoding for digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestFormat {
    /// Lowercase hexadecimal.
    Hex,
    /// Standard Base64.
    Base64,
}

/// Computes an HMAC signature.
///
/// # Errors
///
/// Never fails for the supported algorithms (HMAC accepts keys of any
/// length) but returns `Result` so venue `sign` implementations can use
/// `?` uniformly.
///
/// # Examples
///
/// ```rust
/// use coinbridge_core::auth::{hmac_sign, DigestFormat, HashAlgorithm};
///
/// let sig = hmac_sign("test", "secret", HashAlgorithm::Sha256, DigestFormat::Hex).unwrap();
/// assert_eq!(sig.len(), 64);
/// ```
pub fn hmac_sign(
    message: &str,
    secret: &str,
    algorithm: HashAlgorithm,
    digest: DigestFormat,
) -> Result<String> {
    let bytes = match algorithm {
        HashAlgorithm::Sha256 => hmac_sha256(message.as_bytes(), secret.as_bytes())?,
        HashAlgorithm::Sha384 => hmac_sha384(message.as_bytes(), secret.as_bytes())?,
        HashAlgorithm::Sha512 => hmac_sha512(message.as_bytes(), secret.as_bytes())?,
        HashAlgorithm::Md5 => hmac_md5(message.as_bytes(), secret.as_bytes())?,
    };
    Ok(encode_bytes(&bytes, digest))
}

fn key_error(e: impl std::fmt::Display) -> Error {
    Error::authentication(format!("invalid HMAC key: {e}"))
}

fn hmac_sha256(data: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(key_error)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_sha384(data: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha384>::new_from_slice(secret).map_err(key_error)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_sha512(data: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret).map_err(key_error)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_md5(data: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<md5::Md5>::new_from_slice(secret).map_err(key_error)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Computes a keyless hash.
pub fn hash(data: &str, algorithm: HashAlgorithm, digest: DigestFormat) -> String {
    let bytes = match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(data.as_bytes()).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data.as_bytes()).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data.as_bytes()).to_vec(),
        HashAlgorithm::Md5 => {
            use md5::Digest as _;
            md5::Md5::digest(data.as_bytes()).to_vec()
        }
    };
    encode_bytes(&bytes, digest)
}

fn encode_bytes(bytes: &[u8], format: DigestFormat) -> String {
    match format {
        DigestFormat::Hex => hex::encode(bytes),
        DigestFormat::Base64 => general_purpose::STANDARD.encode(bytes),
    }
}

/// Percent-encodes one query component per RFC 3986.
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) pass through.
pub fn url_encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Serializes key/value pairs as a query string in the given order.
///
/// Signing canonicalizations are order-sensitive, so the caller controls
/// ordering by controlling the slice.
pub fn url_encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", url_encode_component(k), url_encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Like [`url_encode_pairs`] but leaves `,` unescaped.
///
/// Some venues (HashKey among them) sign comma-separated list parameters
/// with the comma literal; encoding it as `%2C` produces a signature the
/// venue rejects.
pub fn url_encode_pairs_comma(pairs: &[(String, String)]) -> String {
    url_encode_pairs(pairs).replace("%2C", ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha256_hex() {
        let sig = hmac_sign("test", "secret", HashAlgorithm::Sha256, DigestFormat::Hex).unwrap();
        assert_eq!(
            sig,
            "0329a06b62cd16b33eb6792be8c60b158d89a2ee3a876fce9a881ebb488c0914"
        );
    }

    #[test]
    fn test_hmac_sha256_base64() {
        let sig = hmac_sign("test", "secret", HashAlgorithm::Sha256, DigestFormat::Base64).unwrap();
        assert_eq!(sig, "Aymga2LNFrM+tnkr6MYLFY2Jou46h2/Omogeu0iMCRQ=");
    }

    #[test]
    fn test_hmac_sha512_length() {
        let sig = hmac_sign("test", "secret", HashAlgorithm::Sha512, DigestFormat::Hex).unwrap();
        assert_eq!(sig.len(), 128);
    }

    #[test]
    fn test_hash_sha256() {
        let digest = hash("test", HashAlgorithm::Sha256, DigestFormat::Hex);
        assert_eq!(
            digest,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_url_encode_component() {
        assert_eq!(url_encode_component("BTC/USDT"), "BTC%2FUSDT");
        assert_eq!(url_encode_component("a b,c"), "a%20b%2Cc");
        assert_eq!(url_encode_component("safe-_.~123"), "safe-_.~123");
    }

    #[test]
    fn test_url_encode_pairs_preserves_order() {
        let pairs = vec![
            ("timestamp".to_string(), "1700000000000".to_string()),
            ("symbol".to_string(), "BTCUSDT".to_string()),
        ];
        assert_eq!(
            url_encode_pairs(&pairs),
            "timestamp=1700000000000&symbol=BTCUSDT"
        );
    }

    #[test]
    fn test_comma_quirk() {
        let pairs = vec![("orderIds".to_string(), "1001,1002".to_string())];
        assert_eq!(url_encode_pairs(&pairs), "orderIds=1001%2C1002");
        assert_eq!(url_encode_pairs_comma(&pairs), "orderIds=1001,1002");
    }
}

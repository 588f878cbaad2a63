//! Credential storage that is zeroed from memory on drop.

use std::fmt;
use zeroize::Zeroize;

/// A secret string (API key, secret, passphrase) wiped on drop.
///
/// `Debug` and `Display` are redacted so credentials cannot leak through
/// logging or error formatting.
///
/// # Example
///
/// ```rust
/// use coinbridge_core::credentials::SecretString;
///
/// let secret = SecretString::new("s3cr3t".to_string());
/// assert_eq!(secret.expose_secret(), "s3cr3t");
/// assert_eq!(format!("{secret:?}"), "SecretString(***)");
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Wraps a secret value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns the secret for actual use (signing, headers).
    ///
    /// The explicit name makes accidental exposure grep-able.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Whether the secret is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expose() {
        let s = SecretString::from("key");
        assert_eq!(s.expose_secret(), "key");
        assert!(!s.is_empty());
    }

    #[test]
    fn test_debug_redacted() {
        let s = SecretString::from("very-secret");
        assert!(!format!("{s:?}").contains("very-secret"));
    }
}

//! Cache key derivation

use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a key in characters (hex-encoded SHA-256)
pub const KEY_LEN: usize = 64;

/// Filesystem-safe identifier of a cached command.
///
/// The key is the lowercase hex SHA-256 of the command's raw bytes. There is
/// no tokenization: `"foo  bar"` and `"foo bar"` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a command string
    #[must_use]
    pub fn derive(command: &str) -> Self {
        let digest = Sha256::digest(command.as_bytes());
        Self(hex::encode(digest))
    }

    /// Accept a file name as a key if it has the shape of one
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let valid = name.len() == KEY_LEN
            && name
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(name.to_string()))
    }

    /// The key as a file name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

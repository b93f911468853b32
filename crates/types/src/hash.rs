//! 32-byte hash type.

use sbor::prelude::BasicSbor;
use std::fmt;

/// A 32-byte hash.
///
/// Constructed either from raw digest bytes (see `Hasher` in the core crate)
/// or from shorter byte strings in tests, which are zero-padded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The all-zero hash.
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// Create a hash from exactly 32 bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    /// Create a hash from an arbitrary byte string.
    ///
    /// Takes at most 32 bytes; shorter inputs are zero-padded. Mainly useful
    /// for fixtures; real hashes come out of a `Hasher`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut out = [0u8; 32];
        let n = bytes.len().min(32);
        out[..n].copy_from_slice(&bytes[..n]);
        Hash(out)
    }

    /// The raw bytes of this hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form: first 8 hex chars, enough to eyeball in logs.
        write!(f, "Hash({}…)", &hex::encode(self.0)[..8])
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_pads_short_input() {
        let h = Hash::from_bytes(b"abc");
        assert_eq!(&h.as_bytes()[..3], b"abc");
        assert_eq!(&h.as_bytes()[3..], &[0u8; 29]);
    }

    #[test]
    fn test_from_bytes_truncates_long_input() {
        let h = Hash::from_bytes(&[7u8; 40]);
        assert_eq!(h.as_bytes(), &[7u8; 32]);
    }

    #[test]
    fn test_display_is_hex() {
        let h = Hash::new([0xab; 32]);
        assert_eq!(h.to_string(), "ab".repeat(32));
    }

    #[test]
    fn test_zero() {
        assert!(Hash::ZERO.is_zero());
        assert!(!Hash::from_bytes(b"x").is_zero());
    }
}

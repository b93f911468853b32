//! Ed25519 key and signature wrappers.
//!
//! Thin newtypes over `ed25519_dalek` so the rest of the workspace can use
//! keys as map keys and wire fields without dragging the crypto crate's
//! types through every signature. Ed25519 signing is deterministic, which
//! the chained rand-seed derivation relies on.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use sbor::prelude::BasicSbor;
use std::fmt;

/// A validator public key (32 bytes, ed25519).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify `signature` over `message` under this key.
    ///
    /// Returns false for malformed keys as well as invalid signatures;
    /// callers that need to distinguish should keep keys validated at the
    /// membership boundary.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        key.verify(message, &sig).is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}…)", &hex::encode(self.0)[..8])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// An ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, BasicSbor)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// The raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// An all-zero signature, for fixtures.
    pub fn zero() -> Self {
        Signature([0u8; 64])
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}…)", &hex::encode(self.0)[..8])
    }
}

/// A signing key pair.
///
/// Holds the 32-byte secret seed; the dalek signing key is rebuilt on use,
/// which keeps this type `Copy`-free but trivially cloneable and comparable.
#[derive(Clone)]
pub struct KeyPair {
    secret: [u8; 32],
}

impl KeyPair {
    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        KeyPair { secret: seed }
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        let key = SigningKey::from_bytes(&self.secret);
        PublicKey(key.verifying_key().to_bytes())
    }

    /// Sign `message` with this key. Deterministic per RFC 8032.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let key = SigningKey::from_bytes(&self.secret);
        Signature(key.sign(message).to_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret.
        write!(f, "KeyPair(pub: {:?})", self.public_key())
    }
}

//! Ed25519 single signer.

use crate::{CryptoError, SingleSigner};
use shardline_types::{KeyPair, PublicKey, Signature};

/// Ed25519-backed signer.
///
/// Signing is deterministic (RFC 8032), which makes the chained rand seed
/// reproducible: the same leader key and previous seed always yield the same
/// next seed.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Signer;

impl SingleSigner for Ed25519Signer {
    fn sign(&self, keypair: &KeyPair, message: &[u8]) -> Result<Signature, CryptoError> {
        Ok(keypair.sign(message))
    }

    fn verify(
        &self,
        public_key: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), CryptoError> {
        if public_key.verify(message, signature) {
            Ok(())
        } else {
            Err(CryptoError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify() {
        let signer = Ed25519Signer;
        let kp = KeyPair::from_seed([5u8; 32]);
        let sig = signer.sign(&kp, b"prev rand seed").unwrap();
        assert!(signer
            .verify(&kp.public_key(), b"prev rand seed", &sig)
            .is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_message() {
        let signer = Ed25519Signer;
        let kp = KeyPair::from_seed([5u8; 32]);
        let sig = signer.sign(&kp, b"prev rand seed").unwrap();
        assert!(matches!(
            signer.verify(&kp.public_key(), b"other", &sig),
            Err(CryptoError::InvalidSignature)
        ));
    }

    #[test]
    fn test_deterministic_chaining() {
        // Same key, same input, same output: two nodes recomputing the
        // leader's rand seed agree bit for bit.
        let signer = Ed25519Signer;
        let kp = KeyPair::from_seed([6u8; 32]);
        let a = signer.sign(&kp, b"seed").unwrap();
        let b = signer.sign(&kp, b"seed").unwrap();
        assert_eq!(a, b);
    }
}

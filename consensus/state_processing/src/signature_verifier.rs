//! Signature checks used by the state transition.
//!
//! Block processing only asks for a yes/no answer on a single (pubkey, message, signature)
//! triple and never sees decoded curve points.

use types::{Hash256, PublicKeyBytes, SignatureBytes};

/// Checks a compressed BLS signature over a 32-byte signing root.
pub trait SignatureVerifier {
    /// Returns `true` only if `signature` is a valid signature by `pubkey` over `signing_root`.
    ///
    /// Undecodable keys or signatures are reported as `false`, never as an error.
    fn verify(
        &self,
        pubkey: &PublicKeyBytes,
        signing_root: Hash256,
        signature: &SignatureBytes,
    ) -> bool;
}

/// Verifies signatures with `blst` via the `bls` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlsSignatureVerifier;

impl SignatureVerifier for BlsSignatureVerifier {
    fn verify(
        &self,
        pubkey: &PublicKeyBytes,
        signing_root: Hash256,
        signature: &SignatureBytes,
    ) -> bool {
        let Ok(pubkey) = pubkey.decompress() else {
            return false;
        };
        let Ok(signature) = signature.decompress() else {
            return false;
        };
        signature.verify(&pubkey, signing_root)
    }
}

use crate::{blst_core, Error, Hash256, PublicKey, Signature, DST};

/// The byte-length of a BLS secret key.
pub const SECRET_KEY_BYTES_LEN: usize = 32;

/// A BLS secret key.
///
/// Deliberately not `Debug` or `Serialize`, so the secret never leaks into logs.
#[derive(Clone)]
pub struct SecretKey {
    point: blst_core::SecretKey,
}

impl SecretKey {
    /// Derive a secret key from at least 32 bytes of input key material (EIP-2333 `KeyGen`).
    pub fn key_gen(ikm: &[u8]) -> Result<Self, Error> {
        blst_core::SecretKey::key_gen(ikm, &[])
            .map(|point| Self { point })
            .map_err(Into::into)
    }

    /// Returns the public key that corresponds to self.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_point(self.point.sk_to_pk())
    }

    /// Signs `msg`.
    pub fn sign(&self, msg: Hash256) -> Signature {
        Signature::from_point(self.point.sign(msg.as_bytes(), DST, &[]))
    }

    /// Serialize `self` as big-endian bytes.
    pub fn serialize(&self) -> [u8; SECRET_KEY_BYTES_LEN] {
        self.point.to_bytes()
    }

    /// Deserialize `self` from big-endian bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SECRET_KEY_BYTES_LEN {
            return Err(Error::InvalidSecretKeyLength {
                got: bytes.len(),
                expected: SECRET_KEY_BYTES_LEN,
            });
        }
        blst_core::SecretKey::from_bytes(bytes)
            .map(|point| Self { point })
            .map_err(Into::into)
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}

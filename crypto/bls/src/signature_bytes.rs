use crate::{Error, Signature, SIGNATURE_BYTES_LEN};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use ssz::{Decode, Encode};
use std::fmt;
use std::hash::{Hash, Hasher};
use tree_hash::TreeHash;

/// A wrapper around some bytes that may or may not be a `Signature` in compressed form.
///
/// Deposits carry their signature in this form since the deposit contract accepts any 96 bytes.
#[derive(Clone, Copy)]
pub struct SignatureBytes {
    bytes: [u8; SIGNATURE_BYTES_LEN],
}

impl SignatureBytes {
    /// Decompress and deserialize the bytes in `self` into an actual signature.
    ///
    /// May fail if the bytes are invalid.
    pub fn decompress(&self) -> Result<Signature, Error> {
        Signature::deserialize(&self.bytes)
    }

    /// Instantiates `Self` with all-zeros.
    pub fn empty() -> Self {
        Self {
            bytes: [0; SIGNATURE_BYTES_LEN],
        }
    }

    /// Clones the bytes in `self`.
    ///
    /// The bytes are not verified (i.e., they may not represent a valid BLS point).
    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        self.bytes
    }

    /// Instantiates `Self` from bytes, checking only the byte-length.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() == SIGNATURE_BYTES_LEN {
            let mut sig_bytes = [0; SIGNATURE_BYTES_LEN];
            sig_bytes[..].copy_from_slice(bytes);
            Ok(Self { bytes: sig_bytes })
        } else {
            Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: SIGNATURE_BYTES_LEN,
            })
        }
    }
}

impl From<&Signature> for SignatureBytes {
    fn from(sig: &Signature) -> Self {
        Self {
            bytes: sig.serialize(),
        }
    }
}

impl From<Signature> for SignatureBytes {
    fn from(sig: Signature) -> Self {
        Self::from(&sig)
    }
}

impl PartialEq for SignatureBytes {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..] == other.bytes[..]
    }
}

impl Eq for SignatureBytes {}

impl Hash for SignatureBytes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl Encode for SignatureBytes {
    impl_ssz_encode!(SIGNATURE_BYTES_LEN);
}

impl Decode for SignatureBytes {
    impl_ssz_decode!(SIGNATURE_BYTES_LEN);
}

impl TreeHash for SignatureBytes {
    impl_tree_hash!(SIGNATURE_BYTES_LEN);
}

impl Serialize for SignatureBytes {
    impl_serde_serialize!();
}

impl<'de> Deserialize<'de> for SignatureBytes {
    impl_serde_deserialize!();
}

impl fmt::Debug for SignatureBytes {
    impl_debug!();
}

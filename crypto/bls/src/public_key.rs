use crate::{blst_core, Error};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use ssz::{Decode, Encode};
use std::fmt;
use std::hash::{Hash, Hasher};
use tree_hash::TreeHash;

/// The byte-length of a BLS public key when serialized in compressed form.
pub const PUBLIC_KEY_BYTES_LEN: usize = 48;

/// A decompressed, subgroup-checked BLS public key.
#[derive(Clone)]
pub struct PublicKey {
    point: blst_core::PublicKey,
}

impl PublicKey {
    pub(crate) fn from_point(point: blst_core::PublicKey) -> Self {
        Self { point }
    }

    pub(crate) fn point(&self) -> &blst_core::PublicKey {
        &self.point
    }

    /// Serialize `self` as compressed bytes.
    pub fn serialize(&self) -> [u8; PUBLIC_KEY_BYTES_LEN] {
        self.point.compress()
    }

    /// Deserialize `self` from compressed bytes, validating the point.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != PUBLIC_KEY_BYTES_LEN {
            return Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: PUBLIC_KEY_BYTES_LEN,
            });
        }
        blst_core::PublicKey::key_validate(bytes)
            .map(Self::from_point)
            .map_err(Into::into)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.serialize()[..] == other.serialize()[..]
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialize()[..].hash(state);
    }
}

impl Encode for PublicKey {
    impl_ssz_encode!(PUBLIC_KEY_BYTES_LEN);
}

impl Decode for PublicKey {
    impl_ssz_decode!(PUBLIC_KEY_BYTES_LEN);
}

impl TreeHash for PublicKey {
    impl_tree_hash!(PUBLIC_KEY_BYTES_LEN);
}

impl Serialize for PublicKey {
    impl_serde_serialize!();
}

impl<'de> Deserialize<'de> for PublicKey {
    impl_serde_deserialize!();
}

impl fmt::Debug for PublicKey {
    impl_debug!();
}

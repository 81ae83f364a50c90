use crate::{blst_core, Error, Hash256, PublicKey, DST};
use blst::BLST_ERROR;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use ssz::{Decode, Encode};
use std::fmt;
use tree_hash::TreeHash;

/// The byte-length of a BLS signature when serialized in compressed form.
pub const SIGNATURE_BYTES_LEN: usize = 96;

/// A decompressed BLS signature.
#[derive(Clone)]
pub struct Signature {
    point: blst_core::Signature,
}

impl Signature {
    pub(crate) fn from_point(point: blst_core::Signature) -> Self {
        Self { point }
    }

    /// Serialize `self` as compressed bytes.
    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        self.point.compress()
    }

    /// Deserialize `self` from compressed bytes.
    ///
    /// The subgroup check is deferred to `Self::verify`.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SIGNATURE_BYTES_LEN {
            return Err(Error::InvalidByteLength {
                got: bytes.len(),
                expected: SIGNATURE_BYTES_LEN,
            });
        }
        blst_core::Signature::from_bytes(bytes)
            .map(Self::from_point)
            .map_err(Into::into)
    }

    /// Verify that `self` is a signature across `msg` by `pubkey`.
    pub fn verify(&self, pubkey: &PublicKey, msg: Hash256) -> bool {
        self.point
            .verify(true, msg.as_bytes(), DST, &[], pubkey.point(), true)
            == BLST_ERROR::BLST_SUCCESS
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.serialize()[..] == other.serialize()[..]
    }
}

impl Eq for Signature {}

impl Encode for Signature {
    impl_ssz_encode!(SIGNATURE_BYTES_LEN);
}

impl Decode for Signature {
    impl_ssz_decode!(SIGNATURE_BYTES_LEN);
}

impl TreeHash for Signature {
    impl_tree_hash!(SIGNATURE_BYTES_LEN);
}

impl Serialize for Signature {
    impl_serde_serialize!();
}

impl<'de> Deserialize<'de> for Signature {
    impl_serde_deserialize!();
}

impl fmt::Debug for Signature {
    impl_debug!();
}

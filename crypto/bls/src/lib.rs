//! BLS12-381 signatures for the consensus layer, backed by `blst` with the proof-of-possession
//! ciphersuite.
//!
//! The `*Bytes` types hold compressed points that have not been checked. They are what the
//! state stores; a point is only decompressed when a signature actually needs verifying.

#[macro_use]
mod macros;
mod get_withdrawal_credentials;
mod keypair;
mod public_key;
mod public_key_bytes;
mod secret_key;
mod signature;
mod signature_bytes;

pub use get_withdrawal_credentials::get_withdrawal_credentials;
pub use keypair::Keypair;
pub use public_key::{PublicKey, PUBLIC_KEY_BYTES_LEN};
pub use public_key_bytes::PublicKeyBytes;
pub use secret_key::{SecretKey, SECRET_KEY_BYTES_LEN};
pub use signature::{Signature, SIGNATURE_BYTES_LEN};
pub use signature_bytes::SignatureBytes;

pub use blst::min_pk as blst_core;
use blst::BLST_ERROR;

pub type Hash256 = ethereum_types::H256;

/// Domain separation tag for the `BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_` ciphersuite.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// An error was raised from the `blst` library.
    BlstError(BLST_ERROR),
    /// The provided bytes were an incorrect length.
    InvalidByteLength { got: usize, expected: usize },
    /// The provided secret key bytes were an incorrect length.
    InvalidSecretKeyLength { got: usize, expected: usize },
}

impl From<BLST_ERROR> for Error {
    fn from(e: BLST_ERROR) -> Error {
        Error::BlstError(e)
    }
}

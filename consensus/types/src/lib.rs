//! Ethereum consensus types consumed by the state transition.

#[macro_use]
pub mod test_utils;

pub mod attestation_participation;
pub mod beacon_block;
pub mod beacon_block_body;
pub mod beacon_state;
pub mod chain_spec;
pub mod checkpoint;
pub mod deposit;
pub mod deposit_data;
pub mod deposit_message;
pub mod eth1_data;
pub mod fork;
pub mod fork_data;
pub mod signing_data;
pub mod validator;

#[macro_use]
mod slot_epoch_macros;
pub mod slot_epoch;

use ethereum_types::H256;

pub use crate::attestation_participation::{AttestationParticipation, InclusionInfo};
pub use crate::beacon_block::BeaconBlock;
pub use crate::beacon_block_body::BeaconBlockBody;
pub use crate::beacon_state::{BeaconState, Error as BeaconStateError};
pub use crate::chain_spec::{ChainSpec, Config, Domain};
pub use crate::checkpoint::Checkpoint;
pub use crate::deposit::Deposit;
pub use crate::deposit_data::DepositData;
pub use crate::deposit_message::DepositMessage;
pub use crate::eth1_data::Eth1Data;
pub use crate::fork::Fork;
pub use crate::fork_data::ForkData;
pub use crate::signing_data::{SignedRoot, SigningData};
pub use crate::slot_epoch::{Epoch, Slot};
pub use crate::validator::Validator;

pub type Hash256 = H256;

pub use bls::{
    Keypair, PublicKey, PublicKeyBytes, SecretKey, Signature, SignatureBytes,
    PUBLIC_KEY_BYTES_LEN, SECRET_KEY_BYTES_LEN,
};
pub use ssz_types::{typenum, typenum::Unsigned, BitVector};

/// Justification bits cover the four most recent epochs.
pub type JustificationBitsLength = typenum::U4;

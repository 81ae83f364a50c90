use crate::{BeaconBlockBody, Deposit, Hash256, Slot};

use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};

/// A block of the `BeaconChain`.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct BeaconBlock {
    pub slot: Slot,
    pub parent_root: Hash256,
    pub body: BeaconBlockBody,
}

impl BeaconBlock {
    /// Returns an empty block to be used during genesis.
    pub fn empty(slot: Slot) -> Self {
        BeaconBlock {
            slot,
            ..BeaconBlock::default()
        }
    }

    /// A block at `slot` carrying `deposits` and nothing else.
    pub fn with_deposits(slot: Slot, parent_root: Hash256, deposits: Vec<Deposit>) -> Self {
        BeaconBlock {
            slot,
            parent_root,
            body: BeaconBlockBody { deposits },
        }
    }

    /// Returns the SSZ-derived root of the block, used to link the next block to this one.
    pub fn canonical_root(&self) -> Hash256 {
        Hash256::from_slice(&ethereum_hashing::hash(&ssz::Encode::as_ssz_bytes(self)))
    }
}

use crate::Deposit;

use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};

/// The operations of a `BeaconBlock` that this state transition consumes.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct BeaconBlockBody {
    pub deposits: Vec<Deposit>,
}

use crate::{DepositData, Hash256};

use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};

/// A deposit to potentially become a beacon chain validator.
///
/// `proof` is the bottom-up branch for leaf `index` of the deposit contract tree.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Deposit {
    pub proof: Vec<Hash256>,
    #[serde(with = "serde_utils::quoted_u64")]
    pub index: u64,
    pub data: DepositData,
}

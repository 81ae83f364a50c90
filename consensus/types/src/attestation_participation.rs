use serde::{Deserialize, Serialize};

/// Where and how quickly a validator's previous-epoch attestation made it on chain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionInfo {
    /// The distance between the attestation slot and the slot that attestation was included in a
    /// block.
    #[serde(with = "serde_utils::quoted_u64")]
    pub delay: u64,
    /// The index of the proposer at the slot where the attestation was included.
    pub proposer_index: usize,
}

/// One validator's attestation record over the previous and current epochs.
///
/// Aggregated from blocks by the caller and fed to epoch processing, one entry per validator in
/// registry order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationParticipation {
    /// Attested during the current epoch.
    pub current_epoch_attester: bool,
    /// Attested to the current epoch's boundary block.
    pub current_epoch_target_attester: bool,
    /// Attested during the previous epoch.
    pub previous_epoch_attester: bool,
    /// Attested to the previous epoch's boundary block.
    pub previous_epoch_target_attester: bool,
    /// Attested to the canonical head during the previous epoch.
    pub previous_epoch_head_attester: bool,
    /// Earliest inclusion of the previous-epoch attestation. Required when
    /// `previous_epoch_attester` is set.
    pub inclusion_info: Option<InclusionInfo>,
}

impl AttestationParticipation {
    /// A validator that attested correctly in both epochs, included with `delay` by
    /// `proposer_index`.
    pub fn full(delay: u64, proposer_index: usize) -> Self {
        Self {
            current_epoch_attester: true,
            current_epoch_target_attester: true,
            previous_epoch_attester: true,
            previous_epoch_target_attester: true,
            previous_epoch_head_attester: true,
            inclusion_info: Some(InclusionInfo {
                delay,
                proposer_index,
            }),
        }
    }
}

use crate::per_epoch_processing::{process_epoch, EpochProcessingSummary};
use crate::EpochProcessingError;
use safe_arith::{ArithError, SafeArith};
use types::{AttestationParticipation, BeaconState, BeaconStateError, ChainSpec};

#[derive(Debug, PartialEq)]
pub enum Error {
    BeaconStateError(BeaconStateError),
    EpochProcessingError(EpochProcessingError),
    ArithError(ArithError),
}

impl From<BeaconStateError> for Error {
    fn from(e: BeaconStateError) -> Self {
        Self::BeaconStateError(e)
    }
}

impl From<EpochProcessingError> for Error {
    fn from(e: EpochProcessingError) -> Self {
        Self::EpochProcessingError(e)
    }
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Self {
        Self::ArithError(e)
    }
}

/// Advances a state forward by one slot, performing per-epoch processing if required.
///
/// `participation` is only read when the slot ends an epoch. `None` means no validator
/// participated.
pub fn per_slot_processing(
    state: &mut BeaconState,
    participation: Option<&[AttestationParticipation]>,
    spec: &ChainSpec,
) -> Result<Option<EpochProcessingSummary>, Error> {
    cache_state(state)?;

    let summary = if is_epoch_end(state, spec)? {
        let summary = match participation {
            Some(participation) => process_epoch(state, participation, spec)?,
            None => {
                let absent = vec![AttestationParticipation::default(); state.validators.len()];
                process_epoch(state, &absent, spec)?
            }
        };
        Some(summary)
    } else {
        None
    };

    state.slot.safe_add_assign(1)?;

    Ok(summary)
}

/// Returns `true` if advancing `state` past its current slot runs epoch processing.
pub fn is_epoch_end(state: &BeaconState, spec: &ChainSpec) -> Result<bool, ArithError> {
    Ok(state.slot > spec.genesis_slot
        && state.slot.safe_add(1)?.safe_rem(spec.slots_per_epoch)? == 0)
}

fn cache_state(state: &mut BeaconState) -> Result<(), Error> {
    // Store the root of the latest block as the block root for this slot. Empty slots repeat
    // the root of the most recent block.
    let latest_block_root = state.latest_block_root;
    state.set_block_root(state.slot, latest_block_root)?;

    Ok(())
}

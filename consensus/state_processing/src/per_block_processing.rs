use crate::signature_verifier::SignatureVerifier;
use errors::BlockProcessingError;
use types::*;

pub use self::verify_deposit::{
    get_existing_validator_index, is_valid_deposit_signature, verify_deposit_index,
    verify_deposit_merkle_proof,
};
pub use process_operations::{process_deposit, process_deposits};

pub mod errors;
mod process_operations;
mod verify_deposit;

/// Updates the state for a new block, whilst validating that the block is valid.
///
/// The state must already have been advanced to `block.slot` with `per_slot_processing`.
///
/// Returns `Ok(())` if the block is valid and the state was successfully updated. Otherwise
/// returns an error describing why the block was invalid or how the function failed to execute.
/// An invalid block leaves `state` unmodified.
pub fn per_block_processing<V: SignatureVerifier>(
    state: &mut BeaconState,
    block: &BeaconBlock,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    block_verify!(
        block.slot == state.slot,
        BlockProcessingError::StateSlotMismatch {
            state: state.slot,
            block: block.slot,
        }
    );
    state.verify_list_lengths(spec)?;

    process_deposits(state, &block.body.deposits, verifier, spec)?;

    state.latest_block_root = block.canonical_root();

    Ok(())
}

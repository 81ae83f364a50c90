#![deny(clippy::wildcard_imports)]

use errors::EpochProcessingError as Error;
use types::{AttestationParticipation, BeaconState, ChainSpec};

pub use epoch_processing_summary::EpochProcessingSummary;
pub use final_updates::{
    process_effective_balance_updates, process_final_updates, process_slashings_reset,
};
pub use fork_upgrade::process_fork_upgrade;
pub use justification_and_finalization::{
    process_justification_and_finalization, weigh_justification_and_finalization,
};
pub use registry_updates::process_registry_updates;
pub use rewards_and_penalties::{process_rewards_and_penalties, AttestationDelta, Delta};
pub use slashings::process_slashings;
pub use validator_statuses::{TotalBalances, ValidatorStatus, ValidatorStatuses};

pub mod epoch_processing_summary;
pub mod errors;
pub mod final_updates;
pub mod fork_upgrade;
pub mod justification_and_finalization;
pub mod registry_updates;
pub mod rewards_and_penalties;
pub mod slashings;
pub mod tests;
pub mod validator_statuses;

/// Performs per-epoch processing on some BeaconState.
///
/// `participation` holds one attestation record per validator, in registry order.
///
/// The steps run against a copy of `state`, which replaces it only once every step has
/// succeeded. An error leaves `state` as it was passed in.
pub fn process_epoch(
    state: &mut BeaconState,
    participation: &[AttestationParticipation],
    spec: &ChainSpec,
) -> Result<EpochProcessingSummary, Error> {
    state.verify_list_lengths(spec)?;

    let mut post_state = state.clone();
    let summary = process_epoch_steps(&mut post_state, participation, spec)?;
    *state = post_state;

    Ok(summary)
}

fn process_epoch_steps(
    state: &mut BeaconState,
    participation: &[AttestationParticipation],
    spec: &ChainSpec,
) -> Result<EpochProcessingSummary, Error> {
    // Load the struct we use to assign validators into sets based on their participation.
    //
    // E.g., attestation in the previous epoch, attested to the head, etc.
    let mut validator_statuses = ValidatorStatuses::new(state, spec)?;
    validator_statuses.process_participation(state, participation)?;

    // Justification and finalization.
    process_justification_and_finalization(state, &validator_statuses.total_balances, spec)?;

    // Rewards and Penalties.
    process_rewards_and_penalties(state, &validator_statuses, spec)?;

    // Registry Updates.
    process_registry_updates(state, spec)?;

    // Slashings.
    process_slashings(
        state,
        validator_statuses.total_balances.current_epoch(),
        spec,
    )?;

    // Effective balances and the slashings reset.
    process_final_updates(state, spec)?;

    // Scheduled fork version change.
    process_fork_upgrade(state, spec)?;

    Ok(validator_statuses.into())
}

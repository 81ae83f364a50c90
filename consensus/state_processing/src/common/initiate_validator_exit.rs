use safe_arith::SafeArith;
use std::cmp::max;
use types::{BeaconState, BeaconStateError, ChainSpec, Epoch};

/// Initiate the exit of the validator of the given `index`.
///
/// The exit queue is derived by scanning the registry for already-scheduled exits.
pub fn initiate_validator_exit(
    state: &mut BeaconState,
    index: usize,
    spec: &ChainSpec,
) -> Result<(), BeaconStateError> {
    // Return if the validator already initiated exit
    if state.get_validator(index)?.exit_epoch != spec.far_future_epoch {
        return Ok(());
    }

    // Compute exit queue epoch
    let delayed_epoch = spec.compute_activation_exit_epoch(state.current_epoch(spec))?;
    let mut exit_queue_epoch = state
        .validators
        .iter()
        .map(|validator| validator.exit_epoch)
        .filter(|exit_epoch| *exit_epoch != spec.far_future_epoch)
        .fold(delayed_epoch, max);
    let exit_queue_churn = exit_churn_at(state, exit_queue_epoch);

    if exit_queue_churn >= state.get_validator_churn_limit(spec)? {
        exit_queue_epoch.safe_add_assign(1)?;
    }

    let validator = state.get_validator_mut(index)?;
    validator.exit_epoch = exit_queue_epoch;
    validator.withdrawable_epoch =
        exit_queue_epoch.safe_add(spec.min_validator_withdrawability_delay)?;

    Ok(())
}

/// The number of validators scheduled to exit at `epoch`.
fn exit_churn_at(state: &BeaconState, epoch: Epoch) -> u64 {
    state
        .validators
        .iter()
        .filter(|validator| validator.exit_epoch == epoch)
        .count() as u64
}

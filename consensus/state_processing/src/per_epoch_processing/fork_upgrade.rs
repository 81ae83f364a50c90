use super::errors::EpochProcessingError as Error;
use types::{BeaconState, ChainSpec, Fork};

/// Switch the state to the scheduled fork version when the next epoch is the fork epoch.
///
/// Returns `true` if the fork was updated. Running it again for the same epoch is a no-op, as
/// the state already carries the new version.
pub fn process_fork_upgrade(state: &mut BeaconState, spec: &ChainSpec) -> Result<bool, Error> {
    let next_epoch = state.next_epoch(spec)?;

    match spec.fork_version_scheduled_at(next_epoch) {
        Some(next_version) if state.fork.current_version != next_version => {
            state.fork = Fork {
                previous_version: state.fork.current_version,
                current_version: next_version,
                epoch: next_epoch,
            };
            Ok(true)
        }
        _ => Ok(false),
    }
}

#![cfg(test)]
use crate::per_epoch_processing::{errors::EpochProcessingError, process_epoch};
use types::test_utils::TestingBeaconStateBuilder;
use types::{AttestationParticipation, BeaconState, ChainSpec, Epoch};

const VALIDATOR_COUNT: usize = 16;

fn state_at_end_of(epoch: u64, spec: &ChainSpec) -> BeaconState {
    let mut builder =
        TestingBeaconStateBuilder::from_deterministic_keypairs(VALIDATOR_COUNT, spec);
    builder.teleport_to_slot(Epoch::new(epoch).end_slot(spec.slots_per_epoch));
    builder.build().0
}

fn full_participation() -> Vec<AttestationParticipation> {
    (0..VALIDATOR_COUNT)
        .map(|i| AttestationParticipation::full(1, i))
        .collect()
}

#[test]
fn runs_without_error() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_end_of(4, &spec);

    let summary = process_epoch(&mut state, &full_participation(), &spec).unwrap();

    assert_eq!(
        summary.previous_epoch_target_attesting_balance(),
        VALIDATOR_COUNT as u64 * spec.max_effective_balance
    );
    assert!(summary.is_active_in_current_epoch(0));
    assert!(!summary.is_active_in_current_epoch(VALIDATOR_COUNT));
    assert_eq!(state.balances.len(), state.validators.len());
}

#[test]
fn rejects_mismatched_participation() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_end_of(4, &spec);
    let pre_state = state.clone();

    let result = process_epoch(&mut state, &full_participation()[1..], &spec);

    assert_eq!(
        result,
        Err(EpochProcessingError::ValidatorStatusesInconsistent {
            validators: VALIDATOR_COUNT,
            participation: VALIDATOR_COUNT - 1,
        })
    );
    assert_eq!(state, pre_state);
}

#[test]
fn failing_step_leaves_state_untouched() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_end_of(4, &spec);
    // Justification runs first, then the reward for the last validator overflows.
    state.balances[VALIDATOR_COUNT - 1] = u64::MAX;
    let pre_state = state.clone();

    let result = process_epoch(&mut state, &full_participation(), &spec);

    assert!(result.is_err());
    assert_eq!(state, pre_state);
}

#[test]
fn slashed_validator_is_penalised_at_midpoint() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_end_of(4, &spec);
    let target = Epoch::new(4) + (spec.epochs_per_slashings_vector / 2) as u64;
    state.validators[3].slashed = true;
    state.validators[3].exit_epoch = Epoch::new(5);
    state.validators[3].withdrawable_epoch = target;
    state.set_slashings(Epoch::new(3), spec.max_effective_balance).unwrap();
    let mut participation = full_participation();
    participation[3] = AttestationParticipation::default();
    let before = state.balances[3];

    process_epoch(&mut state, &participation, &spec).unwrap();

    assert!(state.balances[3] < before);
    // The slashings slot for epoch 5 is recycled.
    assert_eq!(state.get_slashings(Epoch::new(5)), Ok(0));
    assert_eq!(state.get_slashings(Epoch::new(3)), Ok(spec.max_effective_balance));
}

#[test]
fn effective_balances_follow_balances() {
    let spec = ChainSpec::minimal();
    let mut state = state_at_end_of(4, &spec);
    state.balances[0] = 20 * spec.effective_balance_increment;
    state.balances[1] = 10 * spec.effective_balance_increment;

    process_epoch(&mut state, &full_participation(), &spec).unwrap();

    let increment = spec.effective_balance_increment;
    assert_eq!(state.validators[0].effective_balance, 20 * increment);
    assert_eq!(state.validators[1].effective_balance, 10 * increment);
    // Ejection uses the effective balance from before this epoch's update.
    assert_eq!(state.validators[1].exit_epoch, spec.far_future_epoch);

    state.slot += spec.slots_per_epoch;
    process_epoch(&mut state, &full_participation(), &spec).unwrap();

    assert_ne!(state.validators[1].exit_epoch, spec.far_future_epoch);
    assert_eq!(state.validators[0].exit_epoch, spec.far_future_epoch);
}

#[test]
fn fork_transition_is_applied_once() {
    let spec = ChainSpec {
        next_fork_version: [2, 0, 0, 1],
        next_fork_epoch: Some(Epoch::new(5)),
        ..ChainSpec::minimal()
    };
    let mut state = state_at_end_of(4, &spec);

    process_epoch(&mut state, &full_participation(), &spec).unwrap();
    assert_eq!(state.fork.current_version, [2, 0, 0, 1]);
    assert_eq!(state.fork.previous_version, spec.genesis_fork_version);
    assert_eq!(state.fork.epoch, Epoch::new(5));

    // Re-running the same boundary does not upgrade again.
    let fork = state.fork;
    process_epoch(&mut state, &full_participation(), &spec).unwrap();
    assert_eq!(state.fork, fork);
}

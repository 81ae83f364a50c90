use super::errors::EpochProcessingError as Error;
use crate::common::initiate_validator_exit;
use itertools::Itertools;
use safe_arith::SafeArith;
use types::{BeaconState, ChainSpec, Validator};

/// Performs a validator registry update, if required.
pub fn process_registry_updates(state: &mut BeaconState, spec: &ChainSpec) -> Result<(), Error> {
    // Process activation eligibility and ejections.
    // Collect eligible and exiting validators (we need to avoid mutating the state while
    // iterating).
    // We assume it's safe to re-order the change in eligibility and `initiate_validator_exit`.
    // Exiting validators are still queued in registry order.
    let current_epoch = state.current_epoch(spec);
    let is_ejectable = |validator: &Validator| {
        validator.is_active_at(current_epoch)
            && validator.effective_balance <= spec.ejection_balance
    };
    let indices_to_update: Vec<_> = state
        .validators
        .iter()
        .enumerate()
        .filter(|(_, validator)| {
            validator.is_eligible_for_activation_queue(spec) || is_ejectable(validator)
        })
        .map(|(idx, _)| idx)
        .collect();

    for index in indices_to_update {
        let validator = state.get_validator_mut(index)?;
        if validator.is_eligible_for_activation_queue(spec) {
            validator.activation_eligibility_epoch = current_epoch.safe_add(1)?;
        }
        if is_ejectable(validator) {
            initiate_validator_exit(state, index, spec)?;
        }
    }

    // Queue validators eligible for activation and not dequeued for activation prior to finalized
    // epoch.
    let activation_queue = state
        .validators
        .iter()
        .enumerate()
        .filter(|(_, validator)| validator.is_eligible_for_activation(state, spec))
        .sorted_by_key(|(index, validator)| (validator.activation_eligibility_epoch, *index))
        .map(|(index, _)| index)
        .collect_vec();

    // Dequeue validators for activation up to churn limit
    let churn_limit = state.get_validator_churn_limit(spec)? as usize;
    let delayed_activation_epoch = spec.compute_activation_exit_epoch(current_epoch)?;
    for index in activation_queue.into_iter().take(churn_limit) {
        state.get_validator_mut(index)?.activation_epoch = delayed_activation_epoch;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::test_utils::TestingBeaconStateBuilder;
    use types::{Checkpoint, Epoch};

    fn pending_validator(eligibility_epoch: Epoch, spec: &ChainSpec) -> Validator {
        Validator {
            effective_balance: spec.max_effective_balance,
            activation_eligibility_epoch: eligibility_epoch,
            activation_epoch: spec.far_future_epoch,
            exit_epoch: spec.far_future_epoch,
            withdrawable_epoch: spec.far_future_epoch,
            ..Validator::default()
        }
    }

    #[test]
    fn new_max_balance_validators_join_the_queue() {
        let spec = ChainSpec::minimal();
        let mut builder = TestingBeaconStateBuilder::from_deterministic_keypairs(4, &spec);
        builder.teleport_to_epoch(Epoch::new(3), &spec);
        let (mut state, _, _) = builder.build();
        let queued = pending_validator(spec.far_future_epoch, &spec);
        let under_funded = Validator {
            effective_balance: spec.max_effective_balance - spec.effective_balance_increment,
            ..queued.clone()
        };
        state.push_validator(queued, spec.max_effective_balance);
        state.push_validator(under_funded, spec.max_effective_balance);

        process_registry_updates(&mut state, &spec).unwrap();

        assert_eq!(state.validators[4].activation_eligibility_epoch, Epoch::new(4));
        assert_eq!(
            state.validators[5].activation_eligibility_epoch,
            spec.far_future_epoch
        );
        // Not finalized yet, so nobody is activated.
        assert_eq!(state.validators[4].activation_epoch, spec.far_future_epoch);
    }

    #[test]
    fn activations_are_ordered_and_churn_limited() {
        let spec = ChainSpec {
            min_per_epoch_churn_limit: 2,
            ..ChainSpec::minimal()
        };
        let mut builder = TestingBeaconStateBuilder::from_deterministic_keypairs(4, &spec);
        builder.teleport_to_epoch(Epoch::new(5), &spec);
        let (mut state, _, _) = builder.build();
        state.finalized_checkpoint = Checkpoint {
            epoch: Epoch::new(3),
            ..Checkpoint::default()
        };
        // Indices 4..=7, queued at epochs 3, 1, 2, 1.
        for epoch in [3, 1, 2, 1] {
            state.push_validator(
                pending_validator(Epoch::new(epoch), &spec),
                spec.max_effective_balance,
            );
        }

        process_registry_updates(&mut state, &spec).unwrap();

        let activation_epoch = spec.compute_activation_exit_epoch(Epoch::new(5)).unwrap();
        let activated: Vec<_> = (4..8)
            .filter(|i| state.validators[*i].activation_epoch == activation_epoch)
            .collect();
        assert_eq!(activated, vec![5, 7]);
        assert_eq!(state.validators[4].activation_epoch, spec.far_future_epoch);
        assert_eq!(state.validators[6].activation_epoch, spec.far_future_epoch);
    }

    #[test]
    fn low_balance_validators_are_ejected() {
        let spec = ChainSpec::minimal();
        let mut builder = TestingBeaconStateBuilder::from_deterministic_keypairs(4, &spec);
        builder.teleport_to_epoch(Epoch::new(3), &spec);
        builder.state_mut().validators[2].effective_balance = spec.ejection_balance;
        let (mut state, _, _) = builder.build();

        process_registry_updates(&mut state, &spec).unwrap();

        let exit_epoch = spec.compute_activation_exit_epoch(Epoch::new(3)).unwrap();
        assert_eq!(state.validators[2].exit_epoch, exit_epoch);
        assert_eq!(
            state.validators[2].withdrawable_epoch,
            exit_epoch + spec.min_validator_withdrawability_delay
        );
        assert_eq!(state.validators[1].exit_epoch, spec.far_future_epoch);
    }
}

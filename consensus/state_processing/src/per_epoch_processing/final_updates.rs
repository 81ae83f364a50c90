use super::errors::EpochProcessingError;
use safe_arith::SafeArith;
use types::{BeaconState, BeaconStateError, ChainSpec};

/// Update effective balances, then clear the slashings slot for the next epoch.
pub fn process_final_updates(
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<(), EpochProcessingError> {
    process_effective_balance_updates(state, spec)?;
    process_slashings_reset(state, spec)
}

/// Move each effective balance towards its balance, ignoring moves smaller than the hysteresis
/// thresholds.
pub fn process_effective_balance_updates(
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<(), EpochProcessingError> {
    let hysteresis_increment = spec
        .effective_balance_increment
        .safe_div(spec.hysteresis_quotient)?;
    let downward_threshold = hysteresis_increment.safe_mul(spec.hysteresis_downward_multiplier)?;
    let upward_threshold = hysteresis_increment.safe_mul(spec.hysteresis_upward_multiplier)?;

    let BeaconState {
        validators,
        balances,
        ..
    } = state;

    for (index, validator) in validators.iter_mut().enumerate() {
        let balance = balances
            .get(index)
            .copied()
            .ok_or(BeaconStateError::BalancesOutOfBounds(index))?;

        if balance.safe_add(downward_threshold)? < validator.effective_balance
            || validator.effective_balance.safe_add(upward_threshold)? < balance
        {
            validator.effective_balance = std::cmp::min(
                balance.safe_sub(balance.safe_rem(spec.effective_balance_increment)?)?,
                spec.max_effective_balance,
            );
        }
    }

    Ok(())
}

pub fn process_slashings_reset(
    state: &mut BeaconState,
    spec: &ChainSpec,
) -> Result<(), EpochProcessingError> {
    let next_epoch = state.next_epoch(spec)?;
    state.set_slashings(next_epoch, 0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::test_utils::TestingBeaconStateBuilder;
    use types::Epoch;

    const GWEI: u64 = 1_000_000_000;

    fn effective_balance_after(balance: u64, effective_balance: u64) -> u64 {
        let spec = ChainSpec::mainnet();
        let (mut state, _, _) =
            TestingBeaconStateBuilder::from_deterministic_keypairs(1, &spec).build();
        state.validators[0].effective_balance = effective_balance;
        state.balances[0] = balance;

        process_effective_balance_updates(&mut state, &spec).unwrap();
        state.validators[0].effective_balance
    }

    #[test]
    fn small_drops_are_ignored() {
        // Downward threshold is a quarter increment.
        assert_eq!(effective_balance_after(32 * GWEI - GWEI / 4, 32 * GWEI), 32 * GWEI);
        assert_eq!(
            effective_balance_after(32 * GWEI - GWEI / 4 - 1, 32 * GWEI),
            31 * GWEI
        );
    }

    #[test]
    fn small_rises_are_ignored() {
        // Upward threshold is one and a quarter increments.
        assert_eq!(effective_balance_after(21 * GWEI + GWEI / 4, 20 * GWEI), 20 * GWEI);
        assert_eq!(
            effective_balance_after(21 * GWEI + GWEI / 4 + 1, 20 * GWEI),
            21 * GWEI
        );
    }

    #[test]
    fn effective_balance_is_capped() {
        assert_eq!(effective_balance_after(64 * GWEI, 32 * GWEI), 32 * GWEI);
        assert_eq!(effective_balance_after(40 * GWEI, 16 * GWEI), 32 * GWEI);
    }

    #[test]
    fn slashings_reset_clears_next_epoch_only() {
        let spec = ChainSpec::minimal();
        let mut builder = TestingBeaconStateBuilder::from_deterministic_keypairs(1, &spec);
        builder.teleport_to_epoch(Epoch::new(7), &spec);
        let (mut state, _, _) = builder.build();
        state.set_slashings(Epoch::new(7), 5).unwrap();
        state.set_slashings(Epoch::new(8), 6).unwrap();

        process_slashings_reset(&mut state, &spec).unwrap();

        assert_eq!(state.get_slashings(Epoch::new(7)), Ok(5));
        assert_eq!(state.get_slashings(Epoch::new(8)), Ok(0));
    }
}

use super::errors::EpochProcessingError as Error;
use super::validator_statuses::TotalBalances;
use safe_arith::SafeArith;
use types::{BeaconState, BitVector, ChainSpec, Checkpoint, JustificationBitsLength};

/// Update the justified and finalized checkpoints for matching target attestations.
pub fn process_justification_and_finalization(
    state: &mut BeaconState,
    total_balances: &TotalBalances,
    spec: &ChainSpec,
) -> Result<(), Error> {
    if state.current_epoch(spec) <= spec.genesis_epoch.safe_add(1)? {
        return Ok(());
    }

    weigh_justification_and_finalization(
        state,
        total_balances.current_epoch(),
        total_balances.previous_epoch_target_attesters(),
        total_balances.current_epoch_target_attesters(),
        spec,
    )
}

/// Apply the supermajority rule to the target balances, then finalize from the justification
/// bits.
pub fn weigh_justification_and_finalization(
    state: &mut BeaconState,
    total_active_balance: u64,
    previous_target_balance: u64,
    current_target_balance: u64,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let previous_epoch = state.previous_epoch(spec);
    let current_epoch = state.current_epoch(spec);

    let old_previous_justified_checkpoint = state.previous_justified_checkpoint;
    let old_current_justified_checkpoint = state.current_justified_checkpoint;

    // Process justifications
    state.previous_justified_checkpoint = state.current_justified_checkpoint;
    state.justification_bits.shift_up(1)?;

    if previous_target_balance.safe_mul(3)? >= total_active_balance.safe_mul(2)? {
        state.current_justified_checkpoint = Checkpoint {
            epoch: previous_epoch,
            root: state.get_block_root_at_epoch(previous_epoch, spec)?,
        };
        state.justification_bits.set(1, true)?;
    }
    // If the current epoch gets justified, fill the last bit.
    if current_target_balance.safe_mul(3)? >= total_active_balance.safe_mul(2)? {
        state.current_justified_checkpoint = Checkpoint {
            epoch: current_epoch,
            root: state.get_block_root_at_epoch(current_epoch, spec)?,
        };
        state.justification_bits.set(0, true)?;
    }

    let bits = &state.justification_bits;

    // The 2nd/3rd/4th most recent epochs are all justified, the 2nd using the 4th as source.
    let finalize_previous_from_fourth = all_set(bits, 1..4)
        && old_previous_justified_checkpoint.epoch.safe_add(3)? == current_epoch;
    // The 2nd/3rd most recent epochs are both justified, the 2nd using the 3rd as source.
    let finalize_previous_from_third = all_set(bits, 1..3)
        && old_previous_justified_checkpoint.epoch.safe_add(2)? == current_epoch;
    // The 1st/2nd/3rd most recent epochs are all justified, the 1st using the 3rd as source.
    let finalize_current_from_third = all_set(bits, 0..3)
        && old_current_justified_checkpoint.epoch.safe_add(2)? == current_epoch;
    // The 1st/2nd most recent epochs are both justified, the 1st using the 2nd as source.
    let finalize_current_from_second = all_set(bits, 0..2)
        && old_current_justified_checkpoint.epoch.safe_add(1)? == current_epoch;

    if finalize_previous_from_fourth || finalize_previous_from_third {
        state.finalized_checkpoint = old_previous_justified_checkpoint;
    }
    if finalize_current_from_third || finalize_current_from_second {
        state.finalized_checkpoint = old_current_justified_checkpoint;
    }

    Ok(())
}

fn all_set(
    bits: &BitVector<JustificationBitsLength>,
    mut indices: std::ops::Range<usize>,
) -> bool {
    indices.all(|i| bits.get(i).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::test_utils::TestingBeaconStateBuilder;
    use types::{Epoch, Hash256, Slot};

    const BALANCE: u64 = 32_000_000_000;

    fn state_at_epoch(epoch: u64, spec: &ChainSpec) -> BeaconState {
        let mut builder = TestingBeaconStateBuilder::from_deterministic_keypairs(4, spec);
        // Epoch processing runs on the last slot of the epoch.
        builder.teleport_to_slot(Epoch::new(epoch).end_slot(spec.slots_per_epoch));
        let (mut state, _, _) = builder.build();
        // Give every slot a distinct root so checkpoints can be told apart.
        let history = spec.slots_per_historical_root as u64;
        let start = state.slot.as_u64().saturating_sub(history);
        for slot in start..state.slot.as_u64() {
            state
                .set_block_root(Slot::new(slot), Hash256::from_low_u64_be(slot + 1))
                .unwrap();
        }
        state
    }

    fn checkpoint(epoch: u64, spec: &ChainSpec) -> Checkpoint {
        Checkpoint {
            epoch: Epoch::new(epoch),
            root: Hash256::from_low_u64_be(epoch * spec.slots_per_epoch + 1),
        }
    }

    #[test]
    fn skipped_in_first_two_epochs() {
        let spec = ChainSpec::minimal();
        let mut state = state_at_epoch(1, &spec);
        let pre_state = state.clone();

        let balances = TotalBalances::new(&spec);
        process_justification_and_finalization(&mut state, &balances, &spec).unwrap();
        assert_eq!(state, pre_state);
    }

    #[test]
    fn supermajority_justifies_both_epochs() {
        let spec = ChainSpec::minimal();
        let mut state = state_at_epoch(5, &spec);

        weigh_justification_and_finalization(
            &mut state,
            3 * BALANCE,
            2 * BALANCE,
            2 * BALANCE,
            &spec,
        )
        .unwrap();

        assert_eq!(state.current_justified_checkpoint, checkpoint(5, &spec));
        assert!(state.justification_bits.get(0).unwrap());
        assert!(state.justification_bits.get(1).unwrap());
        // The old current checkpoint (genesis) moves to previous.
        assert_eq!(state.previous_justified_checkpoint, Checkpoint::default());
    }

    #[test]
    fn below_two_thirds_does_not_justify() {
        let spec = ChainSpec::minimal();
        let mut state = state_at_epoch(5, &spec);
        state.justification_bits.set(0, true).unwrap();

        weigh_justification_and_finalization(
            &mut state,
            3 * BALANCE,
            2 * BALANCE - 1,
            2 * BALANCE - 1,
            &spec,
        )
        .unwrap();

        assert_eq!(state.current_justified_checkpoint, Checkpoint::default());
        // The previous bit only shifted.
        assert!(!state.justification_bits.get(0).unwrap());
        assert!(state.justification_bits.get(1).unwrap());
    }

    #[test]
    fn finalizes_current_justified_with_one_epoch_gap() {
        let spec = ChainSpec::minimal();
        let mut state = state_at_epoch(5, &spec);
        state.current_justified_checkpoint = checkpoint(4, &spec);
        state.justification_bits.set(0, true).unwrap();

        weigh_justification_and_finalization(&mut state, 3 * BALANCE, 0, 3 * BALANCE, &spec)
            .unwrap();

        assert_eq!(state.finalized_checkpoint, checkpoint(4, &spec));
        assert_eq!(state.current_justified_checkpoint, checkpoint(5, &spec));
        assert_eq!(state.previous_justified_checkpoint, checkpoint(4, &spec));
    }

    #[test]
    fn finalizes_previous_justified_with_three_epoch_gap() {
        let spec = ChainSpec::minimal();
        let mut state = state_at_epoch(6, &spec);
        state.previous_justified_checkpoint = checkpoint(3, &spec);
        state.current_justified_checkpoint = checkpoint(4, &spec);
        // Epochs 4 and 3 justified, counted back from epoch 5.
        state.justification_bits.set(1, true).unwrap();
        state.justification_bits.set(2, true).unwrap();

        // Only epoch 5 (the previous epoch) reaches a supermajority now.
        weigh_justification_and_finalization(&mut state, 3 * BALANCE, 3 * BALANCE, 0, &spec)
            .unwrap();

        assert_eq!(state.finalized_checkpoint, checkpoint(3, &spec));
        assert_eq!(state.current_justified_checkpoint, checkpoint(5, &spec));
    }

    #[test]
    fn no_finality_without_consecutive_justification() {
        let spec = ChainSpec::minimal();
        let mut state = state_at_epoch(5, &spec);
        state.current_justified_checkpoint = checkpoint(4, &spec);

        weigh_justification_and_finalization(&mut state, 3 * BALANCE, 0, 3 * BALANCE, &spec)
            .unwrap();

        assert_eq!(state.finalized_checkpoint, Checkpoint::default());
    }
}

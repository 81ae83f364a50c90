use super::*;
use crate::per_block_processing::errors::{BlockProcessingError, IntoWithIndex};
use rayon::prelude::*;
use safe_arith::SafeArith;
use std::collections::BTreeMap;

/// Validates each `Deposit` and updates the state, short-circuiting on an invalid object.
///
/// Every deposit is checked before the state is touched, so an `Err` leaves `state` exactly as
/// it was passed in.
pub fn process_deposits<V: SignatureVerifier>(
    state: &mut BeaconState,
    deposits: &[Deposit],
    verifier: &V,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let expected_deposit_len =
        std::cmp::min(spec.max_deposits, state.get_outstanding_deposit_len()?);
    block_verify!(
        deposits.len() as u64 == expected_deposit_len,
        BlockProcessingError::DepositCountInvalid {
            expected: expected_deposit_len as usize,
            found: deposits.len(),
        }
    );

    // Verify merkle proofs in parallel, reporting the earliest failure.
    let state_ref: &BeaconState = state;
    if let Some(e) = deposits
        .par_iter()
        .enumerate()
        .find_map_first(|(i, deposit)| {
            verify_deposit_merkle_proof(state_ref, deposit, spec)
                .err()
                .map(|e| e.into_with_index(i))
        })
    {
        return Err(e);
    }

    for (i, deposit) in deposits.iter().enumerate() {
        verify_deposit_index(state, deposit, i).map_err(|e| e.into_with_index(i))?;
    }

    // Stage the deposits in series, then write them all at once.
    let mut pending = PendingDeposits::new(state);
    for deposit in deposits {
        pending.apply(state, deposit, verifier, spec)?;
    }
    pending.commit(state)
}

/// Process a single deposit whose merkle proof and position have already been verified.
///
/// A deposit for a new pubkey with an invalid signature is skipped without error; it still
/// consumes its deposit index.
pub fn process_deposit<V: SignatureVerifier>(
    state: &mut BeaconState,
    deposit: &Deposit,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let mut pending = PendingDeposits::new(state);
    pending.apply(state, deposit, verifier, spec)?;
    pending.commit(state)
}

/// The effect of a sequence of deposits, held aside from the `BeaconState` it applies to.
///
/// Nothing reaches the state until `commit`, so a failing deposit discards the whole sequence.
struct PendingDeposits {
    eth1_deposit_index: u64,
    /// New balances of validators already in the registry.
    top_ups: BTreeMap<usize, u64>,
    /// Validators created by these deposits, in deposit order, with their balances.
    new_validators: Vec<(Validator, u64)>,
}

impl PendingDeposits {
    fn new(state: &BeaconState) -> Self {
        Self {
            eth1_deposit_index: state.eth1_deposit_index,
            top_ups: BTreeMap::new(),
            new_validators: vec![],
        }
    }

    fn apply<V: SignatureVerifier>(
        &mut self,
        state: &BeaconState,
        deposit: &Deposit,
        verifier: &V,
        spec: &ChainSpec,
    ) -> Result<(), BlockProcessingError> {
        self.eth1_deposit_index.safe_add_assign(1)?;

        let pubkey = &deposit.data.pubkey;
        let amount = deposit.data.amount;

        if let Some(index) = get_existing_validator_index(state, pubkey) {
            // Update the existing validator balance.
            let balance = match self.top_ups.get(&index) {
                Some(balance) => *balance,
                None => state.get_balance(index)?,
            };
            self.top_ups.insert(index, balance.safe_add(amount)?);
        } else if let Some((_, balance)) = self
            .new_validators
            .iter_mut()
            .find(|(validator, _)| validator.pubkey == *pubkey)
        {
            // A validator created earlier in the same block.
            balance.safe_add_assign(amount)?;
        } else if is_valid_deposit_signature(&deposit.data, verifier, spec) {
            // The signature is only checked for new validators.
            let validator = Validator {
                pubkey: *pubkey,
                withdrawal_credentials: deposit.data.withdrawal_credentials,
                activation_eligibility_epoch: spec.far_future_epoch,
                activation_epoch: spec.far_future_epoch,
                exit_epoch: spec.far_future_epoch,
                withdrawable_epoch: spec.far_future_epoch,
                effective_balance: std::cmp::min(
                    amount.safe_sub(amount.safe_rem(spec.effective_balance_increment)?)?,
                    spec.max_effective_balance,
                ),
                slashed: false,
            };
            self.new_validators.push((validator, amount));
        }

        Ok(())
    }

    /// Write the staged deposits into `state`.
    ///
    /// Every index in `top_ups` was read from `state` by `apply`.
    fn commit(self, state: &mut BeaconState) -> Result<(), BlockProcessingError> {
        for (index, balance) in self.top_ups {
            *state.get_balance_mut(index)? = balance;
        }
        for (validator, balance) in self.new_validators {
            state.push_validator(validator, balance);
        }
        state.eth1_deposit_index = self.eth1_deposit_index;
        Ok(())
    }
}

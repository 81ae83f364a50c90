use super::errors::EpochProcessingError as Error;
use super::validator_statuses::{TotalBalances, ValidatorStatus, ValidatorStatuses};
use crate::common::{decrease_balance_directly, increase_balance_directly};
use integer_sqrt::IntegerSquareRoot;
use rayon::prelude::*;
use safe_arith::SafeArith;
use types::{BeaconState, ChainSpec};

/// Combination of several deltas for different components of an attestation reward.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct AttestationDelta {
    pub source_delta: Delta,
    pub target_delta: Delta,
    pub head_delta: Delta,
    pub inclusion_delay_delta: Delta,
    pub inactivity_penalty_delta: Delta,
}

impl AttestationDelta {
    /// Flatten into a single delta.
    pub fn flatten(self) -> Result<Delta, Error> {
        let AttestationDelta {
            source_delta,
            target_delta,
            head_delta,
            inclusion_delay_delta,
            inactivity_penalty_delta,
        } = self;
        let mut result = Delta::default();
        for delta in [
            source_delta,
            target_delta,
            head_delta,
            inclusion_delay_delta,
            inactivity_penalty_delta,
        ] {
            result.combine(delta)?;
        }
        Ok(result)
    }
}

/// Use to track the changes to a validators balance.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Delta {
    pub rewards: u64,
    pub penalties: u64,
}

impl Delta {
    /// Reward the validator with the `reward`.
    pub fn reward(&mut self, reward: u64) -> Result<(), Error> {
        self.rewards = self.rewards.safe_add(reward)?;
        Ok(())
    }

    /// Penalize the validator with the `penalty`.
    pub fn penalize(&mut self, penalty: u64) -> Result<(), Error> {
        self.penalties = self.penalties.safe_add(penalty)?;
        Ok(())
    }

    /// Combine two deltas.
    fn combine(&mut self, other: Delta) -> Result<(), Error> {
        self.reward(other.rewards)?;
        self.penalize(other.penalties)
    }
}

/// Apply attester and proposer rewards.
pub fn process_rewards_and_penalties(
    state: &mut BeaconState,
    validator_statuses: &ValidatorStatuses,
    spec: &ChainSpec,
) -> Result<(), Error> {
    if state.current_epoch(spec) == spec.genesis_epoch {
        return Ok(());
    }

    // Guard against an out-of-bounds during the validator balance update.
    if validator_statuses.statuses.len() != state.balances.len()
        || validator_statuses.statuses.len() != state.validators.len()
    {
        return Err(Error::ValidatorStatusesInconsistent {
            validators: state.validators.len(),
            participation: validator_statuses.statuses.len(),
        });
    }

    let deltas = get_attestation_deltas(state, validator_statuses, spec)?;

    // Apply the deltas, erroring on overflow above but not on overflow below (saturating at 0
    // instead). The balances are replaced only once every delta has been applied.
    let mut balances = state.balances.clone();
    for (balance, delta) in balances.iter_mut().zip(deltas) {
        let combined_delta = delta.flatten()?;
        increase_balance_directly(balance, combined_delta.rewards)?;
        decrease_balance_directly(balance, combined_delta.penalties)?;
    }
    state.balances = balances;

    Ok(())
}

/// How far finality lags behind the previous epoch.
#[derive(Clone, Copy)]
struct Finality {
    delay: u64,
    is_in_inactivity_leak: bool,
}

/// The deltas owed to a single validator, plus the proposer reward it earns for some other
/// validator.
type ValidatorDeltas = (AttestationDelta, Option<(usize, Delta)>);

/// Apply rewards for participation in attestations during the previous epoch.
pub fn get_attestation_deltas(
    state: &BeaconState,
    validator_statuses: &ValidatorStatuses,
    spec: &ChainSpec,
) -> Result<Vec<AttestationDelta>, Error> {
    let finality = Finality {
        delay: state.get_finality_delay(spec)?,
        is_in_inactivity_leak: state.is_in_inactivity_leak(spec)?,
    };
    let total_balances = &validator_statuses.total_balances;

    // Each validator's own deltas depend only on its own status, so they can be computed in
    // parallel.
    let per_validator = validator_statuses
        .statuses
        .par_iter()
        .enumerate()
        .map(|(index, validator)| {
            get_validator_deltas(state, index, validator, total_balances, finality, spec)
        })
        .collect::<Result<Vec<ValidatorDeltas>, Error>>()?;

    let mut deltas = vec![AttestationDelta::default(); state.validators.len()];

    for (index, (validator_delta, proposer_delta)) in per_validator.into_iter().enumerate() {
        let delta = deltas
            .get_mut(index)
            .ok_or(Error::DeltaOutOfBounds(index))?;
        delta.source_delta.combine(validator_delta.source_delta)?;
        delta.target_delta.combine(validator_delta.target_delta)?;
        delta.head_delta.combine(validator_delta.head_delta)?;
        delta
            .inclusion_delay_delta
            .combine(validator_delta.inclusion_delay_delta)?;
        delta
            .inactivity_penalty_delta
            .combine(validator_delta.inactivity_penalty_delta)?;

        if let Some((proposer_index, proposer_delta)) = proposer_delta {
            deltas
                .get_mut(proposer_index)
                .ok_or(Error::DeltaOutOfBounds(proposer_index))?
                .inclusion_delay_delta
                .combine(proposer_delta)?;
        }
    }

    Ok(deltas)
}

fn get_validator_deltas(
    state: &BeaconState,
    index: usize,
    validator: &ValidatorStatus,
    total_balances: &TotalBalances,
    finality: Finality,
    spec: &ChainSpec,
) -> Result<ValidatorDeltas, Error> {
    // Ignore ineligible validators. Any validator that is in the unslashed attesting indices of
    // the previous epoch is active, and therefore eligible.
    if !validator.is_eligible {
        return Ok((AttestationDelta::default(), None));
    }

    let base_reward = get_base_reward(state, index, total_balances.current_epoch(), spec)?;

    let source_delta =
        get_source_delta(validator, base_reward, total_balances, finality, spec)?;
    let target_delta =
        get_target_delta(validator, base_reward, total_balances, finality, spec)?;
    let head_delta = get_head_delta(validator, base_reward, total_balances, finality, spec)?;
    let (inclusion_delay_delta, proposer_delta) =
        get_inclusion_delay_delta(validator, base_reward, spec)?;
    let inactivity_penalty_delta =
        get_inactivity_penalty_delta(validator, base_reward, finality, spec)?;

    Ok((
        AttestationDelta {
            source_delta,
            target_delta,
            head_delta,
            inclusion_delay_delta,
            inactivity_penalty_delta,
        },
        proposer_delta,
    ))
}

fn get_attestation_component_delta(
    index_in_unslashed_attesting_indices: bool,
    attesting_balance: u64,
    total_balances: &TotalBalances,
    base_reward: u64,
    finality: Finality,
    spec: &ChainSpec,
) -> Result<Delta, Error> {
    let mut delta = Delta::default();

    let total_balance = total_balances.current_epoch();

    if index_in_unslashed_attesting_indices {
        if finality.is_in_inactivity_leak {
            // Since full base reward will be canceled out by inactivity penalty deltas,
            // optimal participation receives full base reward compensation here.
            delta.reward(base_reward)?;
        } else {
            let reward_numerator = base_reward
                .safe_mul(attesting_balance.safe_div(spec.effective_balance_increment)?)?;
            delta.reward(
                reward_numerator
                    .safe_div(total_balance.safe_div(spec.effective_balance_increment)?)?,
            )?;
        }
    } else {
        delta.penalize(base_reward)?;
    }

    Ok(delta)
}

fn get_source_delta(
    validator: &ValidatorStatus,
    base_reward: u64,
    total_balances: &TotalBalances,
    finality: Finality,
    spec: &ChainSpec,
) -> Result<Delta, Error> {
    get_attestation_component_delta(
        validator.is_previous_epoch_attester && !validator.is_slashed,
        total_balances.previous_epoch_attesters(),
        total_balances,
        base_reward,
        finality,
        spec,
    )
}

fn get_target_delta(
    validator: &ValidatorStatus,
    base_reward: u64,
    total_balances: &TotalBalances,
    finality: Finality,
    spec: &ChainSpec,
) -> Result<Delta, Error> {
    get_attestation_component_delta(
        validator.is_previous_epoch_target_attester && !validator.is_slashed,
        total_balances.previous_epoch_target_attesters(),
        total_balances,
        base_reward,
        finality,
        spec,
    )
}

fn get_head_delta(
    validator: &ValidatorStatus,
    base_reward: u64,
    total_balances: &TotalBalances,
    finality: Finality,
    spec: &ChainSpec,
) -> Result<Delta, Error> {
    get_attestation_component_delta(
        validator.is_previous_epoch_head_attester && !validator.is_slashed,
        total_balances.previous_epoch_head_attesters(),
        total_balances,
        base_reward,
        finality,
        spec,
    )
}

fn get_inclusion_delay_delta(
    validator: &ValidatorStatus,
    base_reward: u64,
    spec: &ChainSpec,
) -> Result<(Delta, Option<(usize, Delta)>), Error> {
    // Only unslashed previous epoch attesters earn an inclusion reward. Their inclusion info was
    // checked by `ValidatorStatuses::process_participation`.
    let inclusion_info = validator
        .inclusion_info
        .filter(|_| validator.is_previous_epoch_attester && !validator.is_slashed);
    if let Some(inclusion_info) = inclusion_info {
        let mut delta = Delta::default();
        let mut proposer_delta = Delta::default();

        // Reward proposer
        let proposer_reward = get_proposer_reward(base_reward, spec)?;
        proposer_delta.reward(proposer_reward)?;

        // Reward attester
        let max_attester_reward = base_reward.safe_sub(proposer_reward)?;
        delta.reward(max_attester_reward.safe_div(inclusion_info.delay)?)?;

        let proposer_index = inclusion_info.proposer_index;
        Ok((delta, Some((proposer_index, proposer_delta))))
    } else {
        Ok((Delta::default(), None))
    }
}

fn get_inactivity_penalty_delta(
    validator: &ValidatorStatus,
    base_reward: u64,
    finality: Finality,
    spec: &ChainSpec,
) -> Result<Delta, Error> {
    let mut delta = Delta::default();

    // Inactivity penalty
    if finality.is_in_inactivity_leak {
        // If validator is performing optimally this cancels all rewards for a neutral balance
        delta.penalize(
            spec.base_rewards_per_epoch
                .safe_mul(base_reward)?
                .safe_sub(get_proposer_reward(base_reward, spec)?)?,
        )?;

        // Additionally, all validators whose FFG target didn't match are penalized extra.
        if validator.is_slashed || !validator.is_previous_epoch_target_attester {
            delta.penalize(
                validator
                    .current_epoch_effective_balance
                    .safe_mul(finality.delay)?
                    .safe_div(spec.inactivity_penalty_quotient)?,
            )?;
        }
    }

    Ok(delta)
}

/// Compute the reward awarded to a proposer for including an attestation from a validator.
///
/// The `base_reward` param should be the `base_reward` of the attesting validator.
fn get_proposer_reward(base_reward: u64, spec: &ChainSpec) -> Result<u64, Error> {
    Ok(base_reward.safe_div(spec.proposer_reward_quotient)?)
}

/// Returns the base reward for some validator.
pub fn get_base_reward(
    state: &BeaconState,
    index: usize,
    // Should be == state.get_total_active_balance(spec)
    total_active_balance: u64,
    spec: &ChainSpec,
) -> Result<u64, Error> {
    if total_active_balance == 0 {
        Ok(0)
    } else {
        Ok(state
            .get_effective_balance(index)?
            .safe_mul(spec.base_reward_factor)?
            .safe_div(total_active_balance.integer_sqrt())?
            .safe_div(spec.base_rewards_per_epoch)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::test_utils::TestingBeaconStateBuilder;
    use types::{AttestationParticipation, Epoch};

    const VALIDATOR_COUNT: usize = 4;

    fn state_at_epoch(epoch: u64, spec: &ChainSpec) -> BeaconState {
        let mut builder =
            TestingBeaconStateBuilder::from_deterministic_keypairs(VALIDATOR_COUNT, spec);
        builder.teleport_to_slot(Epoch::new(epoch).end_slot(spec.slots_per_epoch));
        builder.build().0
    }

    fn statuses(
        state: &BeaconState,
        participation: &[AttestationParticipation],
        spec: &ChainSpec,
    ) -> ValidatorStatuses {
        let mut statuses = ValidatorStatuses::new(state, spec).unwrap();
        statuses.process_participation(state, participation).unwrap();
        statuses
    }

    #[test]
    fn base_reward_formula() {
        let spec = ChainSpec::mainnet();
        let state = state_at_epoch(3, &spec);
        let total = VALIDATOR_COUNT as u64 * spec.max_effective_balance;

        let expected = spec.max_effective_balance * spec.base_reward_factor
            / total.integer_sqrt()
            / spec.base_rewards_per_epoch;
        assert_eq!(get_base_reward(&state, 0, total, &spec), Ok(expected));
        assert_eq!(get_base_reward(&state, 0, 0, &spec), Ok(0));
    }

    #[test]
    fn no_rewards_at_genesis_epoch() {
        let spec = ChainSpec::mainnet();
        let mut state = state_at_epoch(0, &spec);
        let participation = vec![AttestationParticipation::default(); VALIDATOR_COUNT];
        let statuses = statuses(&state, &participation, &spec);
        let pre_state = state.clone();

        process_rewards_and_penalties(&mut state, &statuses, &spec).unwrap();
        assert_eq!(state, pre_state);
    }

    #[test]
    fn perfect_participation_is_rewarded() {
        let spec = ChainSpec::mainnet();
        let mut state = state_at_epoch(3, &spec);
        // Validator 0 proposed every inclusion block.
        let participation = vec![AttestationParticipation::full(1, 0); VALIDATOR_COUNT];
        let statuses = statuses(&state, &participation, &spec);

        let total = statuses.total_balances.current_epoch();
        let base_reward = get_base_reward(&state, 0, total, &spec).unwrap();
        let proposer_reward = base_reward / spec.proposer_reward_quotient;

        process_rewards_and_penalties(&mut state, &statuses, &spec).unwrap();

        // Full attesting balance: each component pays the whole base reward.
        let attester_reward = 3 * base_reward + (base_reward - proposer_reward);
        let balance = spec.max_effective_balance;
        assert_eq!(
            state.balances[0],
            balance + attester_reward + VALIDATOR_COUNT as u64 * proposer_reward
        );
        for i in 1..VALIDATOR_COUNT {
            assert_eq!(state.balances[i], balance + attester_reward);
        }
    }

    #[test]
    fn overflowing_reward_leaves_balances_untouched() {
        let spec = ChainSpec::mainnet();
        let mut state = state_at_epoch(3, &spec);
        state.balances[VALIDATOR_COUNT - 1] = u64::MAX;
        let participation = vec![AttestationParticipation::full(1, 0); VALIDATOR_COUNT];
        let statuses = statuses(&state, &participation, &spec);
        let pre_balances = state.balances.clone();

        assert!(process_rewards_and_penalties(&mut state, &statuses, &spec).is_err());
        assert_eq!(state.balances, pre_balances);
    }

    #[test]
    fn non_participants_are_penalized() {
        let spec = ChainSpec::mainnet();
        let mut state = state_at_epoch(3, &spec);
        let mut participation = vec![AttestationParticipation::full(2, 1); VALIDATOR_COUNT];
        participation[3] = AttestationParticipation::default();
        let statuses = statuses(&state, &participation, &spec);

        let total = statuses.total_balances.current_epoch();
        let base_reward = get_base_reward(&state, 3, total, &spec).unwrap();

        process_rewards_and_penalties(&mut state, &statuses, &spec).unwrap();

        assert_eq!(state.balances[3], spec.max_effective_balance - 3 * base_reward);
        assert!(state.balances[0] > spec.max_effective_balance);
    }

    #[test]
    fn inclusion_delay_divides_attester_reward() {
        let spec = ChainSpec::mainnet();
        let state = state_at_epoch(3, &spec);
        let mut participation = vec![AttestationParticipation::full(1, 0); VALIDATOR_COUNT];
        participation[2] = AttestationParticipation::full(4, 0);
        let statuses = statuses(&state, &participation, &spec);

        let deltas = get_attestation_deltas(&state, &statuses, &spec).unwrap();

        let total = statuses.total_balances.current_epoch();
        let base_reward = get_base_reward(&state, 2, total, &spec).unwrap();
        let proposer_reward = base_reward / spec.proposer_reward_quotient;
        assert_eq!(
            deltas[2].inclusion_delay_delta.rewards,
            (base_reward - proposer_reward) / 4
        );
        assert_eq!(
            deltas[1].inclusion_delay_delta.rewards,
            base_reward - proposer_reward
        );
    }

    #[test]
    fn inactivity_leak_penalizes_missed_targets() {
        let spec = ChainSpec::mainnet();
        let epoch = spec.min_epochs_to_inactivity_penalty + 3;
        let state = state_at_epoch(epoch, &spec);
        let mut participation = vec![AttestationParticipation::full(1, 0); VALIDATOR_COUNT];
        participation[1].previous_epoch_target_attester = false;
        participation[1].previous_epoch_head_attester = false;
        let statuses = statuses(&state, &participation, &spec);
        let finality_delay = state.get_finality_delay(&spec).unwrap();
        assert!(finality_delay > spec.min_epochs_to_inactivity_penalty);

        let deltas = get_attestation_deltas(&state, &statuses, &spec).unwrap();

        let total = statuses.total_balances.current_epoch();
        let base_reward = get_base_reward(&state, 1, total, &spec).unwrap();
        let proposer_reward = base_reward / spec.proposer_reward_quotient;
        let leak_penalty = spec.base_rewards_per_epoch * base_reward - proposer_reward;

        // Optimal attesters get full base rewards per component while leaking.
        assert_eq!(deltas[2].source_delta.rewards, base_reward);
        assert_eq!(deltas[2].inactivity_penalty_delta.penalties, leak_penalty);
        assert_eq!(
            deltas[1].inactivity_penalty_delta.penalties,
            leak_penalty
                + spec.max_effective_balance * finality_delay / spec.inactivity_penalty_quotient
        );
    }

    #[test]
    fn ineligible_validators_are_untouched() {
        let spec = ChainSpec::mainnet();
        let mut builder =
            TestingBeaconStateBuilder::from_deterministic_keypairs(VALIDATOR_COUNT, &spec);
        builder.teleport_to_slot(Epoch::new(3).end_slot(spec.slots_per_epoch));
        builder.state_mut().validators[3].activation_epoch = Epoch::new(100);
        let (state, _, _) = builder.build();
        let participation = vec![AttestationParticipation::default(); VALIDATOR_COUNT];
        let statuses = statuses(&state, &participation, &spec);

        let deltas = get_attestation_deltas(&state, &statuses, &spec).unwrap();
        assert_eq!(deltas[3], AttestationDelta::default());
        assert_ne!(deltas[0], AttestationDelta::default());
    }
}

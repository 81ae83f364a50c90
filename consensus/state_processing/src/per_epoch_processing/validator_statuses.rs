use super::errors::EpochProcessingError as Error;
use safe_arith::SafeArith;
use types::{AttestationParticipation, BeaconState, ChainSpec, InclusionInfo};

/// Information required to reward some validator during the current and previous epoch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidatorStatus {
    /// True if the validator has been slashed, ever.
    pub is_slashed: bool,
    /// True if the validator can withdraw in the current epoch.
    pub is_withdrawable_in_current_epoch: bool,
    /// True if the validator was active in the state's _current_ epoch.
    pub is_active_in_current_epoch: bool,
    /// True if the validator was active in the state's _previous_ epoch.
    pub is_active_in_previous_epoch: bool,
    /// True if the validator is owed rewards or penalties for the previous epoch.
    pub is_eligible: bool,
    /// The validator's effective balance in the _current_ epoch.
    pub current_epoch_effective_balance: u64,

    /// True if the validator had an attestation included in the _current_ epoch.
    pub is_current_epoch_attester: bool,
    /// True if the validator's beacon block root attestation for the first slot of the _current_
    /// epoch matches the block root known to the state.
    pub is_current_epoch_target_attester: bool,
    /// True if the validator had an attestation included in the _previous_ epoch.
    pub is_previous_epoch_attester: bool,
    /// True if the validator's beacon block root attestation for the first slot of the _previous_
    /// epoch matches the block root known to the state.
    pub is_previous_epoch_target_attester: bool,
    /// True if the validator's beacon block root attestation in the _previous_ epoch at the
    /// attestation's slot matches the block root known to the state.
    pub is_previous_epoch_head_attester: bool,

    /// Information used to reward the block producer of this validators earliest-included
    /// attestation.
    ///
    /// `ValidatorStatuses::process_participation` guarantees this is present, with a non-zero
    /// delay, for every previous epoch attester.
    pub inclusion_info: Option<InclusionInfo>,
}

/// The total effective balances for different sets of validators during the previous and current
/// epochs.
#[derive(Clone, Debug, PartialEq)]
pub struct TotalBalances {
    /// The effective balance increment from the `ChainSpec`.
    effective_balance_increment: u64,
    /// The total effective balance of all active validators during the _current_ epoch.
    current_epoch: u64,
    /// The total effective balance of all active validators during the _previous_ epoch.
    previous_epoch: u64,
    /// The total effective balance of all validators who attested during the _current_ epoch.
    current_epoch_attesters: u64,
    /// The total effective balance of all validators who attested during the _current_ epoch and
    /// agreed with the state about the beacon block at the first slot of the _current_ epoch.
    current_epoch_target_attesters: u64,
    /// The total effective balance of all validators who attested during the _previous_ epoch.
    previous_epoch_attesters: u64,
    /// The total effective balance of all validators who attested during the _previous_ epoch and
    /// agreed with the state about the beacon block at the first slot of the _previous_ epoch.
    previous_epoch_target_attesters: u64,
    /// The total effective balance of all validators who attested during the _previous_ epoch and
    /// agreed with the state about the beacon block at the time of attestation.
    previous_epoch_head_attesters: u64,
}

// Generate a safe accessor for a balance in `TotalBalances`, floored at one increment.
macro_rules! balance_accessor {
    ($field_name:ident) => {
        pub fn $field_name(&self) -> u64 {
            std::cmp::max(self.effective_balance_increment, self.$field_name)
        }
    };
}

impl TotalBalances {
    pub fn new(spec: &ChainSpec) -> Self {
        Self {
            effective_balance_increment: spec.effective_balance_increment,
            current_epoch: 0,
            previous_epoch: 0,
            current_epoch_attesters: 0,
            current_epoch_target_attesters: 0,
            previous_epoch_attesters: 0,
            previous_epoch_target_attesters: 0,
            previous_epoch_head_attesters: 0,
        }
    }

    balance_accessor!(current_epoch);
    balance_accessor!(previous_epoch);
    balance_accessor!(current_epoch_attesters);
    balance_accessor!(current_epoch_target_attesters);
    balance_accessor!(previous_epoch_attesters);
    balance_accessor!(previous_epoch_target_attesters);
    balance_accessor!(previous_epoch_head_attesters);
}

/// Summarised information about validator participation in the _previous and _current_ epochs of
/// some `BeaconState`.
#[derive(Debug, Clone)]
pub struct ValidatorStatuses {
    /// Information about each individual validator from the state's validator registry.
    pub statuses: Vec<ValidatorStatus>,
    /// Summed balances for various sets of validators.
    pub total_balances: TotalBalances,
}

impl ValidatorStatuses {
    /// Initializes a new instance, determining:
    ///
    /// - Active validators
    /// - Validators eligible for rewards and penalties
    /// - Total balances for the current and previous epochs.
    pub fn new(state: &BeaconState, spec: &ChainSpec) -> Result<Self, Error> {
        let mut statuses = Vec::with_capacity(state.validators.len());
        let mut total_balances = TotalBalances::new(spec);

        let current_epoch = state.current_epoch(spec);
        let previous_epoch = state.previous_epoch(spec);

        for (i, validator) in state.validators.iter().enumerate() {
            let effective_balance = state.get_effective_balance(i)?;
            let mut status = ValidatorStatus {
                is_slashed: validator.slashed,
                is_withdrawable_in_current_epoch: validator.is_withdrawable_at(current_epoch),
                current_epoch_effective_balance: effective_balance,
                ..ValidatorStatus::default()
            };

            if validator.is_active_at(current_epoch) {
                status.is_active_in_current_epoch = true;
                total_balances
                    .current_epoch
                    .safe_add_assign(effective_balance)?;
            }

            if validator.is_active_at(previous_epoch) {
                status.is_active_in_previous_epoch = true;
                total_balances
                    .previous_epoch
                    .safe_add_assign(effective_balance)?;
            }

            status.is_eligible = status.is_active_in_previous_epoch
                || (validator.slashed
                    && previous_epoch.safe_add(1)? < validator.withdrawable_epoch);

            statuses.push(status);
        }

        Ok(Self {
            statuses,
            total_balances,
        })
    }

    /// Fold the per-validator `participation` records into `statuses` and the attester totals.
    ///
    /// `participation` must hold exactly one entry per validator, in registry order.
    pub fn process_participation(
        &mut self,
        state: &BeaconState,
        participation: &[AttestationParticipation],
    ) -> Result<(), Error> {
        if participation.len() != self.statuses.len() {
            return Err(Error::ValidatorStatusesInconsistent {
                validators: self.statuses.len(),
                participation: participation.len(),
            });
        }

        for (index, (status, record)) in self.statuses.iter_mut().zip(participation).enumerate() {
            if record.previous_epoch_attester {
                let inclusion_info = record
                    .inclusion_info
                    .ok_or(Error::InclusionInfoMissing(index))?;
                if inclusion_info.delay == 0 {
                    return Err(Error::InclusionDistanceZero);
                }
            }

            status.is_current_epoch_attester = record.current_epoch_attester;
            status.is_current_epoch_target_attester = record.current_epoch_target_attester;
            status.is_previous_epoch_attester = record.previous_epoch_attester;
            status.is_previous_epoch_target_attester = record.previous_epoch_target_attester;
            status.is_previous_epoch_head_attester = record.previous_epoch_head_attester;
            status.inclusion_info = record
                .inclusion_info
                .filter(|_| record.previous_epoch_attester);
        }

        // Compute the total balances
        for (index, v) in self.statuses.iter().enumerate() {
            // Only unslashed validators count towards the totals.
            if !v.is_slashed {
                let validator_balance = state.get_effective_balance(index)?;

                if v.is_current_epoch_attester {
                    self.total_balances
                        .current_epoch_attesters
                        .safe_add_assign(validator_balance)?;
                }
                if v.is_current_epoch_target_attester {
                    self.total_balances
                        .current_epoch_target_attesters
                        .safe_add_assign(validator_balance)?;
                }
                if v.is_previous_epoch_attester {
                    self.total_balances
                        .previous_epoch_attesters
                        .safe_add_assign(validator_balance)?;
                }
                if v.is_previous_epoch_target_attester {
                    self.total_balances
                        .previous_epoch_target_attesters
                        .safe_add_assign(validator_balance)?;
                }
                if v.is_previous_epoch_head_attester {
                    self.total_balances
                        .previous_epoch_head_attesters
                        .safe_add_assign(validator_balance)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::test_utils::TestingBeaconStateBuilder;
    use types::Epoch;

    #[test]
    fn totals_are_floored_at_one_increment() {
        let spec = ChainSpec::minimal();
        let balances = TotalBalances::new(&spec);
        assert_eq!(balances.current_epoch(), spec.effective_balance_increment);
        assert_eq!(
            balances.previous_epoch_head_attesters(),
            spec.effective_balance_increment
        );
    }

    #[test]
    fn slashed_attesters_do_not_count() {
        let spec = ChainSpec::minimal();
        let mut builder = TestingBeaconStateBuilder::from_deterministic_keypairs(4, &spec);
        builder.teleport_to_epoch(Epoch::new(2), &spec);
        builder.state_mut().validators[3].slashed = true;
        let (state, _, _) = builder.build();

        let participation = vec![AttestationParticipation::full(1, 0); 4];
        let mut statuses = ValidatorStatuses::new(&state, &spec).unwrap();
        statuses
            .process_participation(&state, &participation)
            .unwrap();

        let balance = spec.max_effective_balance;
        assert_eq!(statuses.total_balances.current_epoch(), 4 * balance);
        assert_eq!(
            statuses.total_balances.previous_epoch_target_attesters(),
            3 * balance
        );
        assert!(statuses.statuses[3].is_previous_epoch_target_attester);
    }

    #[test]
    fn participation_must_match_registry() {
        let spec = ChainSpec::minimal();
        let (state, _, _) =
            TestingBeaconStateBuilder::from_deterministic_keypairs(4, &spec).build();

        let mut statuses = ValidatorStatuses::new(&state, &spec).unwrap();
        assert_eq!(
            statuses.process_participation(&state, &[]),
            Err(Error::ValidatorStatusesInconsistent {
                validators: 4,
                participation: 0,
            })
        );
    }

    #[test]
    fn previous_epoch_attesters_need_inclusion_info() {
        let spec = ChainSpec::minimal();
        let (state, _, _) =
            TestingBeaconStateBuilder::from_deterministic_keypairs(2, &spec).build();

        let mut participation = vec![AttestationParticipation::full(1, 0); 2];
        participation[1].inclusion_info = None;
        let mut statuses = ValidatorStatuses::new(&state, &spec).unwrap();
        assert_eq!(
            statuses.process_participation(&state, &participation),
            Err(Error::InclusionInfoMissing(1))
        );

        let participation = vec![AttestationParticipation::full(0, 0); 2];
        let mut statuses = ValidatorStatuses::new(&state, &spec).unwrap();
        assert_eq!(
            statuses.process_participation(&state, &participation),
            Err(Error::InclusionDistanceZero)
        );
    }

    #[test]
    fn slashed_validators_stay_eligible_until_withdrawable() {
        let spec = ChainSpec::minimal();
        let mut builder = TestingBeaconStateBuilder::from_deterministic_keypairs(2, &spec);
        builder.teleport_to_epoch(Epoch::new(10), &spec);
        for validator in builder.state_mut().validators.iter_mut() {
            validator.slashed = true;
            validator.exit_epoch = Epoch::new(5);
        }
        builder.state_mut().validators[0].withdrawable_epoch = Epoch::new(11);
        builder.state_mut().validators[1].withdrawable_epoch = Epoch::new(10);
        let (state, _, _) = builder.build();

        let statuses = ValidatorStatuses::new(&state, &spec).unwrap();
        assert!(statuses.statuses[0].is_eligible);
        assert!(!statuses.statuses[1].is_eligible);
    }
}

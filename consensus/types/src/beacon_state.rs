use crate::*;
use safe_arith::{ArithError, SafeArith};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    UnknownValidator(usize),
    BalancesOutOfBounds(usize),
    SlotOutOfBounds,
    SlashingsOutOfBounds(usize),
    /// `Eth1Data::deposit_count` is behind `eth1_deposit_index`.
    InvalidDepositState {
        deposit_count: u64,
        deposit_index: u64,
    },
    /// The per-epoch lists in the state do not have the lengths configured in the `ChainSpec`.
    InvalidListLength {
        list: &'static str,
        expected: usize,
        found: usize,
    },
    ArithError(ArithError),
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Error {
        Error::ArithError(e)
    }
}

/// The state of the `BeaconChain` at some slot.
///
/// `validators` and `balances` always have the same length: entry `i` of each describes
/// validator `i`, and validators are only ever appended.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct BeaconState {
    // Versioning
    #[serde(with = "serde_utils::quoted_u64")]
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,

    // History
    pub latest_block_root: Hash256,
    pub block_roots: Vec<Hash256>,

    // Ethereum 1.0 chain data
    pub eth1_data: Eth1Data,
    #[serde(with = "serde_utils::quoted_u64")]
    pub eth1_deposit_index: u64,

    // Registry
    pub validators: Vec<Validator>,
    #[serde(with = "serde_utils::quoted_u64_vec")]
    pub balances: Vec<u64>,

    // Slashings
    #[serde(with = "serde_utils::quoted_u64_vec")]
    pub slashings: Vec<u64>,

    // Finality
    pub justification_bits: BitVector<JustificationBitsLength>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
}

impl BeaconState {
    /// Create a new BeaconState suitable for genesis, with an empty registry.
    pub fn new(genesis_time: u64, eth1_data: Eth1Data, spec: &ChainSpec) -> Self {
        BeaconState {
            // Versioning
            genesis_time,
            genesis_validators_root: Hash256::zero(),
            slot: spec.genesis_slot,
            fork: Fork {
                previous_version: spec.genesis_fork_version,
                current_version: spec.genesis_fork_version,
                epoch: spec.genesis_epoch,
            },

            // History
            latest_block_root: Hash256::zero(),
            block_roots: vec![Hash256::zero(); spec.slots_per_historical_root],

            // Eth1
            eth1_data,
            eth1_deposit_index: 0,

            // Validator registry
            validators: vec![],
            balances: vec![],

            // Slashings
            slashings: vec![0; spec.epochs_per_slashings_vector],

            // Finality
            justification_bits: BitVector::new(),
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),
        }
    }

    /// Check that the circular lists in `self` have the lengths that `spec` expects.
    pub fn verify_list_lengths(&self, spec: &ChainSpec) -> Result<(), Error> {
        let checks = [
            (
                "block_roots",
                spec.slots_per_historical_root,
                self.block_roots.len(),
            ),
            (
                "slashings",
                spec.epochs_per_slashings_vector,
                self.slashings.len(),
            ),
            ("balances", self.validators.len(), self.balances.len()),
        ];
        for (list, expected, found) in checks {
            if expected != found {
                return Err(Error::InvalidListLength {
                    list,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    /// The epoch corresponding to `self.slot`.
    pub fn current_epoch(&self, spec: &ChainSpec) -> Epoch {
        self.slot.epoch(spec.slots_per_epoch)
    }

    /// The epoch prior to `self.current_epoch()`.
    ///
    /// If the current epoch is the genesis epoch, the genesis_epoch is returned.
    pub fn previous_epoch(&self, spec: &ChainSpec) -> Epoch {
        let current_epoch = self.current_epoch(spec);
        if current_epoch > spec.genesis_epoch {
            current_epoch
                .safe_sub(1)
                .unwrap_or(spec.genesis_epoch)
        } else {
            current_epoch
        }
    }

    /// The epoch following `self.current_epoch()`.
    pub fn next_epoch(&self, spec: &ChainSpec) -> Result<Epoch, Error> {
        Ok(self.current_epoch(spec).safe_add(1)?)
    }

    /// Safe indexer for the `validators` list.
    pub fn get_validator(&self, validator_index: usize) -> Result<&Validator, Error> {
        self.validators
            .get(validator_index)
            .ok_or(Error::UnknownValidator(validator_index))
    }

    /// Safe mutator for the `validators` list.
    pub fn get_validator_mut(&mut self, validator_index: usize) -> Result<&mut Validator, Error> {
        self.validators
            .get_mut(validator_index)
            .ok_or(Error::UnknownValidator(validator_index))
    }

    /// Get the balance of a single validator.
    pub fn get_balance(&self, validator_index: usize) -> Result<u64, Error> {
        self.balances
            .get(validator_index)
            .copied()
            .ok_or(Error::BalancesOutOfBounds(validator_index))
    }

    /// Get a mutable reference to the balance of a single validator.
    pub fn get_balance_mut(&mut self, validator_index: usize) -> Result<&mut u64, Error> {
        self.balances
            .get_mut(validator_index)
            .ok_or(Error::BalancesOutOfBounds(validator_index))
    }

    /// Get the effective balance of a single validator.
    pub fn get_effective_balance(&self, validator_index: usize) -> Result<u64, Error> {
        self.get_validator(validator_index)
            .map(|validator| validator.effective_balance)
    }

    /// Append a new validator together with its balance, keeping both lists the same length.
    pub fn push_validator(&mut self, validator: Validator, balance: u64) {
        self.validators.push(validator);
        self.balances.push(balance);
    }

    /// Return the index of the validator with `pubkey`, using a linear scan of the registry.
    pub fn get_validator_index(&self, pubkey: &PublicKeyBytes) -> Option<usize> {
        self.validators
            .iter()
            .position(|validator| validator.pubkey == *pubkey)
    }

    /// Get the number of outstanding deposits.
    ///
    /// Returns `Err` if the state is invalid.
    pub fn get_outstanding_deposit_len(&self) -> Result<u64, Error> {
        self.eth1_data
            .deposit_count
            .checked_sub(self.eth1_deposit_index)
            .ok_or(Error::InvalidDepositState {
                deposit_count: self.eth1_data.deposit_count,
                deposit_index: self.eth1_deposit_index,
            })
    }

    /// Safely obtains the index for `block_roots`, given some `slot`.
    fn get_latest_block_roots_index(&self, slot: Slot) -> Result<usize, Error> {
        let len = self.block_roots.len() as u64;
        if slot < self.slot && self.slot <= slot.safe_add(len)? {
            Ok(slot.as_usize().safe_rem(self.block_roots.len())?)
        } else {
            Err(Error::SlotOutOfBounds)
        }
    }

    /// Return the block root at a recent `slot`.
    pub fn get_block_root(&self, slot: Slot) -> Result<&Hash256, Error> {
        let i = self.get_latest_block_roots_index(slot)?;
        self.block_roots.get(i).ok_or(Error::SlotOutOfBounds)
    }

    /// Return the block root at a recent `epoch`.
    pub fn get_block_root_at_epoch(
        &self,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<Hash256, Error> {
        self.get_block_root(epoch.start_slot(spec.slots_per_epoch))
            .copied()
    }

    /// Record `root` as the block root for `slot` in the circular `block_roots` list.
    pub fn set_block_root(&mut self, slot: Slot, root: Hash256) -> Result<(), Error> {
        let i = slot.as_usize().safe_rem(self.block_roots.len())?;
        *self.block_roots.get_mut(i).ok_or(Error::SlotOutOfBounds)? = root;
        Ok(())
    }

    fn get_slashings_index(&self, epoch: Epoch) -> Result<usize, Error> {
        Ok(epoch.as_usize().safe_rem(self.slashings.len())?)
    }

    /// Get a reference to the entire `slashings` vector.
    pub fn get_all_slashings(&self) -> &[u64] {
        &self.slashings
    }

    /// Get the total slashed balances for some epoch.
    pub fn get_slashings(&self, epoch: Epoch) -> Result<u64, Error> {
        let i = self.get_slashings_index(epoch)?;
        self.slashings
            .get(i)
            .copied()
            .ok_or(Error::SlashingsOutOfBounds(i))
    }

    /// Set the total slashed balances for some epoch.
    pub fn set_slashings(&mut self, epoch: Epoch, value: u64) -> Result<(), Error> {
        let i = self.get_slashings_index(epoch)?;
        *self
            .slashings
            .get_mut(i)
            .ok_or(Error::SlashingsOutOfBounds(i))? = value;
        Ok(())
    }

    /// Returns the indices of all validators active at `epoch`, in registry order.
    pub fn get_active_validator_indices(&self, epoch: Epoch) -> Vec<usize> {
        self.validators
            .iter()
            .enumerate()
            .filter_map(|(index, validator)| validator.is_active_at(epoch).then_some(index))
            .collect()
    }

    /// Sum of the effective balances of `validator_indices`.
    ///
    /// Returns minimum `EFFECTIVE_BALANCE_INCREMENT`, to avoid div by 0.
    pub fn get_total_balance<'a, I: IntoIterator<Item = &'a usize>>(
        &'a self,
        validator_indices: I,
        spec: &ChainSpec,
    ) -> Result<u64, Error> {
        let total_balance = validator_indices.into_iter().try_fold(0_u64, |acc, i| {
            self.get_effective_balance(*i)
                .and_then(|bal| acc.safe_add(bal).map_err(Into::into))
        })?;
        Ok(std::cmp::max(
            total_balance,
            spec.effective_balance_increment,
        ))
    }

    /// Total effective balance of the validators active in the current epoch.
    pub fn get_total_active_balance(&self, spec: &ChainSpec) -> Result<u64, Error> {
        let current_epoch = self.current_epoch(spec);
        self.get_total_balance(&self.get_active_validator_indices(current_epoch), spec)
    }

    /// Return the churn limit for the current epoch (number of validators who can join or leave
    /// per epoch).
    pub fn get_validator_churn_limit(&self, spec: &ChainSpec) -> Result<u64, Error> {
        let active_validator_count =
            self.get_active_validator_indices(self.current_epoch(spec)).len() as u64;
        Ok(std::cmp::max(
            spec.min_per_epoch_churn_limit,
            active_validator_count.safe_div(spec.churn_limit_quotient)?,
        ))
    }

    /// The number of epochs since the last finalized checkpoint, measured from the previous epoch.
    pub fn get_finality_delay(&self, spec: &ChainSpec) -> Result<u64, Error> {
        Ok(self
            .previous_epoch(spec)
            .safe_sub(self.finalized_checkpoint.epoch)?
            .as_u64())
    }

    /// Whether finality has stalled long enough for inactivity penalties to apply.
    pub fn is_in_inactivity_leak(&self, spec: &ChainSpec) -> Result<bool, Error> {
        Ok(self.get_finality_delay(spec)? > spec.min_epochs_to_inactivity_penalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::generate_deterministic_keypair;

    fn state_with_validators(n: usize, spec: &ChainSpec) -> BeaconState {
        let mut state = BeaconState::new(0, Eth1Data::default(), spec);
        for i in 0..n {
            let validator = Validator {
                pubkey: generate_deterministic_keypair(i).pk.into(),
                effective_balance: spec.max_effective_balance,
                activation_eligibility_epoch: spec.genesis_epoch,
                activation_epoch: spec.genesis_epoch,
                ..Validator::default()
            };
            state.push_validator(validator, spec.max_effective_balance);
        }
        state
    }

    #[test]
    fn new_state_has_configured_list_lengths() {
        let spec = ChainSpec::minimal();
        let state = BeaconState::new(0, Eth1Data::default(), &spec);
        assert_eq!(state.verify_list_lengths(&spec), Ok(()));
        assert_eq!(state.block_roots.len(), spec.slots_per_historical_root);

        let mut broken = state;
        broken.slashings.pop();
        assert_eq!(
            broken.verify_list_lengths(&spec),
            Err(Error::InvalidListLength {
                list: "slashings",
                expected: spec.epochs_per_slashings_vector,
                found: spec.epochs_per_slashings_vector - 1,
            })
        );
    }

    #[test]
    fn block_root_bounds() {
        let spec = ChainSpec::minimal();
        let mut state = BeaconState::new(0, Eth1Data::default(), &spec);
        let len = spec.slots_per_historical_root as u64;
        let root = Hash256::repeat_byte(3);

        state.slot = Slot::new(len + 5);
        state.set_block_root(Slot::new(len + 4), root).unwrap();

        assert_eq!(state.get_block_root(Slot::new(len + 4)), Ok(&root));
        // The current slot has no root yet.
        assert_eq!(
            state.get_block_root(Slot::new(len + 5)),
            Err(Error::SlotOutOfBounds)
        );
        // Overwritten by the circular buffer.
        assert_eq!(state.get_block_root(Slot::new(4)), Err(Error::SlotOutOfBounds));
        assert!(state.get_block_root(Slot::new(5)).is_ok());
    }

    #[test]
    fn inactivity_leak_starts_once_finality_stalls() {
        let spec = ChainSpec::minimal();
        let mut state = BeaconState::new(0, Eth1Data::default(), &spec);
        let leak_epoch = spec.min_epochs_to_inactivity_penalty + 2;

        state.slot = Epoch::new(leak_epoch - 1).start_slot(spec.slots_per_epoch);
        assert_eq!(
            state.get_finality_delay(&spec),
            Ok(spec.min_epochs_to_inactivity_penalty)
        );
        assert_eq!(state.is_in_inactivity_leak(&spec), Ok(false));

        state.slot = Epoch::new(leak_epoch).start_slot(spec.slots_per_epoch);
        assert_eq!(state.is_in_inactivity_leak(&spec), Ok(true));
    }

    #[test]
    fn outstanding_deposits() {
        let spec = ChainSpec::minimal();
        let mut state = BeaconState::new(0, Eth1Data::default(), &spec);
        state.eth1_data.deposit_count = 6;
        state.eth1_deposit_index = 5;
        assert_eq!(state.get_outstanding_deposit_len(), Ok(1));

        state.eth1_deposit_index = 7;
        assert_eq!(
            state.get_outstanding_deposit_len(),
            Err(Error::InvalidDepositState {
                deposit_count: 6,
                deposit_index: 7,
            })
        );
    }

    #[test]
    fn total_balance_is_at_least_one_increment() {
        let spec = ChainSpec::minimal();
        let state = state_with_validators(0, &spec);
        assert_eq!(
            state.get_total_active_balance(&spec),
            Ok(spec.effective_balance_increment)
        );

        let state = state_with_validators(3, &spec);
        assert_eq!(
            state.get_total_active_balance(&spec),
            Ok(3 * spec.max_effective_balance)
        );
    }

    #[test]
    fn churn_limit() {
        let spec = ChainSpec::minimal();
        let state = state_with_validators(4, &spec);
        assert_eq!(
            state.get_validator_churn_limit(&spec),
            Ok(spec.min_per_epoch_churn_limit)
        );

        let spec = ChainSpec {
            churn_limit_quotient: 2,
            min_per_epoch_churn_limit: 1,
            ..ChainSpec::minimal()
        };
        let state = state_with_validators(10, &spec);
        assert_eq!(state.get_validator_churn_limit(&spec), Ok(5));
    }

    #[test]
    fn validator_lookup_by_pubkey() {
        let spec = ChainSpec::minimal();
        let state = state_with_validators(3, &spec);
        let pubkey = PublicKeyBytes::from(generate_deterministic_keypair(2).pk);
        assert_eq!(state.get_validator_index(&pubkey), Some(2));

        let unknown = PublicKeyBytes::from(generate_deterministic_keypair(3).pk);
        assert_eq!(state.get_validator_index(&unknown), None);
    }

    #[test]
    fn previous_epoch_stops_at_genesis() {
        let spec = ChainSpec::minimal();
        let mut state = BeaconState::new(0, Eth1Data::default(), &spec);
        assert_eq!(state.previous_epoch(&spec), spec.genesis_epoch);

        state.slot = Epoch::new(3).start_slot(spec.slots_per_epoch);
        assert_eq!(state.previous_epoch(&spec), Epoch::new(2));
        assert_eq!(state.next_epoch(&spec), Ok(Epoch::new(4)));
    }

    #[test]
    fn ssz_round_trip_preserves_state() {
        use ssz::{Decode, Encode};

        let spec = ChainSpec::minimal();
        let mut state = state_with_validators(2, &spec);
        state.justification_bits.set(1, true).unwrap();
        state.set_slashings(Epoch::new(3), 42).unwrap();

        let bytes = state.as_ssz_bytes();
        assert_eq!(BeaconState::from_ssz_bytes(&bytes), Ok(state));
    }
}

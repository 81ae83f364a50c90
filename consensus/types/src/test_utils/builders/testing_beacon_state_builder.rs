use crate::test_utils::{generate_deterministic_keypairs, TestingDepositTreeBuilder};
use crate::*;
use bls::get_withdrawal_credentials;

/// Builds a beacon state to be used for testing purposes.
///
/// Every validator is active from genesis with the maximum effective balance, and the deposit
/// tree that created them is kept so that further deposits can be appended with valid proofs.
///
/// This struct should **never be used for production purposes.**
pub struct TestingBeaconStateBuilder {
    state: BeaconState,
    keypairs: Vec<Keypair>,
    deposit_tree: TestingDepositTreeBuilder,
}

impl TestingBeaconStateBuilder {
    /// Creates a state with `validator_count` validators at the genesis slot. Validator `i` owns
    /// `generate_deterministic_keypair(i)`.
    pub fn from_deterministic_keypairs(validator_count: usize, spec: &ChainSpec) -> Self {
        let keypairs = generate_deterministic_keypairs(validator_count);
        let mut deposit_tree = TestingDepositTreeBuilder::new(spec);
        let mut state = BeaconState::new(0, Eth1Data::default(), spec);

        for keypair in &keypairs {
            let withdrawal_credentials = Hash256::from_slice(
                &get_withdrawal_credentials(&keypair.pk, spec.bls_withdrawal_prefix_byte)[..],
            );
            let mut data = DepositData {
                pubkey: keypair.pk.clone().into(),
                withdrawal_credentials,
                amount: spec.max_effective_balance,
                signature: SignatureBytes::empty(),
            };
            data.signature = data.create_signature(&keypair.sk, spec);
            deposit_tree
                .push(data.clone())
                .expect("deposit tree should have capacity");

            let validator = Validator {
                pubkey: data.pubkey,
                withdrawal_credentials,
                effective_balance: spec.max_effective_balance,
                slashed: false,
                activation_eligibility_epoch: spec.genesis_epoch,
                activation_epoch: spec.genesis_epoch,
                exit_epoch: spec.far_future_epoch,
                withdrawable_epoch: spec.far_future_epoch,
            };
            state.push_validator(validator, spec.max_effective_balance);
        }

        state.eth1_data = deposit_tree.eth1_data();
        state.eth1_deposit_index = keypairs.len() as u64;

        Self {
            state,
            keypairs,
            deposit_tree,
        }
    }

    /// Moves the state to the first slot of `epoch`.
    pub fn teleport_to_epoch(&mut self, epoch: Epoch, spec: &ChainSpec) {
        self.state.slot = epoch.start_slot(spec.slots_per_epoch);
    }

    /// Moves the state to `slot`.
    pub fn teleport_to_slot(&mut self, slot: Slot) {
        self.state.slot = slot;
    }

    /// Appends deposit data to the deposit tree without applying it, updating `eth1_data` so the
    /// state expects it to be included in a block.
    pub fn add_pending_deposit(&mut self, data: DepositData) {
        self.deposit_tree
            .push(data)
            .expect("deposit tree should have capacity");
        self.state.eth1_data = self.deposit_tree.eth1_data();
    }

    pub fn state_mut(&mut self) -> &mut BeaconState {
        &mut self.state
    }

    pub fn keypairs(&self) -> &[Keypair] {
        &self.keypairs
    }

    pub fn deposit_tree(&self) -> &TestingDepositTreeBuilder {
        &self.deposit_tree
    }

    /// Consume the builder and return the `BeaconState`, the keypairs and the deposit tree.
    pub fn build(self) -> (BeaconState, Vec<Keypair>, TestingDepositTreeBuilder) {
        (self.state, self.keypairs, self.deposit_tree)
    }
}

use crate::*;
use safe_arith::{ArithError, SafeArith};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tree_hash::TreeHash;

/// Each of the BLS signature domains used by this state transition.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Domain {
    Deposit,
}

/// Holds all the "constants" for a BeaconChain.
///
/// One value is built at startup and shared by reference with every transition function.
#[derive(PartialEq, Debug, Clone)]
pub struct ChainSpec {
    /*
     * Config name
     */
    pub config_name: Option<String>,

    /*
     * Constants
     */
    pub genesis_slot: Slot,
    pub genesis_epoch: Epoch,
    pub far_future_epoch: Epoch,
    pub base_rewards_per_epoch: u64,
    pub deposit_contract_tree_depth: u64,

    /*
     * Misc
     */
    pub min_per_epoch_churn_limit: u64,
    pub churn_limit_quotient: u64,
    pub hysteresis_quotient: u64,
    pub hysteresis_downward_multiplier: u64,
    pub hysteresis_upward_multiplier: u64,
    pub proportional_slashing_multiplier: u64,

    /*
     *  Gwei values
     */
    pub max_effective_balance: u64,
    pub ejection_balance: u64,
    pub effective_balance_increment: u64,

    /*
     * Initial Values
     */
    pub genesis_fork_version: [u8; 4],
    pub bls_withdrawal_prefix_byte: u8,

    /*
     * Time parameters
     */
    pub slots_per_epoch: u64,
    pub slots_per_historical_root: usize,
    pub max_seed_lookahead: Epoch,
    pub min_validator_withdrawability_delay: Epoch,

    /*
     * State list lengths
     */
    pub epochs_per_slashings_vector: usize,

    /*
     * Reward and penalty quotients
     */
    pub base_reward_factor: u64,
    pub proposer_reward_quotient: u64,
    pub inactivity_penalty_quotient: u64,
    pub min_epochs_to_inactivity_penalty: u64,

    /*
     * Max operations per block
     */
    pub max_deposits: u64,

    /*
     * Signature domains
     */
    pub domain_deposit: u32,

    /*
     * Fork schedule
     */
    pub next_fork_version: [u8; 4],
    pub next_fork_epoch: Option<Epoch>,
}

impl ChainSpec {
    /// Get the domain number, unmodified by the fork.
    pub fn get_domain_constant(&self, domain: Domain) -> u32 {
        match domain {
            Domain::Deposit => self.domain_deposit,
        }
    }

    /// Return the 32-byte fork data root for the `current_version` and `genesis_validators_root`.
    ///
    /// This is used primarily in signature domains to avoid collisions across forks/chains.
    pub fn compute_fork_data_root(
        current_version: [u8; 4],
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        ForkData {
            current_version,
            genesis_validators_root,
        }
        .tree_hash_root()
    }

    /// Compute a domain by applying the given `fork_version`.
    pub fn compute_domain(
        &self,
        domain: Domain,
        fork_version: [u8; 4],
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        let domain_constant = self.get_domain_constant(domain);

        let mut domain = [0; 32];
        domain[0..4].copy_from_slice(&domain_constant.to_le_bytes());
        domain[4..].copy_from_slice(
            &Self::compute_fork_data_root(fork_version, genesis_validators_root).as_bytes()[..28],
        );

        Hash256::from(domain)
    }

    /// Deposits are valid across forks, thus the deposit domain is computed
    /// with the genesis fork version and a zero genesis validators root.
    pub fn get_deposit_domain(&self) -> Hash256 {
        self.compute_domain(Domain::Deposit, self.genesis_fork_version, Hash256::zero())
    }

    /// Return the epoch during which an activation or exit initiated at `epoch` takes effect.
    pub fn compute_activation_exit_epoch(&self, epoch: Epoch) -> Result<Epoch, ArithError> {
        epoch.safe_add(1)?.safe_add(self.max_seed_lookahead)
    }

    /// The fork version scheduled for `epoch`, if a fork is scheduled at exactly that epoch.
    pub fn fork_version_scheduled_at(&self, epoch: Epoch) -> Option<[u8; 4]> {
        match self.next_fork_epoch {
            Some(fork_epoch) if fork_epoch == epoch => Some(self.next_fork_version),
            _ => None,
        }
    }

    /// Returns a `ChainSpec` compatible with the Ethereum Foundation specification.
    pub fn mainnet() -> Self {
        Self {
            /*
             * Config name
             */
            config_name: Some("mainnet".to_string()),

            /*
             * Constants
             */
            genesis_slot: Slot::new(0),
            genesis_epoch: Epoch::new(0),
            far_future_epoch: Epoch::max_value(),
            base_rewards_per_epoch: 4,
            deposit_contract_tree_depth: 32,

            /*
             * Misc
             */
            min_per_epoch_churn_limit: 4,
            churn_limit_quotient: 65_536,
            hysteresis_quotient: 4,
            hysteresis_downward_multiplier: 1,
            hysteresis_upward_multiplier: 5,
            proportional_slashing_multiplier: 1,

            /*
             *  Gwei values
             */
            max_effective_balance: 32_000_000_000,
            ejection_balance: 16_000_000_000,
            effective_balance_increment: 1_000_000_000,

            /*
             * Initial Values
             */
            genesis_fork_version: [0; 4],
            bls_withdrawal_prefix_byte: 0,

            /*
             * Time parameters
             */
            slots_per_epoch: 32,
            slots_per_historical_root: 8192,
            max_seed_lookahead: Epoch::new(4),
            min_validator_withdrawability_delay: Epoch::new(256),

            /*
             * State list lengths
             */
            epochs_per_slashings_vector: 8192,

            /*
             * Reward and penalty quotients
             */
            base_reward_factor: 64,
            proposer_reward_quotient: 8,
            inactivity_penalty_quotient: 67_108_864,
            min_epochs_to_inactivity_penalty: 4,

            /*
             * Max operations per block
             */
            max_deposits: 16,

            /*
             * Signature domains
             */
            domain_deposit: 3,

            /*
             * Fork schedule
             */
            next_fork_version: [0x01, 0x00, 0x00, 0x00],
            next_fork_epoch: Some(Epoch::new(74240)),
        }
    }

    /// Ethereum Foundation minimal spec, as defined in the eth2.0-specs repo.
    pub fn minimal() -> Self {
        Self {
            config_name: Some("minimal".to_string()),
            churn_limit_quotient: 32,
            genesis_fork_version: [0x00, 0x00, 0x00, 0x01],
            slots_per_epoch: 8,
            slots_per_historical_root: 64,
            epochs_per_slashings_vector: 64,
            inactivity_penalty_quotient: 33_554_432,
            next_fork_version: [0x01, 0x00, 0x00, 0x01],
            next_fork_epoch: None,
            ..ChainSpec::mainnet()
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// The runtime-configurable subset of a `ChainSpec`, in the YAML layout shared by consensus
/// clients.
///
/// Fields relevant to hard forks after phase0 are optional so that we can load configs that
/// predate them.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "UPPERCASE")]
pub struct Config {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,

    #[serde(default)]
    pub preset_base: String,

    #[serde(with = "serde_utils::bytes_4_hex")]
    genesis_fork_version: [u8; 4],

    #[serde(default = "default_next_fork_version")]
    #[serde(with = "serde_utils::bytes_4_hex")]
    next_fork_version: [u8; 4],
    #[serde(default)]
    pub next_fork_epoch: Option<Epoch>,

    #[serde(with = "serde_utils::quoted_u64")]
    min_validator_withdrawability_delay: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    ejection_balance: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    min_per_epoch_churn_limit: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    churn_limit_quotient: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    inactivity_penalty_quotient: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    proportional_slashing_multiplier: u64,
}

fn default_next_fork_version() -> [u8; 4] {
    // This value shouldn't be used.
    [0xff, 0xff, 0xff, 0xff]
}

impl Default for Config {
    fn default() -> Self {
        Config::from_chain_spec(&ChainSpec::mainnet())
    }
}

impl Config {
    /// Maps `self` to an identifier for a preset.
    pub fn preset_base_spec(&self) -> Option<ChainSpec> {
        match self.preset_base.as_str() {
            "minimal" => Some(ChainSpec::minimal()),
            "mainnet" => Some(ChainSpec::mainnet()),
            _ => None,
        }
    }

    pub fn from_chain_spec(spec: &ChainSpec) -> Self {
        Self {
            config_name: spec.config_name.clone(),
            preset_base: if spec.slots_per_epoch == ChainSpec::minimal().slots_per_epoch {
                "minimal".to_string()
            } else {
                "mainnet".to_string()
            },

            genesis_fork_version: spec.genesis_fork_version,
            next_fork_version: spec.next_fork_version,
            next_fork_epoch: spec.next_fork_epoch,

            min_validator_withdrawability_delay: spec.min_validator_withdrawability_delay.as_u64(),
            ejection_balance: spec.ejection_balance,
            min_per_epoch_churn_limit: spec.min_per_epoch_churn_limit,
            churn_limit_quotient: spec.churn_limit_quotient,
            inactivity_penalty_quotient: spec.inactivity_penalty_quotient,
            proportional_slashing_multiplier: spec.proportional_slashing_multiplier,
        }
    }

    pub fn from_file(filename: &Path) -> Result<Self, String> {
        let f = File::open(filename)
            .map_err(|e| format!("Error opening spec at {}: {:?}", filename.display(), e))?;
        serde_yaml::from_reader(f)
            .map_err(|e| format!("Error parsing spec at {}: {:?}", filename.display(), e))
    }

    /// Overlay the runtime-configurable values of `self` onto `chain_spec`.
    pub fn apply_to_chain_spec(&self, chain_spec: &ChainSpec) -> ChainSpec {
        // Pattern match here to avoid missing any fields.
        let &Config {
            ref config_name,
            preset_base: _,
            genesis_fork_version,
            next_fork_version,
            next_fork_epoch,
            min_validator_withdrawability_delay,
            ejection_balance,
            min_per_epoch_churn_limit,
            churn_limit_quotient,
            inactivity_penalty_quotient,
            proportional_slashing_multiplier,
        } = self;

        ChainSpec {
            config_name: config_name.clone(),
            genesis_fork_version,
            next_fork_version,
            next_fork_epoch,
            min_validator_withdrawability_delay: Epoch::new(min_validator_withdrawability_delay),
            ejection_balance,
            min_per_epoch_churn_limit,
            churn_limit_quotient,
            inactivity_penalty_quotient,
            proportional_slashing_multiplier,
            ..chain_spec.clone()
        }
    }

    /// Build the full `ChainSpec` described by this config, starting from its preset.
    pub fn chain_spec(&self) -> Result<ChainSpec, String> {
        let base = self
            .preset_base_spec()
            .ok_or_else(|| format!("Unknown preset base: {:?}", self.preset_base))?;
        Ok(self.apply_to_chain_spec(&base))
    }
}

use super::validator_statuses::{TotalBalances, ValidatorStatus, ValidatorStatuses};

/// Provides a summary of validator participation during the epoch.
#[derive(PartialEq, Debug)]
pub struct EpochProcessingSummary {
    pub total_balances: TotalBalances,
    pub statuses: Vec<ValidatorStatus>,
}

impl From<ValidatorStatuses> for EpochProcessingSummary {
    fn from(validator_statuses: ValidatorStatuses) -> Self {
        Self {
            total_balances: validator_statuses.total_balances,
            statuses: validator_statuses.statuses,
        }
    }
}

impl EpochProcessingSummary {
    /// Returns the sum of the effective balance of all validators in the current epoch.
    pub fn current_epoch_total_active_balance(&self) -> u64 {
        self.total_balances.current_epoch()
    }

    /// Returns the sum of the effective balance of all validators in the current epoch who
    /// included an attestation that matched the target.
    pub fn current_epoch_target_attesting_balance(&self) -> u64 {
        self.total_balances.current_epoch_target_attesters()
    }

    /// Returns the sum of the effective balance of all validators in the previous epoch.
    pub fn previous_epoch_total_active_balance(&self) -> u64 {
        self.total_balances.previous_epoch()
    }

    /// Returns the sum of the effective balance of all validators in the previous epoch who
    /// included an attestation that matched the target.
    pub fn previous_epoch_target_attesting_balance(&self) -> u64 {
        self.total_balances.previous_epoch_target_attesters()
    }

    /// Returns the sum of the effective balance of all validators in the previous epoch who
    /// included an attestation that matched the head.
    pub fn previous_epoch_head_attesting_balance(&self) -> u64 {
        self.total_balances.previous_epoch_head_attesters()
    }

    /// Returns `true` if `val_index` was included in the active validator indices in the current
    /// epoch.
    ///
    /// ## Notes
    ///
    /// Always returns `false` for an unknown `val_index`.
    pub fn is_active_in_current_epoch(&self, val_index: usize) -> bool {
        self.statuses
            .get(val_index)
            .map_or(false, |s| s.is_active_in_current_epoch)
    }

    /// Returns `true` if `val_index` had a target-matching attestation included on chain in the
    /// previous epoch.
    ///
    /// ## Notes
    ///
    /// Always returns `false` for an unknown `val_index`.
    pub fn is_previous_epoch_target_attester(&self, val_index: usize) -> bool {
        self.statuses
            .get(val_index)
            .map_or(false, |s| s.is_previous_epoch_target_attester)
    }

    /// Returns `true` if `val_index` was slashed at the time of processing.
    pub fn is_slashed(&self, val_index: usize) -> bool {
        self.statuses.get(val_index).map_or(false, |s| s.is_slashed)
    }
}

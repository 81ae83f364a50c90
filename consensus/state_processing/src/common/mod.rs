mod initiate_validator_exit;

pub use initiate_validator_exit::initiate_validator_exit;

use safe_arith::SafeArith;
use types::{BeaconState, BeaconStateError};

/// Decrease the balance of a validator, saturating upon overflow.
pub fn decrease_balance(
    state: &mut BeaconState,
    index: usize,
    delta: u64,
) -> Result<(), BeaconStateError> {
    decrease_balance_directly(state.get_balance_mut(index)?, delta)
}

/// Increase the balance of a validator, erroring upon overflow.
pub fn increase_balance_directly(balance: &mut u64, delta: u64) -> Result<(), BeaconStateError> {
    balance.safe_add_assign(delta)?;
    Ok(())
}

/// Decrease the balance of a validator, saturating upon overflow.
pub fn decrease_balance_directly(balance: &mut u64, delta: u64) -> Result<(), BeaconStateError> {
    *balance = balance.saturating_sub(delta);
    Ok(())
}

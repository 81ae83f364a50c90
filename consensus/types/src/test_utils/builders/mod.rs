mod testing_beacon_state_builder;
mod testing_deposit_builder;
mod testing_deposit_tree_builder;

pub use testing_beacon_state_builder::TestingBeaconStateBuilder;
pub use testing_deposit_builder::{DepositTestTask, TestingDepositBuilder};
pub use testing_deposit_tree_builder::TestingDepositTreeBuilder;

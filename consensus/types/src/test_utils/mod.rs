//! Helpers for building states, keys and deposits in tests.
//!
//! Nothing here should be used outside of tests and benchmarks.

mod builders;
mod generate_deterministic_keypairs;

pub use builders::*;
pub use generate_deterministic_keypairs::{
    generate_deterministic_keypair, generate_deterministic_keypairs,
};

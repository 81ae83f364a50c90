// Clippy lint set-up (disabled in tests)
#![cfg_attr(
    not(test),
    deny(
        clippy::arithmetic_side_effects,
        clippy::disallowed_methods,
        clippy::indexing_slicing,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::let_underscore_must_use
    )
)]

#[macro_use]
mod macros;

pub mod common;
pub mod per_block_processing;
pub mod per_epoch_processing;
pub mod per_slot_processing;
pub mod signature_verifier;
pub mod state_transition;

pub use per_block_processing::{
    errors::{BlockProcessingError, DepositInvalid},
    per_block_processing, process_deposit, process_deposits,
};
pub use per_epoch_processing::{
    errors::EpochProcessingError, process_epoch as per_epoch_processing, EpochProcessingSummary,
};
pub use per_slot_processing::{per_slot_processing, Error as SlotProcessingError};
pub use signature_verifier::{BlsSignatureVerifier, SignatureVerifier};
pub use state_transition::{
    NoParticipation, ParticipationSource, StateTransition, StateTransitionError,
};

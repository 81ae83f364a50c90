//! Drives a `BeaconState` through empty slots and blocks.
//!
//! The processing functions in this crate never log. `StateTransition` holds the logger and
//! sequences slot, epoch and block processing for a caller such as a sync service.

use crate::per_block_processing::{errors::BlockProcessingError, per_block_processing};
use crate::per_epoch_processing::EpochProcessingSummary;
use crate::per_slot_processing::{is_epoch_end, per_slot_processing, Error as SlotProcessingError};
use crate::signature_verifier::SignatureVerifier;
use safe_arith::ArithError;
use slog::{debug, trace, Logger};
use std::collections::BTreeMap;
use types::{AttestationParticipation, BeaconBlock, BeaconState, ChainSpec, Epoch, Slot};

#[derive(Debug, PartialEq)]
pub enum StateTransitionError {
    /// The state is already past the slot it was asked to advance to.
    SlotInPast { state_slot: Slot, target_slot: Slot },
    SlotProcessingError(SlotProcessingError),
    BlockProcessingError(BlockProcessingError),
    ArithError(ArithError),
}

impl From<SlotProcessingError> for StateTransitionError {
    fn from(e: SlotProcessingError) -> Self {
        StateTransitionError::SlotProcessingError(e)
    }
}

impl From<BlockProcessingError> for StateTransitionError {
    fn from(e: BlockProcessingError) -> Self {
        StateTransitionError::BlockProcessingError(e)
    }
}

impl From<ArithError> for StateTransitionError {
    fn from(e: ArithError) -> Self {
        StateTransitionError::ArithError(e)
    }
}

/// Supplies the aggregated attestation records used at each epoch boundary.
pub trait ParticipationSource {
    /// Participation for the epoch `epoch` of `state`, one record per validator in registry
    /// order.
    ///
    /// `None` is treated as no validator having participated.
    fn participation(
        &self,
        state: &BeaconState,
        epoch: Epoch,
    ) -> Option<Vec<AttestationParticipation>>;
}

/// A `ParticipationSource` for which no validator ever participates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoParticipation;

impl ParticipationSource for NoParticipation {
    fn participation(&self, _: &BeaconState, _: Epoch) -> Option<Vec<AttestationParticipation>> {
        None
    }
}

impl ParticipationSource for BTreeMap<Epoch, Vec<AttestationParticipation>> {
    fn participation(
        &self,
        _: &BeaconState,
        epoch: Epoch,
    ) -> Option<Vec<AttestationParticipation>> {
        self.get(&epoch).cloned()
    }
}

/// Applies slots and blocks to states for a single chain configuration.
pub struct StateTransition<V> {
    spec: ChainSpec,
    verifier: V,
    log: Logger,
}

impl<V: SignatureVerifier> StateTransition<V> {
    pub fn new(spec: ChainSpec, verifier: V, log: Logger) -> Self {
        Self {
            spec,
            verifier,
            log,
        }
    }

    pub fn spec(&self) -> &ChainSpec {
        &self.spec
    }

    /// Advance `state` through empty slots until `state.slot == target_slot`, running epoch
    /// processing at every epoch boundary crossed.
    ///
    /// Returns the summary of each epoch processed, oldest first.
    pub fn process_slots<P: ParticipationSource + ?Sized>(
        &self,
        state: &mut BeaconState,
        target_slot: Slot,
        participation: &P,
    ) -> Result<Vec<EpochProcessingSummary>, StateTransitionError> {
        if state.slot > target_slot {
            return Err(StateTransitionError::SlotInPast {
                state_slot: state.slot,
                target_slot,
            });
        }

        let mut summaries = vec![];

        while state.slot < target_slot {
            trace!(self.log, "Processing slot"; "slot" => %state.slot);

            let epoch = state.current_epoch(&self.spec);
            let records = if is_epoch_end(state, &self.spec)? {
                participation.participation(state, epoch)
            } else {
                None
            };

            if let Some(summary) = per_slot_processing(state, records.as_deref(), &self.spec)? {
                debug!(
                    self.log,
                    "Processed epoch transition";
                    "epoch" => %epoch,
                    "justified_epoch" => %state.current_justified_checkpoint.epoch,
                    "finalized_epoch" => %state.finalized_checkpoint.epoch,
                    "validator_count" => state.validators.len(),
                );
                summaries.push(summary);
            }
        }

        Ok(summaries)
    }

    /// Advance `state` to `block.slot` and apply `block`, returning the post-state.
    ///
    /// The state is consumed; on error the partially processed state is discarded and the
    /// caller keeps whatever copy of the pre-state it holds.
    pub fn apply_block<P: ParticipationSource + ?Sized>(
        &self,
        mut state: BeaconState,
        block: &BeaconBlock,
        participation: &P,
    ) -> Result<BeaconState, StateTransitionError> {
        self.process_slots(&mut state, block.slot, participation)?;
        per_block_processing(&mut state, block, &self.verifier, &self.spec)?;

        debug!(
            self.log,
            "Applied block";
            "slot" => %block.slot,
            "deposits" => block.body.deposits.len(),
            "eth1_deposit_index" => state.eth1_deposit_index,
            "validator_count" => state.validators.len(),
        );

        Ok(state)
    }
}

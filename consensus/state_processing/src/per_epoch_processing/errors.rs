use safe_arith::ArithError;
use types::BeaconStateError;

#[derive(Debug, PartialEq)]
pub enum EpochProcessingError {
    InclusionDistanceZero,
    /// The participation records do not line up with the validator registry.
    ValidatorStatusesInconsistent {
        validators: usize,
        participation: usize,
    },
    DeltaOutOfBounds(usize),
    /// A previous epoch attester has no inclusion record.
    ///
    /// (validator_index)
    InclusionInfoMissing(usize),
    BeaconStateError(BeaconStateError),
    ArithError(ArithError),
    InvalidJustificationBit(ssz_types::Error),
}

impl From<BeaconStateError> for EpochProcessingError {
    fn from(e: BeaconStateError) -> EpochProcessingError {
        EpochProcessingError::BeaconStateError(e)
    }
}

impl From<ArithError> for EpochProcessingError {
    fn from(e: ArithError) -> EpochProcessingError {
        EpochProcessingError::ArithError(e)
    }
}

impl From<ssz_types::Error> for EpochProcessingError {
    fn from(e: ssz_types::Error) -> EpochProcessingError {
        EpochProcessingError::InvalidJustificationBit(e)
    }
}

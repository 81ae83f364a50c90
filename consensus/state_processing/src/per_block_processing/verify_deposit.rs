use super::errors::{BlockOperationError, DepositInvalid, DepositValidationError};
use crate::signature_verifier::SignatureVerifier;
use merkle_proof::verify_merkle_proof;
use safe_arith::SafeArith;
use tree_hash::TreeHash;
use types::*;

type Result<T> = std::result::Result<T, DepositValidationError>;

fn error(reason: DepositInvalid) -> DepositValidationError {
    BlockOperationError::invalid(reason)
}

/// Returns `true` if the deposit data carries a valid proof-of-possession for its pubkey.
///
/// The deposit domain is fork-agnostic, so a signature made for any fork of this chain is
/// accepted.
pub fn is_valid_deposit_signature<V: SignatureVerifier>(
    deposit_data: &DepositData,
    verifier: &V,
    spec: &ChainSpec,
) -> bool {
    let signing_root = deposit_data
        .as_deposit_message()
        .signing_root(spec.get_deposit_domain());
    verifier.verify(&deposit_data.pubkey, signing_root, &deposit_data.signature)
}

/// Returns a `Some(validator index)` if a pubkey already exists in the `validators`,
/// otherwise returns `None`.
pub fn get_existing_validator_index(
    state: &BeaconState,
    pub_key: &PublicKeyBytes,
) -> Option<usize> {
    state.get_validator_index(pub_key)
}

/// Verify that a deposit is included in the state's eth1 deposit root.
///
/// The proof is checked for leaf `deposit.index`; use `verify_deposit_index` to check that this
/// is the deposit the state expects next.
pub fn verify_deposit_merkle_proof(
    state: &BeaconState,
    deposit: &Deposit,
    spec: &ChainSpec,
) -> Result<()> {
    let leaf = deposit.data.tree_hash_root();

    verify!(
        verify_merkle_proof(
            leaf,
            &deposit.proof,
            spec.deposit_contract_tree_depth as usize,
            deposit.index as usize,
            state.eth1_data.deposit_root,
        ),
        DepositInvalid::BadMerkleProof
    );

    Ok(())
}

/// Verify that `deposit` is the one at `offset` past the state's `eth1_deposit_index`.
pub fn verify_deposit_index(state: &BeaconState, deposit: &Deposit, offset: usize) -> Result<()> {
    let expected = state.eth1_deposit_index.safe_add(offset as u64)?;

    if deposit.index != expected {
        return Err(error(DepositInvalid::OutOfOrder {
            expected,
            found: deposit.index,
        }));
    }

    Ok(())
}

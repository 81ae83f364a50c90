use crate::*;

/// Generates `validator_count` keypairs where the secret key is derived solely from the index of
/// the validator.
///
/// Uses the `generate_deterministic_keypair` function.
pub fn generate_deterministic_keypairs(validator_count: usize) -> Vec<Keypair> {
    (0..validator_count)
        .map(generate_deterministic_keypair)
        .collect()
}

/// Generates a single deterministic keypair, where the secret key is `validator_index + 1`
/// encoded as 32 big-endian bytes.
///
/// We skip `0` since it is not a valid secret key.
pub fn generate_deterministic_keypair(validator_index: usize) -> Keypair {
    let mut secret = [0; SECRET_KEY_BYTES_LEN];
    secret[SECRET_KEY_BYTES_LEN - 8..].copy_from_slice(&(validator_index as u64 + 1).to_be_bytes());
    let sk = SecretKey::deserialize(&secret).expect("small integers are valid secret keys");
    Keypair::from_secret_key(sk)
}

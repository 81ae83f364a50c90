use crate::test_utils::generate_deterministic_keypair;
use crate::*;
use bls::get_withdrawal_credentials;

/// Describes how a deposit built by `TestingDepositBuilder` should be malformed, if at all.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DepositTestTask {
    Valid,
    BadPubKey,
    BadSig,
    InvalidPubKey,
    NoReset,
}

/// Builds deposit data to be used for testing purposes.
///
/// This struct should **never be used for production purposes.**
pub struct TestingDepositBuilder {
    data: DepositData,
}

impl TestingDepositBuilder {
    /// Instantiates a new builder.
    pub fn new(pubkey: PublicKey, amount: u64) -> Self {
        let data = DepositData {
            pubkey: PublicKeyBytes::from(pubkey),
            withdrawal_credentials: Hash256::zero(),
            amount,
            signature: SignatureBytes::empty(),
        };

        Self { data }
    }

    /// Signs the deposit, also setting the following values:
    ///
    /// - `pubkey` to the signing pubkey.
    /// - `withdrawal_credentials` to the signing pubkey.
    /// - `signature`
    ///
    /// `test_task` selects a deliberate defect; an unrelated keypair is used where one is
    /// needed.
    pub fn sign(&mut self, test_task: DepositTestTask, keypair: &Keypair, spec: &ChainSpec) {
        if test_task == DepositTestTask::NoReset {
            return;
        }

        let other_key = generate_deterministic_keypair(u32::MAX as usize);
        let mut pubkeybytes = PublicKeyBytes::from(&keypair.pk);
        let mut secret_key = keypair.sk.clone();

        match test_task {
            DepositTestTask::BadPubKey => pubkeybytes = PublicKeyBytes::from(&other_key.pk),
            DepositTestTask::InvalidPubKey => {
                // Creating invalid public key bytes
                let mut public_key_bytes: Vec<u8> = vec![0; PUBLIC_KEY_BYTES_LEN];
                public_key_bytes[0] = 255;
                pubkeybytes = PublicKeyBytes::deserialize(&public_key_bytes)
                    .expect("bytes have the correct length");
            }
            DepositTestTask::BadSig => secret_key = other_key.sk,
            DepositTestTask::Valid | DepositTestTask::NoReset => (),
        }

        let withdrawal_credentials = Hash256::from_slice(
            &get_withdrawal_credentials(&keypair.pk, spec.bls_withdrawal_prefix_byte)[..],
        );

        // Building the data and signing it
        self.data.pubkey = pubkeybytes;
        self.data.withdrawal_credentials = withdrawal_credentials;
        self.data.signature = self.data.create_signature(&secret_key, spec);
    }

    /// Builds the deposit data, consuming the builder.
    pub fn build(self) -> DepositData {
        self.data
    }
}

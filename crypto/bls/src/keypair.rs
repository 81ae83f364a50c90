use crate::{PublicKey, SecretKey};
use std::fmt;

#[derive(Clone, PartialEq)]
pub struct Keypair {
    pub pk: PublicKey,
    pub sk: SecretKey,
}

impl Keypair {
    pub fn from_components(pk: PublicKey, sk: SecretKey) -> Self {
        Self { pk, sk }
    }

    pub fn from_secret_key(sk: SecretKey) -> Self {
        Self {
            pk: sk.public_key(),
            sk,
        }
    }
}

impl fmt::Debug for Keypair {
    /// Defers to `self.pk` to avoid leaking the secret key.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.pk, f)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Hash256, PublicKeyBytes, SecretKey, SignatureBytes};

    use super::*;

    fn keypair(seed: u8) -> Keypair {
        Keypair::from_secret_key(SecretKey::key_gen(&[seed; 32]).unwrap())
    }

    #[test]
    fn sign_and_verify() {
        let kp = keypair(1);
        let msg = Hash256::repeat_byte(42);
        let sig = kp.sk.sign(msg);

        assert!(sig.verify(&kp.pk, msg));
        assert!(!sig.verify(&kp.pk, Hash256::repeat_byte(43)));
        assert!(!sig.verify(&keypair(2).pk, msg));
    }

    #[test]
    fn bytes_round_trip_through_decompression() {
        let kp = keypair(3);
        let msg = Hash256::repeat_byte(1);
        let sig_bytes = SignatureBytes::from(kp.sk.sign(msg));
        let pk_bytes = PublicKeyBytes::from(&kp.pk);

        let pk = pk_bytes.decompress().unwrap();
        let sig = sig_bytes.decompress().unwrap();
        assert_eq!(pk, kp.pk);
        assert!(sig.verify(&pk, msg));
    }

    #[test]
    fn secret_key_round_trip() {
        let kp = keypair(4);
        let sk = SecretKey::deserialize(&kp.sk.serialize()).unwrap();
        assert!(sk == kp.sk);
        assert!(SecretKey::key_gen(&[0; 16]).is_err());
    }
}

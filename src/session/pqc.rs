// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Post-quantum session state.
//!
//! The post-quantum firmware keeps one signature key pair and one KEM key
//! pair, both set wholesale by the host and never validated, plus the
//! buffers that carry the last signature, shared secret and ciphertext.
//! All keys start out zeroed; nothing is generated at boot.

use crate::crypto::csrng::Csrng;
use crate::crypto::pqc;
use crate::Result;

/// The post-quantum firmware's persistent state.
pub struct PqcSession {
    /// The signature public key.
    pub sig_public_key: [u8; pqc::SIG_PUBLIC_KEY_LEN],
    /// The signature private key.
    pub sig_private_key: [u8; pqc::SIG_PRIVATE_KEY_LEN],
    signature: [u8; pqc::SIG_LEN],

    /// The KEM public key.
    pub kem_public_key: [u8; pqc::KEM_PUBLIC_KEY_LEN],
    /// The KEM private key.
    pub kem_private_key: [u8; pqc::KEM_PRIVATE_KEY_LEN],
    shared_secret: [u8; pqc::KEM_SHARED_SECRET_LEN],
    ciphertext: [u8; pqc::KEM_CIPHERTEXT_LEN],
}

impl Default for PqcSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PqcSession {
    /// Creates a session with all-zero keys.
    pub fn new() -> Self {
        Self {
            sig_public_key: [0; pqc::SIG_PUBLIC_KEY_LEN],
            sig_private_key: [0; pqc::SIG_PRIVATE_KEY_LEN],
            signature: [0; pqc::SIG_LEN],
            kem_public_key: [0; pqc::KEM_PUBLIC_KEY_LEN],
            kem_private_key: [0; pqc::KEM_PRIVATE_KEY_LEN],
            shared_secret: [0; pqc::KEM_SHARED_SECRET_LEN],
            ciphertext: [0; pqc::KEM_CIPHERTEXT_LEN],
        }
    }

    /// Replaces the signature key pair.
    pub fn set_signature_keys(
        &mut self,
        public_key: &[u8; pqc::SIG_PUBLIC_KEY_LEN],
        private_key: &[u8; pqc::SIG_PRIVATE_KEY_LEN],
    ) {
        self.sig_public_key = *public_key;
        self.sig_private_key = *private_key;
    }

    /// Replaces the KEM key pair.
    pub fn set_kem_keys(
        &mut self,
        public_key: &[u8; pqc::KEM_PUBLIC_KEY_LEN],
        private_key: &[u8; pqc::KEM_PRIVATE_KEY_LEN],
    ) {
        self.kem_public_key = *public_key;
        self.kem_private_key = *private_key;
    }

    /// Signs `message` with the session's private key.
    pub fn sign(
        &mut self,
        scheme: &mut dyn pqc::Signature,
        message: &[u8; pqc::SIG_MESSAGE_LEN],
    ) -> Result<&[u8; pqc::SIG_LEN], pqc::Error> {
        scheme.sign(&self.sig_private_key, message, &mut self.signature)?;
        Ok(&self.signature)
    }

    /// Verifies a signed message against the session's public key.
    pub fn verify(
        &self,
        scheme: &mut dyn pqc::Signature,
        signed_message: &[u8; pqc::SIGNED_MESSAGE_LEN],
    ) -> Result<(), pqc::Error> {
        scheme.verify(&self.sig_public_key, signed_message)
    }

    /// Encapsulates a fresh shared secret to the session's public key.
    ///
    /// Returns the shared secret and the ciphertext that conveys it.
    pub fn generate(
        &mut self,
        kem: &mut dyn pqc::Kem,
        rng: &mut dyn Csrng,
    ) -> Result<
        (
            &[u8; pqc::KEM_SHARED_SECRET_LEN],
            &[u8; pqc::KEM_CIPHERTEXT_LEN],
        ),
        pqc::Error,
    > {
        kem.encapsulate(
            &self.kem_public_key,
            rng,
            &mut self.shared_secret,
            &mut self.ciphertext,
        )?;
        Ok((&self.shared_secret, &self.ciphertext))
    }

    /// Recovers the shared secret conveyed by `ciphertext`, using the
    /// session's private key.
    pub fn decode(
        &mut self,
        kem: &mut dyn pqc::Kem,
        ciphertext: &[u8; pqc::KEM_CIPHERTEXT_LEN],
    ) -> Result<&[u8; pqc::KEM_SHARED_SECRET_LEN], pqc::Error> {
        self.ciphertext = *ciphertext;
        self.shared_secret = [0; pqc::KEM_SHARED_SECRET_LEN];
        kem.decapsulate(
            &self.kem_private_key,
            &self.ciphertext,
            &mut self.shared_secret,
        )?;
        Ok(&self.shared_secret)
    }
}

#[cfg(all(test, feature = "pqclean"))]
mod test {
    use super::*;
    use crate::crypto::pqc::Kem as _;
    use crate::crypto::pqc::Signature as _;
    use crate::crypto::prng::Prng;
    use crate::crypto::pqclean::Dilithium3;
    use crate::crypto::pqclean::Kyber512;

    #[test]
    fn sign_then_verify() {
        let mut rng = Prng::from_seed(&[3; 32]);
        let mut scheme = Dilithium3::new();
        let mut session = PqcSession::new();

        let mut pk = [0; pqc::SIG_PUBLIC_KEY_LEN];
        let mut sk = [0; pqc::SIG_PRIVATE_KEY_LEN];
        scheme.keypair(&mut rng, &mut pk, &mut sk).unwrap();
        session.set_signature_keys(&pk, &sk);

        let message = [0x42; pqc::SIG_MESSAGE_LEN];
        let mut signed = [0; pqc::SIGNED_MESSAGE_LEN];
        let signature = session.sign(&mut scheme, &message).unwrap();
        signed[..pqc::SIG_LEN].copy_from_slice(signature);
        signed[pqc::SIG_LEN..].copy_from_slice(&message);
        session.verify(&mut scheme, &signed).unwrap();

        signed[pqc::SIGNED_MESSAGE_LEN - 1] ^= 0x80;
        assert!(session.verify(&mut scheme, &signed).is_err());
    }

    #[test]
    fn generate_then_decode() {
        let mut rng = Prng::from_seed(&[4; 32]);
        let mut kem = Kyber512::new();
        let mut session = PqcSession::new();

        let mut pk = [0; pqc::KEM_PUBLIC_KEY_LEN];
        let mut sk = [0; pqc::KEM_PRIVATE_KEY_LEN];
        kem.keypair(&mut rng, &mut pk, &mut sk).unwrap();
        session.set_kem_keys(&pk, &sk);

        let (secret, ciphertext) = session.generate(&mut kem, &mut rng).unwrap();
        let (secret, ciphertext) = (*secret, *ciphertext);
        assert_eq!(session.decode(&mut kem, &ciphertext).unwrap(), &secret);
    }
}

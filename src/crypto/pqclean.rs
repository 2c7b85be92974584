// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Post-quantum primitives backed by the PQClean reference implementations.
//!
//! [`Dilithium3`] and [`Kyber512`] wrap the `pqcrypto-dilithium` and
//! `pqcrypto-kyber` crates, which compile PQClean's portable C sources.
//! Both draw their randomness from the operating system, so the board's
//! [`Csrng`] is not consulted; this needs the `std` feature.
//!
//! The board reserves 4016 bytes for a Dilithium3 private key while the
//! PQClean encoding uses 4000. Keys are stored at the front of that slot;
//! the remainder is zeroed on generation and ignored when signing.

use pqcrypto_dilithium::dilithium3;
use pqcrypto_kyber::kyber512;
use pqcrypto_traits::kem::Ciphertext as _;
use pqcrypto_traits::kem::PublicKey as _;
use pqcrypto_traits::kem::SecretKey as _;
use pqcrypto_traits::kem::SharedSecret as _;
use pqcrypto_traits::sign::DetachedSignature as _;
use pqcrypto_traits::sign::PublicKey as _;
use pqcrypto_traits::sign::SecretKey as _;
use static_assertions::const_assert;
use static_assertions::const_assert_eq;

use crate::crypto::csrng::Csrng;
use crate::crypto::pqc;
use crate::Result;

const DILITHIUM3_PRIVATE_KEY_LEN: usize = dilithium3::secret_key_bytes();

const_assert_eq!(dilithium3::public_key_bytes(), pqc::SIG_PUBLIC_KEY_LEN);
const_assert!(DILITHIUM3_PRIVATE_KEY_LEN <= pqc::SIG_PRIVATE_KEY_LEN);
const_assert_eq!(dilithium3::signature_bytes(), pqc::SIG_LEN);

const_assert_eq!(kyber512::public_key_bytes(), pqc::KEM_PUBLIC_KEY_LEN);
const_assert_eq!(kyber512::secret_key_bytes(), pqc::KEM_PRIVATE_KEY_LEN);
const_assert_eq!(kyber512::ciphertext_bytes(), pqc::KEM_CIPHERTEXT_LEN);
const_assert_eq!(
    kyber512::shared_secret_bytes(),
    pqc::KEM_SHARED_SECRET_LEN
);

/// Dilithium, security level 3, as a [`pqc::Signature`].
#[derive(Default)]
pub struct Dilithium3 {
    _priv: (),
}

impl Dilithium3 {
    /// Creates a new `Dilithium3`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl pqc::Signature for Dilithium3 {
    fn keypair(
        &mut self,
        _: &mut dyn Csrng,
        public_key: &mut [u8; pqc::SIG_PUBLIC_KEY_LEN],
        private_key: &mut [u8; pqc::SIG_PRIVATE_KEY_LEN],
    ) -> Result<(), pqc::Error> {
        let (pk, sk) = dilithium3::keypair();
        let (head, tail) = private_key.split_at_mut(DILITHIUM3_PRIVATE_KEY_LEN);
        public_key.copy_from_slice(pk.as_bytes());
        head.copy_from_slice(sk.as_bytes());
        for b in tail {
            *b = 0;
        }
        Ok(())
    }

    fn sign(
        &mut self,
        private_key: &[u8; pqc::SIG_PRIVATE_KEY_LEN],
        message: &[u8; pqc::SIG_MESSAGE_LEN],
        signature: &mut [u8; pqc::SIG_LEN],
    ) -> Result<(), pqc::Error> {
        let sk = dilithium3::SecretKey::from_bytes(
            &private_key[..DILITHIUM3_PRIVATE_KEY_LEN],
        )
        .map_err(|_| fail!(pqc::Error::Unspecified))?;
        let sig = dilithium3::detached_sign(message, &sk);
        check!(sig.as_bytes().len() == pqc::SIG_LEN, pqc::Error::Unspecified);
        signature.copy_from_slice(sig.as_bytes());
        Ok(())
    }

    fn verify(
        &mut self,
        public_key: &[u8; pqc::SIG_PUBLIC_KEY_LEN],
        signed_message: &[u8; pqc::SIGNED_MESSAGE_LEN],
    ) -> Result<(), pqc::Error> {
        let (sig, message) = signed_message.split_at(pqc::SIG_LEN);
        let pk = dilithium3::PublicKey::from_bytes(public_key)
            .map_err(|_| fail!(pqc::Error::Unspecified))?;
        let sig = dilithium3::DetachedSignature::from_bytes(sig)
            .map_err(|_| fail!(pqc::Error::BadSignature))?;
        dilithium3::verify_detached_signature(&sig, message, &pk)
            .map_err(|_| fail!(pqc::Error::BadSignature))
    }
}

/// Kyber-512 as a [`pqc::Kem`].
#[derive(Default)]
pub struct Kyber512 {
    _priv: (),
}

impl Kyber512 {
    /// Creates a new `Kyber512`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl pqc::Kem for Kyber512 {
    fn keypair(
        &mut self,
        _: &mut dyn Csrng,
        public_key: &mut [u8; pqc::KEM_PUBLIC_KEY_LEN],
        private_key: &mut [u8; pqc::KEM_PRIVATE_KEY_LEN],
    ) -> Result<(), pqc::Error> {
        let (pk, sk) = kyber512::keypair();
        public_key.copy_from_slice(pk.as_bytes());
        private_key.copy_from_slice(sk.as_bytes());
        Ok(())
    }

    fn encapsulate(
        &mut self,
        public_key: &[u8; pqc::KEM_PUBLIC_KEY_LEN],
        _: &mut dyn Csrng,
        shared_secret: &mut [u8; pqc::KEM_SHARED_SECRET_LEN],
        ciphertext: &mut [u8; pqc::KEM_CIPHERTEXT_LEN],
    ) -> Result<(), pqc::Error> {
        let pk = kyber512::PublicKey::from_bytes(public_key)
            .map_err(|_| fail!(pqc::Error::Unspecified))?;
        let (ss, ct) = kyber512::encapsulate(&pk);
        shared_secret.copy_from_slice(ss.as_bytes());
        ciphertext.copy_from_slice(ct.as_bytes());
        Ok(())
    }

    fn decapsulate(
        &mut self,
        private_key: &[u8; pqc::KEM_PRIVATE_KEY_LEN],
        ciphertext: &[u8; pqc::KEM_CIPHERTEXT_LEN],
        shared_secret: &mut [u8; pqc::KEM_SHARED_SECRET_LEN],
    ) -> Result<(), pqc::Error> {
        let sk = kyber512::SecretKey::from_bytes(private_key)
            .map_err(|_| fail!(pqc::Error::Unspecified))?;
        let ct = kyber512::Ciphertext::from_bytes(ciphertext)
            .map_err(|_| fail!(pqc::Error::Unspecified))?;
        let ss = kyber512::decapsulate(&ct, &sk);
        shared_secret.copy_from_slice(ss.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::crypto::pqc::Kem as _;
    use crate::crypto::pqc::Signature as _;
    use crate::crypto::prng::Prng;
    use crate::crypto::testdata;

    fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
        let mut out = [0; N];
        out.copy_from_slice(bytes);
        out
    }

    #[test]
    fn kyber512_known_answer() {
        let sk = array::<{ pqc::KEM_PRIVATE_KEY_LEN }>(testdata::KYBER512_SK);
        let ct = array::<{ pqc::KEM_CIPHERTEXT_LEN }>(testdata::KYBER512_CT);

        let mut ss = [0; pqc::KEM_SHARED_SECRET_LEN];
        Kyber512::new().decapsulate(&sk, &ct, &mut ss).unwrap();
        assert_eq!(&ss[..], testdata::KYBER512_SS);
    }

    #[test]
    fn kyber512_rejects_tampered_ciphertext() {
        let sk = array::<{ pqc::KEM_PRIVATE_KEY_LEN }>(testdata::KYBER512_SK);
        let mut ct = array::<{ pqc::KEM_CIPHERTEXT_LEN }>(testdata::KYBER512_CT);
        ct[0] ^= 0x01;

        // Implicit rejection: a secret comes back, just not the right one.
        let mut ss = [0; pqc::KEM_SHARED_SECRET_LEN];
        Kyber512::new().decapsulate(&sk, &ct, &mut ss).unwrap();
        assert_ne!(&ss[..], testdata::KYBER512_SS);
    }

    #[test]
    fn kyber512_encapsulates_to_reference_key() {
        let mut rng = Prng::from_seed(&[2; 32]);
        let mut kem = Kyber512::new();
        let pk = array::<{ pqc::KEM_PUBLIC_KEY_LEN }>(testdata::KYBER512_PK);
        let sk = array::<{ pqc::KEM_PRIVATE_KEY_LEN }>(testdata::KYBER512_SK);

        let mut ss = [0; pqc::KEM_SHARED_SECRET_LEN];
        let mut ct = [0; pqc::KEM_CIPHERTEXT_LEN];
        kem.encapsulate(&pk, &mut rng, &mut ss, &mut ct).unwrap();

        let mut recovered = [0; pqc::KEM_SHARED_SECRET_LEN];
        kem.decapsulate(&sk, &ct, &mut recovered).unwrap();
        assert_eq!(ss, recovered);
    }

    #[test]
    fn dilithium3_sign_then_verify() {
        let mut rng = Prng::from_seed(&[1; 32]);
        let mut sig = Dilithium3::new();
        let mut pk = [0; pqc::SIG_PUBLIC_KEY_LEN];
        let mut sk = [0xff; pqc::SIG_PRIVATE_KEY_LEN];
        sig.keypair(&mut rng, &mut pk, &mut sk).unwrap();
        assert!(sk[DILITHIUM3_PRIVATE_KEY_LEN..].iter().all(|&b| b == 0));

        let message = *b"sixteen byte msg";
        let mut signature = [0; pqc::SIG_LEN];
        sig.sign(&sk, &message, &mut signature).unwrap();

        let mut signed = [0; pqc::SIGNED_MESSAGE_LEN];
        signed[..pqc::SIG_LEN].copy_from_slice(&signature);
        signed[pqc::SIG_LEN..].copy_from_slice(&message);
        sig.verify(&pk, &signed).unwrap();

        signed[pqc::SIGNED_MESSAGE_LEN - 1] ^= 1;
        assert_eq!(
            sig.verify(&pk, &signed).map_err(|e| e.into_inner()),
            Err(pqc::Error::BadSignature)
        );
    }

    #[test]
    fn dilithium3_rejects_other_key() {
        let mut rng = Prng::from_seed(&[1; 32]);
        let mut sig = Dilithium3::new();
        let mut pk = [0; pqc::SIG_PUBLIC_KEY_LEN];
        let mut sk = [0; pqc::SIG_PRIVATE_KEY_LEN];
        sig.keypair(&mut rng, &mut pk, &mut sk).unwrap();
        let mut other_pk = [0; pqc::SIG_PUBLIC_KEY_LEN];
        let mut other_sk = [0; pqc::SIG_PRIVATE_KEY_LEN];
        sig.keypair(&mut rng, &mut other_pk, &mut other_sk).unwrap();

        let message = [0x33; pqc::SIG_MESSAGE_LEN];
        let mut signature = [0; pqc::SIG_LEN];
        sig.sign(&sk, &message, &mut signature).unwrap();

        let signed = [&signature[..], &message].concat();
        let signed = array::<{ pqc::SIGNED_MESSAGE_LEN }>(&signed);
        assert!(sig.verify(&other_pk, &signed).is_err());
        assert!(sig.verify(&pk, &signed).is_ok());
    }
}

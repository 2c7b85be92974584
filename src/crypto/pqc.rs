// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Post-quantum signature and key-encapsulation primitives.
//!
//! The post-quantum firmware exposes Dilithium (security level 3) and
//! Kyber-512. Their lattice arithmetic is not part of this crate: the board
//! only relies on the fixed sizes below and on the black-box operations of
//! [`Signature`] and [`Kem`]. Implementations backed by PQClean live in
//! `crypto::pqclean`.
//!
//! Operations take the board's [`Csrng`] where they need randomness; an
//! implementation with its own entropy source may ignore it.
//!
//! Keys handed to these traits are never validated; a garbage key may
//! produce a garbage result, which is not an error.

use crate::crypto::csrng::Csrng;
use crate::Result;

/// The Dilithium parameter set in use.
pub const SIG_VARIANT: u8 = 3;
/// The size of a signature public key.
pub const SIG_PUBLIC_KEY_LEN: usize = 1952;
/// The size of a signature private key.
pub const SIG_PRIVATE_KEY_LEN: usize = 4016;
/// The size of a signature.
pub const SIG_LEN: usize = 3293;
/// The size of a message to be signed.
pub const SIG_MESSAGE_LEN: usize = 16;
/// The size of a signed message: a signature followed by its message.
pub const SIGNED_MESSAGE_LEN: usize = SIG_LEN + SIG_MESSAGE_LEN;

/// The size of a KEM public key.
pub const KEM_PUBLIC_KEY_LEN: usize = 800;
/// The size of a KEM private key.
pub const KEM_PRIVATE_KEY_LEN: usize = 1632;
/// The size of a KEM ciphertext.
pub const KEM_CIPHERTEXT_LEN: usize = 768;
/// The size of a KEM shared secret.
pub const KEM_SHARED_SECRET_LEN: usize = 32;

/// An error returned by a post-quantum primitive.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A signature did not verify.
    BadSignature,
    /// Randomness could not be drawn.
    Entropy,
    /// The primitive failed for some other reason.
    Unspecified,
}

/// A signature scheme with Dilithium3's sizes.
pub trait Signature {
    /// Generates a fresh key pair.
    fn keypair(
        &mut self,
        rng: &mut dyn Csrng,
        public_key: &mut [u8; SIG_PUBLIC_KEY_LEN],
        private_key: &mut [u8; SIG_PRIVATE_KEY_LEN],
    ) -> Result<(), Error>;

    /// Signs `message`, writing a detached signature to `signature`.
    fn sign(
        &mut self,
        private_key: &[u8; SIG_PRIVATE_KEY_LEN],
        message: &[u8; SIG_MESSAGE_LEN],
        signature: &mut [u8; SIG_LEN],
    ) -> Result<(), Error>;

    /// Verifies a signed message, laid out as the signature followed by the
    /// message.
    fn verify(
        &mut self,
        public_key: &[u8; SIG_PUBLIC_KEY_LEN],
        signed_message: &[u8; SIGNED_MESSAGE_LEN],
    ) -> Result<(), Error>;
}
impl dyn Signature {} // Ensure object-safe.

/// A key-encapsulation mechanism with Kyber-512's sizes.
pub trait Kem {
    /// Generates a fresh key pair.
    fn keypair(
        &mut self,
        rng: &mut dyn Csrng,
        public_key: &mut [u8; KEM_PUBLIC_KEY_LEN],
        private_key: &mut [u8; KEM_PRIVATE_KEY_LEN],
    ) -> Result<(), Error>;

    /// Produces a shared secret and the ciphertext that conveys it to the
    /// holder of `public_key`.
    fn encapsulate(
        &mut self,
        public_key: &[u8; KEM_PUBLIC_KEY_LEN],
        rng: &mut dyn Csrng,
        shared_secret: &mut [u8; KEM_SHARED_SECRET_LEN],
        ciphertext: &mut [u8; KEM_CIPHERTEXT_LEN],
    ) -> Result<(), Error>;

    /// Recovers the shared secret conveyed by `ciphertext`.
    fn decapsulate(
        &mut self,
        private_key: &[u8; KEM_PRIVATE_KEY_LEN],
        ciphertext: &[u8; KEM_CIPHERTEXT_LEN],
        shared_secret: &mut [u8; KEM_SHARED_SECRET_LEN],
    ) -> Result<(), Error>;
}
impl dyn Kem {} // Ensure object-safe.

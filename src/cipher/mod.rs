// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The instrumented software cipher library.
//!
//! Every cipher in this module is a plain, keyed block transform: the same
//! key and input always produce the same output. What varies is *how* the
//! output is computed. DES and AES-128 can be asked to run with one of
//! several [`Countermeasure`]s, which change the timing and power profile of
//! the computation (and consume entropy to do so) but, with the exception of
//! the masked AES path, never its result.
//!
//! Ciphers do not know about the trigger lines unless the position of the
//! trigger window is part of the algorithm itself (for example, when the
//! window opens after key expansion); in that case they take a
//! [`Trigger`](crate::hardware::Trigger) explicitly.

use crate::crypto::csrng;
use crate::crypto::csrng::Csrng;
use crate::Result;

pub mod aes;
pub mod aes256;
pub mod des;
pub mod guard;
pub mod present;
pub mod sm4;
pub mod tea;

/// The direction of a block transform.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    /// Plaintext to ciphertext.
    Encrypt,
    /// Ciphertext to plaintext.
    Decrypt,
}

/// A selectable execution path of a cipher.
///
/// A countermeasure alters only the physical signature of a computation.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Countermeasure {
    /// The textbook implementation.
    Baseline,
    /// A random busy-wait before every S-box lookup.
    RandomDelays,
    /// S-box lookups are visited starting from a random position.
    RandomSboxOrder,
    /// Boolean masking of the state and the key schedule.
    Masked,
    /// Genuine rounds are interleaved with rounds on a scratch state.
    DummyRounds,
    /// A random delay at the start of the computation, to break static
    /// alignment of traces.
    Misaligned,
}

/// Errors from the cipher library.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Drawing randomness for a countermeasure failed.
    Entropy,
    /// The cipher has no implementation of the requested countermeasure.
    Unsupported,
}

impl From<csrng::Error> for Error {
    fn from(_: csrng::Error) -> Self {
        Self::Entropy
    }
}

debug_from!(Error => csrng::Error);

/// Spins until the entropy source produces a word divisible by `pain`.
///
/// The expected number of draws is `pain`, but the wait is unbounded.
pub(crate) fn random_delay(rng: &mut dyn Csrng, pain: u32) -> Result<(), Error> {
    loop {
        if rng.next_u32()? % pain == 0 {
            return Ok(());
        }
    }
}

/// Decides whether to slip a dummy round in before the next genuine one.
///
/// Draws entropy only while some budget is left.
pub(crate) fn add_dummy(rng: &mut dyn Csrng, remaining: usize) -> Result<bool, Error> {
    if remaining == 0 {
        return Ok(false);
    }
    Ok(rng.next_u32()? & 1 == 1)
}

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Cryptographic random numbers.

use crate::Result;

/// An error returned by a CSRNG.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates an unspecified, internal error.
    Unspecified,
}

/// A cryptographically-secure random number generator.
///
/// On the board this is the hardware TRNG, which is polled until a fresh
/// 32-bit word is ready. Countermeasures draw their masks, delays, and
/// shuffling offsets from it, and the post-quantum KEM draws its
/// encapsulation randomness from it.
///
/// `Csrng`s must already be seeded with sufficient entropy; creating new
/// random number generators is beyond the scope of this trait.
pub trait Csrng {
    /// Fills `buf` with random bytes.
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error>;
}

impl<C: Csrng + ?Sized> Csrng for &'_ mut C {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        C::fill(*self, buf)
    }
}

impl dyn Csrng + '_ {
    /// Draws one TRNG-style word, interpreting the bytes MSB first.
    pub fn next_u32(&mut self) -> Result<u32, Error> {
        let mut word = [0; 4];
        self.fill(&mut word)?;
        Ok(u32::from_be_bytes(word))
    }
}

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The RSA decryption module.
//!
//! The board carries two textbook RSA implementations: a 1024-bit CRT
//! decryption, and a 512-bit square-and-multiply ("SFM") decryption whose
//! private exponent and implementation strategy the host can change. Both
//! are bignum code outside the scope of this crate; they plug in through
//! [`Rsa`].
//!
//! Ciphertexts and exponents arrive as big-endian byte strings, already
//! truncated to the receive buffer.

use crate::hardware::Trigger;
use crate::io::Write;
use crate::Result;

/// An error returned by an RSA module.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The module rejected its input.
    BadInput,
    /// The reply did not fit the output buffer.
    Overflow,
}

/// An RSA module.
///
/// The decryption functions own the trigger window: they raise it around the
/// modular exponentiation, after the ciphertext has been loaded into bignum
/// form. Output is written to `out`, most significant byte first.
pub trait Rsa {
    /// Decrypts `ciphertext` with the CRT key.
    fn crt_decrypt(
        &mut self,
        ciphertext: &[u8],
        trigger: &mut dyn Trigger,
        out: &mut dyn Write,
    ) -> Result<(), Error>;

    /// Decrypts `ciphertext` with the square-and-multiply key.
    fn sfm_decrypt(
        &mut self,
        ciphertext: &[u8],
        trigger: &mut dyn Trigger,
        out: &mut dyn Write,
    ) -> Result<(), Error>;

    /// Replaces the square-and-multiply private exponent.
    fn sfm_set_exponent(&mut self, exponent: &[u8]) -> Result<(), Error>;

    /// Writes out the key hardcoded into the firmware.
    fn sfm_hardcoded_key(&mut self, out: &mut dyn Write) -> Result<(), Error>;

    /// Selects how the square-and-multiply key is managed (passed in by the
    /// host, hardcoded, or randomly masked).
    fn sfm_set_key_generation(&mut self, method: u8);

    /// Selects the square-and-multiply implementation strategy.
    fn sfm_set_implementation(&mut self, method: u8);
}
impl dyn Rsa {} // Ensure object-safe.

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The on-chip crypto and hash peripheral.
//!
//! Boards without one (or integrations that do not wish to expose it) simply
//! do not provide a [`CryptoEngine`]; the corresponding commands then answer
//! with a string of ASCII `'0'` bytes, exactly as they do when the
//! peripheral reports a failure.

use crate::cipher::Direction;
use crate::hardware::Trigger;
use crate::Result;

/// An error returned by a [`CryptoEngine`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The peripheral does not implement the requested operation.
    Unsupported,
    /// The peripheral reported a failure.
    Failed,
}

/// A hardware block-cipher and hash accelerator.
///
/// Block-cipher operations and HMAC receive the trigger, since on real
/// hardware the trigger must be raised after the peripheral has been loaded
/// with keys and data but before it is started. Plain hashes are bracketed by
/// the caller.
///
/// Every operation defaults to [`Error::Unsupported`].
pub trait CryptoEngine {
    /// Runs one block of AES-ECB, with a 128- or 256-bit `key`.
    fn aes_ecb(
        &mut self,
        direction: Direction,
        key: &[u8],
        block: &mut [u8; 16],
        trigger: &mut dyn Trigger,
    ) -> Result<(), Error> {
        let _ = (direction, key, block, trigger);
        Err(fail!(Error::Unsupported))
    }

    /// Runs one block of DES-ECB, or of TDES-ECB if `key` is 24 bytes long.
    fn des_ecb(
        &mut self,
        direction: Direction,
        key: &[u8],
        block: &mut [u8; 8],
        trigger: &mut dyn Trigger,
    ) -> Result<(), Error> {
        let _ = (direction, key, block, trigger);
        Err(fail!(Error::Unsupported))
    }

    /// Hashes `message` with SHA-1, `iterations` times over; the digest of
    /// the final iteration is returned.
    fn sha1(
        &mut self,
        message: &[u8],
        iterations: u32,
        out: &mut [u8; 20],
    ) -> Result<(), Error> {
        let _ = (message, iterations, out);
        Err(fail!(Error::Unsupported))
    }

    /// Computes HMAC-SHA-1 of `message` under `key`, `iterations` times over.
    fn hmac_sha1(
        &mut self,
        key: &[u8],
        message: &[u8],
        iterations: u32,
        out: &mut [u8; 20],
        trigger: &mut dyn Trigger,
    ) -> Result<(), Error> {
        let _ = (key, message, iterations, out, trigger);
        Err(fail!(Error::Unsupported))
    }

    /// Hashes `message` with MD5.
    fn md5(&mut self, message: &[u8], out: &mut [u8; 16]) -> Result<(), Error> {
        let _ = (message, out);
        Err(fail!(Error::Unsupported))
    }
}
impl dyn CryptoEngine {} // Ensure object-safe.

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The Curve25519 scalar-multiplication module.

use crate::crypto::csrng::Csrng;
use crate::Result;

/// The size of a Curve25519 scalar, in bytes.
pub const SCALAR_LEN: usize = 32;

/// The size of a compressed Curve25519 point, in bytes.
pub const POINT_LEN: usize = 32;

/// An error returned by a [`Curve25519`] module.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The module could not draw randomness.
    Entropy,
    /// The module failed for some other reason.
    Unspecified,
}

/// A Curve25519 implementation that re-randomizes its projective
/// coordinates on every ladder step.
///
/// The randomness comes from `rng`, which the board seeds from the host for
/// each command so that the re-randomization is reproducible.
pub trait Curve25519 {
    /// Computes `out = [scalar] point`.
    fn scalar_mult(
        &mut self,
        scalar: &[u8; SCALAR_LEN],
        point: &[u8; POINT_LEN],
        rng: &mut dyn Csrng,
        out: &mut [u8; POINT_LEN],
    ) -> Result<(), Error>;
}
impl dyn Curve25519 {} // Ensure object-safe.

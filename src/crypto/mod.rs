// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Pluggable cryptograpy traits.
//!
//! The board relies on a handful of primitives it does not implement
//! itself: a source of entropy, a bignum RSA module, a Curve25519 module,
//! and the lattice-based signature and KEM schemes of the post-quantum
//! firmware. This module provides object-safe traits that abstract over
//! those operations, plus the AES-CTR [`prng`] that the ECC command seeds
//! from the host.
//!
//! It is recommended to not import the traits in this module directly, since
//! a lot of them have the same name. Instead, use imports like
//! `use pinata::crypto::csrng;` and partially-qualified names like
//! `csrng::Csrng`.
//!
//! Software implementations of some of these traits are provided under the
//! [`ring` module], based on the [`ring`] crate. Their presence is controlled
//! by the `ring` feature flag; some operations require `std` as well. The
//! post-quantum traits are implemented in [`pqclean`], behind the `pqclean`
//! feature flag.
//!
//! [`ring` module]: ring/index.html

pub mod csrng;
pub mod ecc;
pub mod pqc;
pub mod prng;
pub mod rsa;

#[cfg(feature = "pqclean")]
pub mod pqclean;
#[cfg(feature = "ring")]
pub mod ring;

#[cfg(all(test, feature = "pqclean"))]
pub(crate) mod testdata;

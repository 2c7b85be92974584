// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Host stand-ins for board peripherals, built on the [`ring`] crate.
//!
//! These let the board run on a workstation (see `pinata-tool serve`) and
//! let tests exercise the crypto-engine path end to end:
//! - [`engine::Engine`] replaces the hardware crypto peripheral.
//! - [`trng::Trng`] replaces the hardware TRNG; it needs the `std` feature.
//!
//! Refer to these by path, such as `ring::trng::Trng`, rather than importing
//! them, since their names clash with the traits they implement.
//!
//! The [`ring` warranty disclaimer] applies to this module as well.
//!
//! [`ring` warranty disclaimer]: https://github.com/briansmith/ring/blob/main/README.md

pub mod engine;
#[cfg(feature = "std")]
pub mod trng;

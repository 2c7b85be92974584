// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `pinata` is the firmware core of a side-channel and fault-injection
//! training target.
//!
//! The board exposes a battery of cryptographic operations over a plain byte
//! stream. Each operation comes in several flavors, from textbook
//! implementations that leak everything to ones hardened with random delays,
//! shuffling, masking, dummy rounds, or redundant computation, so that an
//! analyst can measure and attack each of them in turn.
//!
//! The crate is organized bottom-up:
//! - [`io`] and [`net`] provide the byte-level plumbing.
//! - [`hardware`] describes the board peripherals (trigger lines, clock,
//!   display, unique ID, crypto engine) as traits.
//! - [`crypto`] holds entropy sources and the interfaces of the external
//!   RSA, ECC and post-quantum modules.
//! - [`cipher`] is the instrumented software cipher library.
//! - [`session`] is the state that survives between commands.
//! - [`fault`] contains the glitch-hunting demonstrations.
//! - [`protocol`] describes the command set, and [`server`] dispatches it.
//!
//! Nothing in this crate is meant to protect real secrets.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
#![deny(warnings)]
#![deny(unused)]
#![deny(unsafe_code)]

#[cfg(feature = "log")]
extern crate log as __raw_log;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod debug;

#[macro_use]
pub mod protocol;

pub mod cipher;
pub mod crypto;
pub mod fault;
pub mod hardware;
pub mod io;
pub mod net;
pub mod server;
pub mod session;

pub use debug::Error;

/// A [`core::result::Result`] whose error is wrapped in a [`pinata::Error`].
///
/// [`pinata::Error`]: Error
pub type Result<T, E> = core::result::Result<T, Error<E>>;

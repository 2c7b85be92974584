// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Byte-buffer plumbing, in lieu of [`std::io`].
//!
//! Requests and replies are plain byte strings. [`int`] packs the integers
//! that travel inside them, and [`Write`] is the sink that external modules,
//! such as the RSA module, emit their output into.

pub mod int;
pub mod write;

pub use int::Int;
pub use write::Write;

/// A buffer-level I/O error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A write did not fit in what was left of its buffer.
    BufferExhausted,
}

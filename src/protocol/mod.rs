// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Pinata protocol messages.
//!
//! A Pinata protocol message consists of two parts:
//! - An *opcode*, a single byte naming the operation.
//! - A *payload*, whose length is fixed by the opcode, or, for a handful of
//!   opcodes, given by a length prefix.
//!
//! The board answers with a reply whose length is, again, fixed by the
//! opcode. A few opcodes may answer with nothing at all, and a few others
//! prefix their reply with a status byte that decides whether a payload
//! follows. There is no header, no checksum, and no error message: an
//! opcode the board does not know gets a fixed "default reply" instead.
//!
//! This module describes, for each firmware variant, which opcodes exist
//! and what their requests and responses look like; see [`classic`] and
//! [`pqc`]. The two variants share a few opcode values with different
//! meanings, so they are kept apart.

#[macro_use]
mod macros;

pub mod classic;
pub mod pqc;

use core::fmt;

/// The largest payload the board will keep for a length-prefixed request.
pub const MAX_PREFIXED_LEN: usize = 168;

/// What happens to the bytes of a length-prefixed request beyond its
/// maximum length.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Excess {
    /// The bytes are read off the wire and dropped.
    Discard,
    /// The declared length is clamped before reading; the excess stays on
    /// the wire, to be interpreted as the next opcode.
    Leave,
}

/// The shape of a request payload.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Request {
    /// Exactly this many bytes.
    Fixed(usize),
    /// A one-byte length, followed by that many bytes, at most `max`.
    ByteLength {
        /// The largest length honored.
        max: usize,
    },
    /// A big-endian `u16` length, followed by that many bytes, at most
    /// `max`.
    WordLength {
        /// The largest length kept.
        max: usize,
        /// What to do with bytes past `max`.
        excess: Excess,
    },
}

impl Request {
    /// Returns the largest number of payload bytes this request may carry,
    /// excluding any length prefix.
    pub fn max_len(self) -> usize {
        match self {
            Self::Fixed(n) => n,
            Self::ByteLength { max } | Self::WordLength { max, .. } => max,
        }
    }
}

/// The shape of a response.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Response {
    /// Exactly this many bytes.
    Fixed(usize),
    /// Exactly this many bytes, or nothing at all.
    FixedOrSilent(usize),
    /// A status byte, followed by this many bytes if the status is zero.
    StatusPrefixed(usize),
    /// Whatever an external module produces.
    Variable,
}

impl Response {
    /// Returns whether a reply of `len` bytes has this shape.
    pub fn accepts(self, len: usize) -> bool {
        match self {
            Self::Fixed(n) => len == n,
            Self::FixedOrSilent(n) => len == n || len == 0,
            Self::StatusPrefixed(n) => len == 1 || len == 1 + n,
            Self::Variable => true,
        }
    }

    /// Returns the longest reply of this shape, if bounded.
    pub fn max_len(self) -> Option<usize> {
        match self {
            Self::Fixed(n) | Self::FixedOrSilent(n) => Some(n),
            Self::StatusPrefixed(n) => Some(1 + n),
            Self::Variable => None,
        }
    }
}

/// A set of opcodes, such as those of one firmware variant.
///
/// Implementations are generated by the `command_set!` macro. Every opcode
/// survives a trip through its byte, and through its name:
/// ```
/// # use pinata::protocol::CommandSet;
/// # fn test<Op: CommandSet + PartialEq + core::fmt::Debug>(op: Op) {
/// assert_eq!(Op::from_byte(op.byte()), Some(op));
/// assert_eq!(Op::from_name(op.name()), Some(op));
/// # }
/// ```
pub trait CommandSet: Copy + Sized {
    /// Returns the opcode byte.
    fn byte(self) -> u8;

    /// Looks up the opcode for `byte`, if this set has one.
    fn from_byte(byte: u8) -> Option<Self>;

    /// Returns the opcode's name.
    fn name(self) -> &'static str;

    /// Looks up an opcode by name.
    fn from_name(name: &str) -> Option<Self>;

    /// Returns the shapes of this opcode's request and response.
    fn shape(self) -> (Request, Response);

    /// Returns the shape of this opcode's request.
    fn request(self) -> Request {
        self.shape().0
    }

    /// Returns the shape of this opcode's response.
    fn response(self) -> Response {
        self.shape().1
    }
}

/// Returned when parsing a name that is not in a command set.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UnknownOpcode;

impl fmt::Display for UnknownOpcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown opcode")
    }
}

/// The reply to `GET_CODE_REV`, in both variants.
pub const VERSION: [u8; 8] = *b"Ver 3.2\0";

/// The default reply to an unknown opcode.
pub const BAD_COMMAND: [u8; 8] = *b"BadCmd\n\0";

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn response_shapes() {
        assert!(Response::Fixed(8).accepts(8));
        assert!(!Response::Fixed(8).accepts(0));
        assert!(Response::FixedOrSilent(16).accepts(0));
        assert!(!Response::FixedOrSilent(16).accepts(15));
        assert!(Response::StatusPrefixed(32).accepts(1));
        assert!(Response::StatusPrefixed(32).accepts(33));
        assert!(!Response::StatusPrefixed(32).accepts(32));
        assert_eq!(Response::StatusPrefixed(32).max_len(), Some(33));
        assert_eq!(Response::Variable.max_len(), None);
    }
}

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The link to the host.
//!
//! The board talks to its host over an unframed, reliable byte stream: the
//! UART on real hardware, or a TCP socket when the board runs on a
//! workstation. [`HostPort`] abstracts over both, and [`InMemHost`] plays
//! the host in tests.

use crate::io;

pub mod host;

pub use host::HostPort;
pub use host::InMemHost;

/// An error on the host link.
///
/// Any of these ends a server's `run()` loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A reply did not fit in the port's buffer.
    Io(io::Error),
    /// The host hung up, or, for [`InMemHost`], ran out of requests.
    Disconnected,
    /// The host stopped sending in the middle of a request.
    Timeout,
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

debug_from!(Error => io::Error);

/// Maps a socket failure onto the host link: timeouts stay timeouts, and
/// anything else means the host is gone.
#[cfg(feature = "std")]
impl From<std::io::Error> for crate::Error<Error> {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => fail!(Error::Timeout),
            _ => fail!(Error::Disconnected, "host link failed: {}", e),
        }
    }
}

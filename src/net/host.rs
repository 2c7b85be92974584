// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Device-to-host communication.
//!
//! See [`HostPort`] for detailed information.

#[cfg(test)]
use crate::io;
use crate::io::Write as _;
use crate::net;
use crate::Result;

/// Represents a physical port that can be used to interact with a host.
///
/// The board protocol has no framing: the host sends an opcode byte followed
/// by exactly as many bytes as that opcode requires, and the board answers
/// with exactly as many bytes as that opcode produces (or, in a few
/// documented cases, nothing at all). A `HostPort` is therefore just a
/// blocking, exact-length byte pump.
/// ```
/// # use pinata::net::*;
/// fn echo(port: &mut dyn HostPort) -> pinata::Result<(), Error> {
///     let mut byte = [0];
///     port.receive(&mut byte)?;
///     port.send(&byte)
/// }
/// ```
///
/// # Implementing this trait
///
/// `receive()` must block until `out` is completely filled; partial reads
/// are never surfaced to the caller. If the link goes away, implementations
/// should return [`net::Error::Disconnected`].
///
/// `send()` must likewise either write every byte or fail.
pub trait HostPort {
    /// Receives exactly `out.len()` bytes from the host.
    fn receive(&mut self, out: &mut [u8]) -> Result<(), net::Error>;

    /// Sends all of `bytes` to the host.
    fn send(&mut self, bytes: &[u8]) -> Result<(), net::Error>;
}
impl dyn HostPort {} // Ensure object-safety.

impl<P: HostPort + ?Sized> HostPort for &'_ mut P {
    fn receive(&mut self, out: &mut [u8]) -> Result<(), net::Error> {
        P::receive(*self, out)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), net::Error> {
        P::send(*self, bytes)
    }
}

/// An in-memory [`HostPort`], useful for testing.
///
/// Requests are read from a fixed input buffer; once it runs dry, further
/// reads fail with [`net::Error::Disconnected`], which is how a test tells a
/// server loop to stop. Replies are appended to a caller-provided output
/// buffer.
/// ```
/// # use pinata::net::*;
/// let mut out = [0; 8];
/// let mut host = InMemHost::new(&[0xf1], &mut out);
///
/// let mut opcode = [0];
/// host.receive(&mut opcode).unwrap();
/// host.send(b"Ver").unwrap();
/// assert_eq!(host.sent(), b"Ver");
/// assert!(host.receive(&mut opcode).is_err());
/// ```
pub struct InMemHost<'a> {
    input: &'a [u8],
    output: &'a mut [u8],
    len: usize,
}

impl<'a> InMemHost<'a> {
    /// Creates a new `InMemHost`, which will read from `input` and record
    /// replies into `output`.
    pub fn new(input: &'a [u8], output: &'a mut [u8]) -> Self {
        Self {
            input,
            output,
            len: 0,
        }
    }

    /// Returns every byte sent so far.
    pub fn sent(&self) -> &[u8] {
        &self.output[..self.len]
    }

    /// Returns how many request bytes have not been consumed yet.
    pub fn pending(&self) -> usize {
        self.input.len()
    }
}

impl HostPort for InMemHost<'_> {
    fn receive(&mut self, out: &mut [u8]) -> Result<(), net::Error> {
        if self.input.len() < out.len() {
            self.input = &[];
            return Err(fail!(net::Error::Disconnected));
        }
        let (head, tail) = self.input.split_at(out.len());
        out.copy_from_slice(head);
        self.input = tail;
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), net::Error> {
        let mut sink = &mut self.output[self.len..];
        sink.write_bytes(bytes)?;
        self.len += bytes.len();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exact_reads() {
        let mut out = [0; 4];
        let mut host = InMemHost::new(&[1, 2, 3], &mut out);
        let mut two = [0; 2];
        host.receive(&mut two).unwrap();
        assert_eq!(two, [1, 2]);
        assert_eq!(host.pending(), 1);

        // A short read never hands back a partial buffer.
        assert_eq!(
            host.receive(&mut two).map_err(|e| e.into_inner()),
            Err(net::Error::Disconnected)
        );
    }

    #[test]
    fn output_exhaustion() {
        let mut out = [0; 4];
        let mut host = InMemHost::new(&[], &mut out);
        host.send(&[0xfa, 0xcc]).unwrap();
        host.send(&[0xfa, 0xcc]).unwrap();
        assert_eq!(
            host.send(&[0xfa]).map_err(|e| e.into_inner()),
            Err(net::Error::Io(io::Error::BufferExhausted))
        );
        assert_eq!(host.sent(), &[0xfa, 0xcc, 0xfa, 0xcc]);
    }
}

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A framework for building Pinata servers in "handler" style.
//!
//! Servers are complicated. We'd like the server implementation code to only
//! deal with the payload of each opcode, with minimal boilerplate, so that
//! implementing new opcodes and understanding how the server is implemented
//! is simple.
//!
//! This module provides a fully `no_std` framework for writing such handlers,
//! using the `Handler` type. A sample use looks something like this:
//! ```text
//! let handler = Handler::<Opcode, Board>::new()
//!   .handle(Opcode::DesEnc, |ctx| {
//!     // Do stuff with ctx.server and ctx.req...
//!     ctx.reply.send(&block)
//!   })
//!   // ...
//! handler.run(&mut board, &mut buf, host_port)
//! ```
//! This defines a request handler; nothing happens until `run()` is called.
//! When called, `run()` performs the following steps:
//! - It reads one opcode byte from the host port. If the byte is not an
//!   opcode of the command set at all, it returns
//!   [`Error::UnhandledCommand`], and the server decides what to answer.
//! - It reads the request payload, in the shape that opcode declares, into
//!   the caller's buffer.
//! - It selects the `.handle()` call registered for that opcode (if several
//!   were registered, the latest wins) and calls it with the server, the
//!   payload and a [`Channel`] back to the host.
//! - It checks that the handler sent a reply of the declared shape.
//! - If no handler is registered for the opcode, it returns
//!   [`Error::UnhandledCommand`] as well.
//!
//! This module is not part of `pinata`'s API.

use core::convert::TryInto as _;

use arrayvec::ArrayVec;
use byteorder::BE;
use byteorder::LE;

use crate::cipher;
use crate::crypto::csrng;
use crate::io::int;
use crate::io::Int;
use crate::net;
use crate::net::HostPort;
use crate::protocol::CommandSet;
use crate::protocol::Excess;
use crate::protocol::Request;
use crate::Result;

/// An error returned by a server.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Indicates an error in the network layer. If the host went away, the
    /// server should stop serving.
    Network(net::Error),
    /// A countermeasure could not draw entropy.
    Entropy,
    /// A cipher was asked for a path it does not implement.
    Unsupported,
    /// A request did not fit the request buffer, or was shorter than its
    /// opcode requires.
    RequestLength,
    /// A handler sent a reply of the wrong length.
    ResponseLength,
    /// The opcode byte is unknown to the command set, or no handler is
    /// registered for it.
    UnhandledCommand(u8),
}

impl From<net::Error> for Error {
    fn from(e: net::Error) -> Self {
        Self::Network(e)
    }
}

impl From<cipher::Error> for Error {
    fn from(e: cipher::Error) -> Self {
        match e {
            cipher::Error::Entropy => Self::Entropy,
            cipher::Error::Unsupported => Self::Unsupported,
        }
    }
}

impl From<csrng::Error> for Error {
    fn from(_: csrng::Error) -> Self {
        Self::Entropy
    }
}

debug_from!(Error => net::Error, cipher::Error, csrng::Error);

/// The largest number of handlers a single [`Handler`] can hold.
pub const MAX_HANDLERS: usize = 96;

/// A handle for sending reply bytes back to the host, which keeps track of
/// how many bytes were sent.
pub struct Channel<'p> {
    port: &'p mut dyn HostPort,
    sent: usize,
}

impl<'p> Channel<'p> {
    /// Creates a new `Channel` over `port`.
    pub fn new(port: &'p mut dyn HostPort) -> Self {
        Self { port, sent: 0 }
    }

    /// Sends `bytes` to the host.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), net::Error> {
        self.port.send(bytes)?;
        self.sent += bytes.len();
        Ok(())
    }

    /// Sends a big-endian integer to the host.
    pub fn send_be<I: Int>(&mut self, val: I) -> Result<(), net::Error> {
        let mut buf = [0; int::MAX_LEN];
        val.pack::<BE>(&mut buf[..I::LEN]);
        self.send(&buf[..I::LEN])
    }

    /// Sends a little-endian integer to the host.
    pub fn send_le<I: Int>(&mut self, val: I) -> Result<(), net::Error> {
        let mut buf = [0; int::MAX_LEN];
        val.pack::<LE>(&mut buf[..I::LEN]);
        self.send(&buf[..I::LEN])
    }

    /// Returns the number of bytes sent so far.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

/// Context for a request, i.e., all relevant variables for handling a request.
pub struct Context<'a, 'p, Server> {
    /// The server's state.
    pub server: &'a mut Server,
    /// The request payload, with any length prefix stripped.
    pub req: &'a [u8],
    /// The way back to the host.
    pub reply: &'a mut Channel<'p>,
}

impl<'a, Server> Context<'a, '_, Server> {
    /// Returns the `N` bytes of the request payload at `offset`.
    pub fn field<const N: usize>(&self, offset: usize) -> Result<&'a [u8; N], Error> {
        let req: &'a [u8] = self.req;
        req.get(offset..offset + N)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| fail!(Error::RequestLength))
    }

    /// Reads a big-endian integer from the request payload at `offset`.
    pub fn be<I: Int>(&self, offset: usize) -> Result<I, Error> {
        self.req
            .get(offset..offset + I::LEN)
            .map(I::unpack::<BE>)
            .ok_or_else(|| fail!(Error::RequestLength))
    }
}

/// A function that handles one opcode.
pub type HandlerFn<Server> =
    for<'a, 'p> fn(Context<'a, 'p, Server>) -> Result<(), Error>;

/// A request handler table.
///
/// See the module documentation for more information.
pub struct Handler<Op, Server> {
    table: ArrayVec<(Op, HandlerFn<Server>), MAX_HANDLERS>,
}

impl<Op: CommandSet, Server> Default for Handler<Op, Server> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Op: CommandSet, Server> Handler<Op, Server> {
    /// Creates a new, empty `Handler`.
    pub fn new() -> Self {
        Self {
            table: ArrayVec::new(),
        }
    }

    /// Attaches a new handler function for `op`.
    pub fn handle(mut self, op: Op, handler: HandlerFn<Server>) -> Self {
        if self.table.try_push((op, handler)).is_err() {
            error!("handler table is full; dropping handler for {}", op.name());
        }
        self
    }

    /// Returns whether a handler is registered for `op`.
    #[allow(dead_code)]
    pub fn handles(&self, op: Op) -> bool
    where
        Op: PartialEq,
    {
        self.table.iter().any(|(o, _)| *o == op)
    }

    /// Executes a `Handler` with the given context.
    ///
    /// `buf` is scratch space for the request payload; it must be able to
    /// hold the largest request of the command set.
    ///
    /// See the module-level documentation for more information.
    pub fn run<const N: usize>(
        &self,
        server: &mut Server,
        buf: &mut ArrayVec<u8, N>,
        port: &mut dyn HostPort,
    ) -> Result<Op, Error>
    where
        Op: PartialEq,
    {
        let mut byte = [0];
        port.receive(&mut byte)?;
        let op = match Op::from_byte(byte[0]) {
            Some(op) => op,
            None => return Err(fail!(Error::UnhandledCommand(byte[0]))),
        };
        trace!("received opcode {}", op.name());

        read_request(op.request(), buf, port)?;

        let handler = self
            .table
            .iter()
            .rev()
            .find(|(o, _)| *o == op)
            .map(|(_, f)| *f)
            .ok_or_else(|| fail!(Error::UnhandledCommand(byte[0])))?;

        let mut reply = Channel::new(port);
        handler(Context {
            server,
            req: buf.as_slice(),
            reply: &mut reply,
        })?;

        let response = op.response();
        check!(response.accepts(reply.sent()), Error::ResponseLength);
        Ok(op)
    }
}

/// Reads a request payload of the given shape into `buf`.
fn read_request<const N: usize>(
    shape: Request,
    buf: &mut ArrayVec<u8, N>,
    port: &mut dyn HostPort,
) -> Result<(), Error> {
    buf.clear();
    let len = match shape {
        Request::Fixed(n) => n,
        Request::ByteLength { max } => {
            let mut len = [0];
            port.receive(&mut len)?;
            (len[0] as usize).min(max)
        }
        Request::WordLength { max, excess } => {
            let mut len = [0; 2];
            port.receive(&mut len)?;
            let len = u16::unpack::<BE>(&len) as usize;
            if len > max && excess == Excess::Discard {
                fill(buf, max, port)?;
                // The rest is read and dropped.
                let mut sink = [0; 16];
                let mut left = len - max;
                while left > 0 {
                    let n = left.min(sink.len());
                    port.receive(&mut sink[..n])?;
                    left -= n;
                }
                return Ok(());
            }
            len.min(max)
        }
    };
    fill(buf, len, port)
}

fn fill<const N: usize>(
    buf: &mut ArrayVec<u8, N>,
    len: usize,
    port: &mut dyn HostPort,
) -> Result<(), Error> {
    check!(len <= buf.capacity(), Error::RequestLength);
    buf.extend(core::iter::repeat(0).take(len));
    port.receive(buf.as_mut_slice())?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::net::InMemHost;
    use crate::protocol::Response;

    command_set! {
        /// Opcodes for testing.
        pub enum TestOp {
            /// Echoes four bytes.
            Echo = 0x01 => (Request::Fixed(4), Response::Fixed(4)),
            /// Answers with its length-prefixed payload, or not at all.
            Prefixed = 0x02 => (
                Request::WordLength { max: 4, excess: Excess::Discard },
                Response::FixedOrSilent(4),
            ),
            /// Declared, but never handled.
            Orphan = 0x03 => (Request::Fixed(0), Response::Fixed(1)),
        }
    }

    fn echo(ctx: Context<'_, '_, u32>) -> Result<(), Error> {
        *ctx.server += 1;
        ctx.reply.send(ctx.req)?;
        Ok(())
    }

    fn short(ctx: Context<'_, '_, u32>) -> Result<(), Error> {
        ctx.reply.send(&ctx.req[..1])?;
        Ok(())
    }

    fn simulate(
        handler: &Handler<TestOp, u32>,
        server: &mut u32,
        input: &[u8],
    ) -> (Result<TestOp, Error>, Vec<u8>) {
        let mut out = [0; 64];
        let mut port = InMemHost::new(input, &mut out);
        let mut buf = ArrayVec::<u8, 8>::new();
        let result = handler.run(server, &mut buf, &mut port);
        let sent = port.sent().to_vec();
        (result, sent)
    }

    #[test]
    fn empty_handler() {
        let handler = Handler::<TestOp, u32>::new();
        let (result, sent) = simulate(&handler, &mut 0, &[0x01, 1, 2, 3, 4]);
        assert_eq!(
            result.map_err(|e| e.into_inner()),
            Err(Error::UnhandledCommand(0x01))
        );
        assert!(sent.is_empty());
    }

    #[test]
    fn single_handler() {
        let handler = Handler::<TestOp, u32>::new().handle(TestOp::Echo, echo);
        let mut calls = 0;
        let (result, sent) = simulate(&handler, &mut calls, &[0x01, 1, 2, 3, 4]);
        assert_eq!(result.map_err(|e| e.into_inner()), Ok(TestOp::Echo));
        assert_eq!(sent, [1, 2, 3, 4]);
        assert_eq!(calls, 1);
    }

    #[test]
    fn integer_fields() {
        let handler = Handler::<TestOp, u32>::new().handle(TestOp::Echo, |ctx| {
            assert!(ctx.be::<u32>(2).is_err());
            let word = ctx.be::<u32>(0)?;
            ctx.reply.send_le(word)?;
            Ok(())
        });
        let (result, sent) =
            simulate(&handler, &mut 0, &[0x01, 0xca, 0xfe, 0xba, 0xbe]);
        assert_eq!(result.map_err(|e| e.into_inner()), Ok(TestOp::Echo));
        assert_eq!(sent, [0xbe, 0xba, 0xfe, 0xca]);
    }

    #[test]
    fn unknown_byte() {
        let handler = Handler::<TestOp, u32>::new().handle(TestOp::Echo, echo);
        let (result, _) = simulate(&handler, &mut 0, &[0x7f]);
        assert_eq!(
            result.map_err(|e| e.into_inner()),
            Err(Error::UnhandledCommand(0x7f))
        );
    }

    #[test]
    fn declared_but_unhandled() {
        let handler = Handler::<TestOp, u32>::new().handle(TestOp::Echo, echo);
        assert!(!handler.handles(TestOp::Orphan));
        let (result, _) = simulate(&handler, &mut 0, &[0x03]);
        assert_eq!(
            result.map_err(|e| e.into_inner()),
            Err(Error::UnhandledCommand(0x03))
        );
    }

    #[test]
    fn duplicate_handler() {
        let handler = Handler::<TestOp, u32>::new()
            .handle(TestOp::Echo, short)
            .handle(TestOp::Echo, echo);
        let (result, sent) = simulate(&handler, &mut 0, &[0x01, 9, 8, 7, 6]);
        assert!(result.is_ok());
        assert_eq!(sent, [9, 8, 7, 6]);
    }

    #[test]
    fn response_length_is_enforced() {
        let handler = Handler::<TestOp, u32>::new().handle(TestOp::Echo, short);
        let (result, sent) = simulate(&handler, &mut 0, &[0x01, 9, 8, 7, 6]);
        assert_eq!(
            result.map_err(|e| e.into_inner()),
            Err(Error::ResponseLength)
        );
        assert_eq!(sent, [9]);
    }

    #[test]
    fn prefixed_excess_is_discarded() {
        let handler =
            Handler::<TestOp, u32>::new().handle(TestOp::Prefixed, echo);
        let mut out = [0; 64];
        let input = [0x02, 0x00, 0x06, 1, 2, 3, 4, 5, 6, 0x01];
        let mut port = InMemHost::new(&input, &mut out);
        let mut buf = ArrayVec::<u8, 8>::new();
        handler.run(&mut 0, &mut buf, &mut port).unwrap();
        assert_eq!(port.sent(), [1, 2, 3, 4]);
        // Only the next opcode is left.
        assert_eq!(port.pending(), 1);
    }
}

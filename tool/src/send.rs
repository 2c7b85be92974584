// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! One-shot requests against a running board.

use std::io;
use std::io::Read as _;
use std::io::Write as _;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::time::Duration;

use pinata::protocol::classic;
use pinata::protocol::pqc;
use pinata::protocol::CommandSet;

use crate::util::Variant;

/// The most bytes read for a reply whose length the board doesn't know in
/// advance.
const VARIABLE_REPLY_LIMIT: usize = 4096;

/// Sends a single command to a board and prints its reply.
#[derive(structopt::StructOpt)]
pub struct Send {
    /// The board's address.
    #[structopt(short, long, default_value = "127.0.0.1:9999")]
    address: SocketAddr,

    /// The command set to interpret the opcode against: `classic` or `pqc`.
    #[structopt(long, default_value = "classic")]
    variant: Variant,

    /// How long to wait for the reply before giving up.
    #[structopt(long, default_value = "1000")]
    timeout_ms: u64,

    /// Whether to print the exchange as JSON.
    #[structopt(long)]
    json: bool,

    /// The opcode, either by name (`DesEnc`) or as a hex byte (`44`).
    opcode: String,

    /// The request payload, in hex.
    #[structopt(default_value = "")]
    payload: String,
}

/// An opcode, resolved against a command set.
struct Resolved {
    byte: u8,
    name: Option<&'static str>,
    reply_len: Option<usize>,
}

fn resolve<Op: CommandSet>(s: &str) -> Result<Resolved, String> {
    let byte = match Op::from_name(s) {
        Some(op) => op.byte(),
        None => u8::from_str_radix(s.trim_start_matches("0x"), 16)
            .map_err(|_| format!("unknown opcode `{}`", s))?,
    };
    // Unknown bytes are still sent; the board answers them with its default
    // reply.
    let op = Op::from_byte(byte);
    Ok(Resolved {
        byte,
        name: op.map(Op::name),
        reply_len: op.and_then(|op| op.response().max_len()),
    })
}

/// The JSON form of an exchange.
#[derive(serde::Serialize)]
struct Exchange<'a> {
    opcode: u8,
    name: Option<&'a str>,
    request: String,
    reply: String,
    silent: bool,
}

/// Reads up to `limit` bytes, stopping early on EOF or timeout.
fn read_reply(stream: &mut TcpStream, limit: usize) -> io::Result<Vec<u8>> {
    let mut reply = vec![0; limit];
    let mut len = 0;
    while len < limit {
        match stream.read(&mut reply[len..]) {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                break
            }
            Err(e) => return Err(e),
        }
    }
    reply.truncate(len);
    Ok(reply)
}

impl Send {
    pub fn run(self) {
        let op = check!(
            match self.variant {
                Variant::Classic => resolve::<classic::Opcode>(&self.opcode),
                Variant::Pqc => resolve::<pqc::Opcode>(&self.opcode),
            },
            "failed to parse opcode"
        );
        let payload =
            check!(crate::util::unhex(&self.payload), "failed to parse payload");

        let timeout = Duration::from_millis(self.timeout_ms);
        let mut stream = check!(
            TcpStream::connect_timeout(&self.address, timeout),
            "failed to connect to {}",
            self.address,
        );
        check!(stream.set_read_timeout(Some(timeout)), "failed to set timeout");

        let mut request = vec![op.byte];
        request.extend_from_slice(&payload);
        check!(stream.write_all(&request), "failed to send request");
        log::debug!("sent {} bytes", request.len());

        let limit = op.reply_len.unwrap_or(VARIABLE_REPLY_LIMIT);
        let reply = check!(read_reply(&mut stream, limit), "failed to read reply");
        if let Some(expected) = op.reply_len {
            if !reply.is_empty() && reply.len() < expected {
                log::warn!("short reply: {} of {} bytes", reply.len(), expected);
            }
        }

        if self.json {
            let exchange = Exchange {
                opcode: op.byte,
                name: op.name,
                request: crate::util::hex(&payload),
                reply: crate::util::hex(&reply),
                silent: reply.is_empty(),
            };
            let stdout = io::stdout();
            check!(
                serde_json::to_writer_pretty(stdout.lock(), &exchange),
                "failed to serialize reply as JSON"
            );
            println!();
        } else if reply.is_empty() {
            println!("(no reply)");
        } else {
            println!("{}", crate::util::hex(&reply));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn opcodes_resolve_by_name_or_byte() {
        let op = resolve::<classic::Opcode>("GetCodeRev").unwrap();
        assert_eq!(op.byte, 0xf1);
        assert_eq!(op.reply_len, Some(8));

        let op = resolve::<pqc::Opcode>("0x93").unwrap();
        assert_eq!(op.name, Some("DilithiumSign"));

        let op = resolve::<pqc::Opcode>("44").unwrap();
        assert_eq!((op.byte, op.name, op.reply_len), (0x44, None, None));

        assert!(resolve::<classic::Opcode>("NotAnOpcode").is_err());
    }
}

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Argument parsing and I/O utilities.

use std::fmt::Write as _;
use std::io::Read as _;
use std::io::Write as _;
use std::net::TcpStream;
use std::str::FromStr;

use pinata::crypto::prng;
use pinata::net;
use pinata::net::HostPort;

/// Like `?`, but crashes the binary with a nice error message.
macro_rules! check {
    ($result:expr, $fmt:literal $(, $args:expr)* $(,)?) => {
        match $result {
            Ok(x) => x,
            Err(e) => {
                eprintln!("error: {}: {:?}", format_args!($fmt, $($args,)*), e);
                std::process::exit(2)
            }
        }
    }
}

/// A firmware variant.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Variant {
    /// The classical cipher and fault-injection firmware.
    Classic,
    /// The post-quantum firmware.
    Pqc,
}

impl FromStr for Variant {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "classic" => Ok(Self::Classic),
            "pqc" => Ok(Self::Pqc),
            _ => Err(format!("unknown variant `{}`; try `classic` or `pqc`", s)),
        }
    }
}

/// Renders `bytes` as lowercase hex.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Parses a hex string, ignoring whitespace and an optional `0x` prefix.
pub fn unhex(s: &str) -> Result<Vec<u8>, String> {
    let digits = s
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<Vec<_>>();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in `{}`", s));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let byte = pair.iter().collect::<String>();
            u8::from_str_radix(&byte, 16)
                .map_err(|_| format!("bad hex byte `{}`", byte))
        })
        .collect()
}

/// Parses a PRNG seed: exactly [`prng::SEED_LEN`] bytes of hex.
pub fn parse_seed(s: &str) -> Result<[u8; prng::SEED_LEN], String> {
    let bytes = unhex(s)?;
    let mut seed = [0; prng::SEED_LEN];
    if bytes.len() != seed.len() {
        return Err(format!(
            "seed must be {} bytes, got {}",
            seed.len(),
            bytes.len()
        ));
    }
    seed.copy_from_slice(&bytes);
    Ok(seed)
}

/// A [`HostPort`] over a TCP connection.
pub struct TcpPort(pub TcpStream);

impl HostPort for TcpPort {
    fn receive(&mut self, out: &mut [u8]) -> pinata::Result<(), net::Error> {
        self.0.read_exact(out)?;
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> pinata::Result<(), net::Error> {
        self.0.write_all(bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_helpers() {
        assert_eq!(hex(&[0x00, 0xab, 0x7f]), "00ab7f");
        assert_eq!(unhex("0x00ab 7F").unwrap(), vec![0x00, 0xab, 0x7f]);
        assert!(unhex("abc").is_err());
        assert!(unhex("zz").is_err());
        assert!(parse_seed("00").is_err());
        assert_eq!(parse_seed(&"11".repeat(32)).unwrap(), [0x11; 32]);
    }
}

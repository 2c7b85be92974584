// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Test-only data.
//!
//! This module includes the first known-answer vector of the Kyber-512
//! reference implementation, so that KEM backends can be checked against
//! an independent source rather than against themselves.
//!
//! The files were cut out of the `count = 0` entry of the file printed by
//! PQClean's `nistkat` harness for `crypto_kem/kyber512/clean`; the whole
//! file hashes to the `nistkat-sha256` recorded in that scheme's `META.yml`:
//! ```text
//! 76aae1fa3f8367522700b22da635a5bc4ced4298edb0eb9947aa3ba60d62676f
//! ```

/// A Kyber-512 public key.
pub const KYBER512_PK: &[u8] = include_bytes!("kyber512_pk.bin");

/// The Kyber-512 private key matching `KYBER512_PK`.
pub const KYBER512_SK: &[u8] = include_bytes!("kyber512_sk.bin");

/// A ciphertext encapsulated to `KYBER512_PK`.
pub const KYBER512_CT: &[u8] = include_bytes!("kyber512_ct.bin");

/// The shared secret conveyed by `KYBER512_CT`.
pub const KYBER512_SS: &[u8] = include_bytes!("kyber512_ss.bin");

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Pinata "server" implementations.
//!
//! A Pinata "server" is the command loop of a board: it reads an opcode from
//! the host, runs the corresponding operation against the board session, and
//! answers. There are two firmware variants with disjoint command sets:
//! - [`classic::Classic`], the classical cipher, hash, RSA, ECC and
//!   fault-injection board.
//! - [`pqc::Pqc`], the post-quantum signature and KEM board.
//!
//! Both are built from an `Options` struct of hardware handles, and driven
//! either one request at a time through `process_request()`, or forever
//! through `run()`.
//!
//! ```text
//! let mut board = Classic::new(classic::Options { ... });
//! board.run(&mut host_port)
//! ```

mod handler;
pub use handler::Error;

pub mod classic;
pub mod pqc;

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `pinata-tool` runs a Pinata board on a workstation, and talks to one.

#![deny(missing_docs)]
#![deny(warnings)]
#![deny(unused)]
#![deny(unsafe_code)]

use structopt::StructOpt as _;

#[macro_use]
mod util;

mod send;
mod serve;

/// A command-line tool for working with Pinata boards.
#[allow(missing_docs)]
#[derive(structopt::StructOpt)]
#[structopt(author)]
enum CliCommand {
    /// Runs a simulated board behind a TCP listener.
    Serve(serve::Serve),
    /// Sends one command to a board and prints its reply.
    Send(send::Send),
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    match CliCommand::from_args() {
        CliCommand::Serve(s) => s.run(),
        CliCommand::Send(s) => s.run(),
    }
}

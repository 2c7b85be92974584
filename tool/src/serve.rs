// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A simulated board behind a TCP listener.

use std::net::SocketAddr;
use std::net::TcpListener;

use pinata::crypto::csrng::Csrng;
use pinata::crypto::prng;
use pinata::crypto::pqclean::Dilithium3;
use pinata::crypto::pqclean::Kyber512;
use pinata::crypto::prng::Prng;
use pinata::crypto::ring;
use pinata::fault::NoFaults;
use pinata::hardware::Clock;
use pinata::hardware::ClockSource;
use pinata::hardware::Display;
use pinata::hardware::Identity;
use pinata::hardware::Line;
use pinata::hardware::Trigger;
use pinata::server::classic;
use pinata::server::classic::Classic;
use pinata::server::pqc;
use pinata::server::pqc::Pqc;
use pinata::server::Error;

use crate::util::TcpPort;
use crate::util::Variant;

/// Runs a simulated board, serving one TCP connection at a time.
///
/// The board is powered up once; its session survives reconnects.
#[derive(structopt::StructOpt)]
pub struct Serve {
    /// The address to listen on.
    #[structopt(short, long, default_value = "127.0.0.1:9999")]
    address: SocketAddr,

    /// The firmware to run: `classic` or `pqc`.
    #[structopt(long, default_value = "classic")]
    variant: Variant,

    /// Seeds the board's entropy with 32 bytes of hex, instead of using the
    /// system RNG.
    #[structopt(long, parse(try_from_str = crate::util::parse_seed))]
    seed: Option<[u8; prng::SEED_LEN]>,
}

/// A trigger that logs its edges.
struct LogTrigger;

impl Trigger for LogTrigger {
    fn assert_trigger(&mut self, line: Line) {
        log::trace!("trigger {:?} high", line);
    }

    fn deassert_trigger(&mut self, line: Line) {
        log::trace!("trigger {:?} low", line);
    }
}

/// A clock tree that only remembers what it was told.
struct SoftClock {
    mhz: u8,
    source: ClockSource,
}

impl Clock for SoftClock {
    fn set_pll(&mut self, mhz: u8) {
        log::info!("clock: PLL at {}MHz", mhz);
        self.mhz = mhz;
        self.source = ClockSource::Pll;
    }

    fn set_bypass(&mut self) {
        log::info!("clock: external bypass (was {}MHz)", self.mhz);
        self.source = ClockSource::External;
    }

    fn source(&self) -> ClockSource {
        self.source
    }
}

/// A display that writes to the log.
struct LogDisplay;

impl Display for LogDisplay {
    fn show(&mut self, text: &[u8]) {
        log::info!("display: {}", String::from_utf8_lossy(text));
    }

    fn spi_write(&mut self, bytes: &[u8]) {
        log::debug!("display spi: {}", crate::util::hex(bytes));
    }
}

/// A fixed unique ID.
struct SoftIdentity;

impl Identity for SoftIdentity {
    fn unique_device_identity(&mut self) -> [u32; 3] {
        [0x0050_4e41, 0x5441_2d53, 0x494d_0001]
    }
}

/// Hands each incoming connection to `run`, which returns once the host
/// disconnects.
fn serve(listener: &TcpListener, run: &mut dyn FnMut(&mut TcpPort) -> Error) {
    for stream in listener.incoming() {
        let stream = check!(stream, "failed to accept connection");
        let peer = stream.peer_addr().ok();
        log::info!("host connected: {:?}", peer);
        let mut port = TcpPort(stream);
        let why = run(&mut port);
        log::info!("host {:?} went away: {:?}", peer, why);
    }
}

impl Serve {
    pub fn run(self) {
        let mut rng: Box<dyn Csrng> = match &self.seed {
            Some(seed) => Box::new(Prng::from_seed(seed)),
            None => Box::new(ring::trng::Trng::new()),
        };
        let mut trigger = LogTrigger;

        let listener = check!(
            TcpListener::bind(self.address),
            "failed to bind {}",
            self.address,
        );
        log::info!("{:?} board listening on {}", self.variant, self.address);

        match self.variant {
            Variant::Classic => {
                let mut clock = SoftClock {
                    mhz: 168,
                    source: ClockSource::Pll,
                };
                let mut display = LogDisplay;
                let mut identity = SoftIdentity;
                let mut faults = NoFaults;
                let mut engine = ring::engine::Engine::new();

                let mut board = Classic::new(classic::Options {
                    trigger: &mut trigger,
                    rng: &mut *rng,
                    clock: &mut clock,
                    display: &mut display,
                    identity: &mut identity,
                    faults: &mut faults,
                    engine: Some(&mut engine),
                    rsa: None,
                    ecc: None,
                });
                serve(&listener, &mut |port: &mut TcpPort| match board.run(port) {
                    Ok(never) => match never {},
                    Err(e) => e.into_inner(),
                });
            }
            Variant::Pqc => {
                let mut signature = Dilithium3::new();
                let mut kem = Kyber512::new();

                let mut board = Pqc::new(pqc::Options {
                    trigger: &mut trigger,
                    rng: &mut *rng,
                    signature: &mut signature,
                    kem: &mut kem,
                });
                serve(&listener, &mut |port: &mut TcpPort| match board.run(port) {
                    Ok(never) => match never {},
                    Err(e) => e.into_inner(),
                });
            }
        }
    }
}

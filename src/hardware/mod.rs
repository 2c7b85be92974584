// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Pluggable hardware functionality
//!
//! This module provides traits for plugging in the board peripherals that
//! the firmware core drives but does not implement: trigger GPIOs, the clock
//! tree, the status display, the device unique ID, and the optional crypto
//! peripheral.

pub mod engine;

pub use engine::CryptoEngine;

/// One of the board's trigger outputs.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Line {
    /// The main trigger, which brackets the interesting part of a command.
    Main,
    /// The auxiliary trigger, used to mark sub-windows, such as the boot
    /// check loop or individual S-box layers.
    Aux,
}

/// A set of trigger outputs observed by external measurement equipment.
///
/// A trigger never influences the bytes a command returns; it only marks
/// *when* things happen. Implementations must perform the pin change before
/// returning, so that the assertion is ordered with respect to the code that
/// follows.
pub trait Trigger {
    /// Drives `line` high.
    fn assert_trigger(&mut self, line: Line);

    /// Drives `line` low.
    fn deassert_trigger(&mut self, line: Line);
}

impl dyn Trigger + '_ {
    /// Runs `f` with `line` asserted for exactly its duration.
    #[inline(never)]
    pub fn window<T>(&mut self, line: Line, f: impl FnOnce() -> T) -> T {
        self.assert_trigger(line);
        let value = f();
        self.deassert_trigger(line);
        value
    }
}

/// A [`Trigger`] connected to nothing.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoTrigger;

impl Trigger for NoTrigger {
    fn assert_trigger(&mut self, _: Line) {}
    fn deassert_trigger(&mut self, _: Line) {}
}

/// Provides access to "chip identity" information.
pub trait Identity {
    /// Returns the factory-programmed 96-bit unique ID, as three words in
    /// register order.
    fn unique_device_identity(&mut self) -> [u32; 3];
}
impl dyn Identity {} // Ensure object-safe.

/// The source of the system clock, numbered as the clock-switch status bits
/// report it.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ClockSource {
    /// The internal RC oscillator.
    Internal = 0,
    /// An external clock fed through the oscillator bypass.
    External = 1,
    /// The PLL, fed from the external oscillator.
    Pll = 2,
}

/// Controls the system clock tree.
pub trait Clock {
    /// Reprograms the PLL to `mhz` and switches the system clock to it.
    fn set_pll(&mut self, mhz: u8);

    /// Switches the system clock to an externally supplied clock, bypassing
    /// the oscillator.
    fn set_bypass(&mut self);

    /// Returns the clock source currently in use.
    fn source(&self) -> ClockSource;
}
impl dyn Clock {} // Ensure object-safe.

/// A small status display.
pub trait Display {
    /// Shows `text` on the screen.
    fn show(&mut self, text: &[u8]);

    /// Clocks raw bytes out over the display's SPI bus.
    fn spi_write(&mut self, bytes: &[u8]);
}
impl dyn Display {} // Ensure object-safe.

#[cfg(test)]
pub(crate) mod fake {
    use super::ClockSource;
    use super::Line;
    use crate::fault::Site;

    /// A single trigger edge.
    #[derive(Copy, Clone, PartialEq, Eq, Debug)]
    pub enum Edge {
        Up(Line),
        Down(Line),
    }

    /// A fake `Trigger` that records every edge.
    #[derive(Default)]
    pub struct Trigger {
        pub edges: Vec<Edge>,
    }

    impl Trigger {
        /// Creates a new `fake::Trigger`.
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns how many complete windows were opened on `line`.
        pub fn windows(&self, line: Line) -> usize {
            self.edges.iter().filter(|&&e| e == Edge::Down(line)).count()
        }

        /// Returns whether `line` is currently held high.
        pub fn is_high(&self, line: Line) -> bool {
            self.edges
                .iter()
                .rev()
                .find(|e| matches!(e, Edge::Up(l) | Edge::Down(l) if *l == line))
                .map(|e| matches!(e, Edge::Up(_)))
                .unwrap_or(false)
        }
    }

    impl super::Trigger for Trigger {
        fn assert_trigger(&mut self, line: Line) {
            self.edges.push(Edge::Up(line));
        }
        fn deassert_trigger(&mut self, line: Line) {
            self.edges.push(Edge::Down(line));
        }
    }

    /// A fake `Identity` that returns a fixed value.
    pub struct Identity {
        uid: [u32; 3],
    }

    impl Identity {
        /// Creates a new `fake::Identity`.
        pub fn new(uid: [u32; 3]) -> Self {
            Self { uid }
        }
    }

    impl super::Identity for Identity {
        fn unique_device_identity(&mut self) -> [u32; 3] {
            self.uid
        }
    }

    /// A fake `Clock` that tracks what it was told.
    pub struct Clock {
        pub mhz: u8,
        pub source: ClockSource,
    }

    impl Clock {
        /// Creates a new `fake::Clock`, running at 168MHz from the PLL.
        pub fn new() -> Self {
            Self {
                mhz: 168,
                source: ClockSource::Pll,
            }
        }
    }

    impl super::Clock for Clock {
        fn set_pll(&mut self, mhz: u8) {
            self.mhz = mhz;
            self.source = ClockSource::Pll;
        }
        fn set_bypass(&mut self) {
            self.mhz = 8;
            self.source = ClockSource::External;
        }
        fn source(&self) -> ClockSource {
            self.source
        }
    }

    /// A fake `Display` that records everything shown on it.
    #[derive(Default)]
    pub struct Display {
        pub lines: Vec<Vec<u8>>,
        pub spi: Vec<u8>,
    }

    impl Display {
        /// Creates a new `fake::Display`.
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl super::Display for Display {
        fn show(&mut self, text: &[u8]) {
            self.lines.push(text.to_vec());
        }
        fn spi_write(&mut self, bytes: &[u8]) {
            self.spi.extend_from_slice(bytes);
        }
    }

    /// A fake fault `Injector` that fires scripted one-shot glitches.
    #[derive(Default)]
    pub struct Injector {
        flips: Vec<(Site, u32)>,
        escapes: Vec<(Site, usize)>,
        polls: Vec<(Site, usize)>,
    }

    impl Injector {
        /// Creates a new `fake::Injector` that does nothing.
        pub fn new() -> Self {
            Self::default()
        }

        /// Arms a glitch that XORs `mask` into the next value seen at
        /// `site`. For buffers, only the first byte is touched.
        pub fn flip(mut self, site: Site, mask: u32) -> Self {
            self.flips.push((site, mask));
            self
        }

        /// Makes the `n`th poll of the loop exit condition at `site`, and
        /// every poll after it, succeed.
        pub fn escape_after(mut self, site: Site, n: usize) -> Self {
            self.escapes.push((site, n));
            self
        }

        fn take(&mut self, site: Site) -> Option<u32> {
            let idx = self.flips.iter().position(|(s, _)| *s == site)?;
            Some(self.flips.remove(idx).1)
        }
    }

    impl crate::fault::Injector for Injector {
        fn glitch_word(&mut self, site: Site, value: &mut u32) {
            if let Some(mask) = self.take(site) {
                *value ^= mask;
            }
        }
        fn glitch_bytes(&mut self, site: Site, bytes: &mut [u8]) {
            if let (Some(mask), Some(first)) = (self.take(site), bytes.first_mut()) {
                *first ^= mask as u8;
            }
        }
        fn escape(&mut self, site: Site) -> bool {
            let polls = match self.polls.iter_mut().find(|(s, _)| *s == site) {
                Some((_, n)) => {
                    *n += 1;
                    *n
                }
                None => {
                    self.polls.push((site, 1));
                    1
                }
            };
            self.escapes
                .iter()
                .any(|&(s, n)| s == site && polls >= n)
        }
    }
}

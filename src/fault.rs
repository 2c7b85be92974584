// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Glitch targets.
//!
//! This module contains the deliberately simple checks that fault-injection
//! campaigns aim at: the boot counter, the password checks, a counting loop,
//! and a loop that should never exit. None of them take a trigger; the
//! caller decides what the trigger window covers.
//!
//! Since a host build cannot be glitched physically, every check consults an
//! [`Injector`] at the points where a real glitch would land. On the board
//! (and in production host builds) this is [`NoFaults`].

use crate::hardware::Display;

/// A point in a glitch target where a fault can be injected.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[non_exhaustive]
pub enum Site {
    /// The boot counter, just before it is compared.
    BootCounter,
    /// The password match counter, just before the first gate.
    PasswordMatches,
    /// The XOR of attempt and password, just before the second gate.
    PasswordXor,
    /// The down-counter of the loop test, once per iteration.
    LoopCounter,
    /// The infinite loop's exit condition.
    InfiniteLoop,
    /// The request loop's exit condition, polled before each request.
    MainLoop,
    /// The first of two redundant computations.
    FirstComputation,
    /// The second of two redundant computations.
    SecondComputation,
}

/// A source of simulated faults.
///
/// All methods default to doing nothing.
pub trait Injector {
    /// Possibly corrupts an integer at `site`.
    fn glitch_word(&mut self, site: Site, value: &mut u32) {
        let _ = (site, value);
    }

    /// Possibly corrupts a buffer at `site`.
    fn glitch_bytes(&mut self, site: Site, bytes: &mut [u8]) {
        let _ = (site, bytes);
    }

    /// Returns whether the loop at `site` should be escaped.
    fn escape(&mut self, site: Site) -> bool {
        let _ = site;
        false
    }
}
impl dyn Injector {} // Ensure object-safe.

/// An [`Injector`] that never injects anything.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoFaults;

impl Injector for NoFaults {}

/// The number of iterations the boot check counts to.
pub const BOOT_LOOP_COUNT: u32 = 168_000;

/// Runs the boot counter loop; returns `true` if the boot was glitched.
pub fn boot_check(faults: &mut dyn Injector) -> bool {
    let mut counter = 0u32;
    while counter < BOOT_LOOP_COUNT {
        counter += 1;
    }
    faults.glitch_word(Site::BootCounter, &mut counter);
    counter != BOOT_LOOP_COUNT
}

/// The outcome of a password check.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Verdict {
    /// The password matched; the session is now authenticated.
    Granted,
    /// The password did not match.
    Denied,
    /// The match counter failed the first gate of a double check.
    DeniedAtFirstGate,
}

impl Verdict {
    /// Returns the status word sent for this verdict.
    pub fn status(self) -> [u8; 2] {
        match self {
            Self::Granted => [0x90, 0x00],
            Self::Denied => [0x69, 0x86],
            Self::DeniedAtFirstGate => [0x69, 0x00],
        }
    }
}

/// Compares `attempt` to `password` byte by byte, with a single gate.
pub fn single_password_check(
    password: &[u8; 4],
    attempt: &[u8; 4],
    faults: &mut dyn Injector,
) -> Verdict {
    let mut matches = 0u32;
    for (a, p) in attempt.iter().zip(password) {
        if a == p {
            matches += 1;
        }
    }
    faults.glitch_word(Site::PasswordMatches, &mut matches);
    if matches == 4 {
        Verdict::Granted
    } else {
        Verdict::Denied
    }
}

/// Compares `attempt` to `password` through two independent gates.
///
/// The first gate counts matching bytes from a non-zero base; the second
/// compares the two passwords as whole words. A glitch must defeat both.
pub fn double_password_check(
    password: &[u8; 4],
    attempt: &[u8; 4],
    faults: &mut dyn Injector,
) -> Verdict {
    let mut matches = 11u32;
    for (a, p) in attempt.iter().zip(password) {
        if a == p {
            matches += 11;
        }
    }
    faults.glitch_word(Site::PasswordMatches, &mut matches);
    if matches != 55 {
        return Verdict::DeniedAtFirstGate;
    }

    spin(24);

    let mut xor = u32::from_ne_bytes(*attempt) ^ u32::from_ne_bytes(*password);
    faults.glitch_word(Site::PasswordXor, &mut xor);
    if xor != 0 {
        Verdict::Denied
    } else {
        Verdict::Granted
    }
}

/// Counts `count` down to zero while counting up, and reports both
/// counters as `A5 rem_hi rem_lo up_hi up_lo A5`.
pub fn loop_test(count: u16, faults: &mut dyn Injector) -> [u8; 6] {
    let mut remaining = count as u32;
    let mut up = 0u32;
    while remaining != 0 {
        remaining -= 1;
        up = up.wrapping_add(1);
        faults.glitch_word(Site::LoopCounter, &mut remaining);
    }
    let [_, _, rem_hi, rem_lo] = remaining.to_be_bytes();
    let [_, _, up_hi, up_lo] = up.to_be_bytes();
    [0xa5, rem_hi, rem_lo, up_hi, up_lo, 0xa5]
}

/// The message sent when [`infinite_loop`] returns.
pub const ESCAPED: [u8; 8] = *b"Glitced!";

/// Blinks a dot on `display` forever, unless glitched out.
pub fn infinite_loop(display: &mut dyn Display, faults: &mut dyn Injector) {
    loop {
        display.show(b".");
        if faults.escape(Site::InfiniteLoop) {
            break;
        }
        display.show(b" ");
        if faults.escape(Site::InfiniteLoop) {
            break;
        }
    }
    info!("escaped the infinite loop");
}

/// Copies a key byte by byte, with a short pause after each byte, so that
/// the copy stands out in a power trace.
pub fn key_copy(key: &[u8; 16]) -> [u8; 16] {
    let mut copy = [0; 16];
    spin(500);
    for (dest, src) in copy.iter_mut().zip(key) {
        *dest = *src;
        spin(10);
    }
    copy
}

fn spin(n: usize) {
    for _ in 0..n {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hardware::fake;

    const PASSWORD: [u8; 4] = [0x02, 0x06, 0x02, 0x08];

    #[test]
    fn clean_boot() {
        assert!(!boot_check(&mut NoFaults));
    }

    #[test]
    fn glitched_boot() {
        let mut faults = fake::Injector::new().flip(Site::BootCounter, 1);
        assert!(boot_check(&mut faults));
    }

    #[test]
    fn single_check() {
        assert_eq!(
            single_password_check(&PASSWORD, &PASSWORD, &mut NoFaults),
            Verdict::Granted
        );
        assert_eq!(
            single_password_check(&PASSWORD, &[2, 6, 2, 9], &mut NoFaults),
            Verdict::Denied
        );

        // Three matches plus one flipped bit is enough to get in.
        let mut faults = fake::Injector::new().flip(Site::PasswordMatches, 0b111);
        assert_eq!(
            single_password_check(&PASSWORD, &[2, 6, 2, 9], &mut faults),
            Verdict::Granted
        );
    }

    #[test]
    fn double_check_gates() {
        assert_eq!(
            double_password_check(&PASSWORD, &PASSWORD, &mut NoFaults),
            Verdict::Granted
        );
        assert_eq!(
            double_password_check(&PASSWORD, &[0; 4], &mut NoFaults),
            Verdict::DeniedAtFirstGate
        );

        // Glitching only the first gate is caught by the second.
        let mut faults = fake::Injector::new().flip(Site::PasswordMatches, 44 ^ 55);
        assert_eq!(
            double_password_check(&PASSWORD, &[2, 6, 2, 9], &mut faults),
            Verdict::Denied
        );
    }

    #[test]
    fn loop_counts() {
        assert_eq!(
            loop_test(0x1234, &mut NoFaults),
            [0xa5, 0x00, 0x00, 0x12, 0x34, 0xa5]
        );

        let mut faults = fake::Injector::new().flip(Site::LoopCounter, 0x1233);
        assert_eq!(
            loop_test(0x1234, &mut faults),
            [0xa5, 0x00, 0x00, 0x00, 0x01, 0xa5]
        );
    }

    #[test]
    fn escape_infinite_loop() {
        let mut display = fake::Display::new();
        let mut faults = fake::Injector::new().escape_after(Site::InfiniteLoop, 3);
        infinite_loop(&mut display, &mut faults);
        assert_eq!(display.lines, vec![b".".to_vec(), b" ".to_vec(), b".".to_vec()]);
    }

    #[test]
    fn copies_keys() {
        let key = *b"0123456789abcdef";
        assert_eq!(key_copy(&key), key);
    }
}

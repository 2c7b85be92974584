// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A host stand-in for the board's TRNG, fed by OS entropy through `ring`.
//!
//! Requires the `std` feature flag to be enabled.

use ring::rand::SecureRandom as _;
use ring::rand::SystemRandom;

use crate::crypto::csrng;
use crate::Result;

/// How many bytes of OS entropy are fetched at once.
const POOL_LEN: usize = 64;

/// A [`csrng::Csrng`] that, like the hardware TRNG, hands out entropy one
/// 32-bit word at a time.
///
/// A request for a length that is not a multiple of four still consumes a
/// whole word for its tail.
pub struct Trng {
    os: SystemRandom,
    pool: [u8; POOL_LEN],
    next: usize,
}

impl Trng {
    /// Creates a new TRNG; no entropy is drawn until it is first used.
    pub fn new() -> Self {
        Self {
            os: SystemRandom::new(),
            pool: [0; POOL_LEN],
            next: POOL_LEN,
        }
    }
}

impl Default for Trng {
    fn default() -> Self {
        Self::new()
    }
}

impl csrng::Csrng for Trng {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), csrng::Error> {
        for chunk in buf.chunks_mut(4) {
            if self.next == POOL_LEN {
                self.os
                    .fill(&mut self.pool)
                    .map_err(|_| fail!(csrng::Error::Unspecified))?;
                self.next = 0;
            }
            chunk.copy_from_slice(&self.pool[self.next..][..chunk.len()]);
            self.next += 4;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::csrng::Csrng;

    #[test]
    fn words_are_fresh() {
        let mut trng = Trng::new();
        let rng: &mut dyn Csrng = &mut trng;

        // Crosses several pool refills.
        let mut words = (0..64).map(|_| rng.next_u32().unwrap()).collect::<Vec<_>>();
        words.sort_unstable();
        words.dedup();
        assert!(words.len() > 60);

        let mut odd = [0; 7];
        rng.fill(&mut odd).unwrap();
        assert_eq!(trng.next % 4, 0);
    }
}

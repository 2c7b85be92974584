// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A seeded, deterministic random number generator.
//!
//! [`Prng`] is AES-128 in counter mode over an all-zero stream: the key is
//! the first half of the seed and the initial counter block the second.
//! Only the low 32-bit word of the counter is incremented (big-endian), so
//! the stream repeats after 2^32 blocks.
//!
//! The ECC command seeds one of these from the host, so that the blinding
//! randomness of a scalar multiplication is reproducible; tests use it
//! wherever a [`Csrng`] is needed.

use crate::cipher::aes;
use crate::crypto::csrng;
use crate::crypto::csrng::Csrng;
use crate::Result;

/// The size of a [`Prng`] seed: a 16-byte key followed by a 16-byte IV.
pub const SEED_LEN: usize = 32;

/// An AES-CTR based deterministic random number generator.
#[derive(Clone)]
pub struct Prng {
    schedule: aes::KeySchedule,
    counter: [u8; aes::BLOCK_LEN],
    block: [u8; aes::BLOCK_LEN],
    used: usize,
}

impl Prng {
    /// Creates a new `Prng` from a key and an initial counter block.
    pub fn new(key: &[u8; aes::KEY_LEN], iv: &[u8; aes::BLOCK_LEN]) -> Self {
        Self {
            schedule: aes::KeySchedule::new(key),
            counter: *iv,
            block: [0; aes::BLOCK_LEN],
            used: aes::BLOCK_LEN,
        }
    }

    /// Creates a new `Prng` from a key-then-IV seed.
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        let mut key = [0; aes::KEY_LEN];
        let mut iv = [0; aes::BLOCK_LEN];
        key.copy_from_slice(&seed[..aes::KEY_LEN]);
        iv.copy_from_slice(&seed[aes::KEY_LEN..]);
        Self::new(&key, &iv)
    }

    fn refill(&mut self) {
        self.block = self.counter;
        self.schedule.encrypt(&mut self.block);
        self.used = 0;

        let mut low = [0; 4];
        low.copy_from_slice(&self.counter[12..]);
        let next = u32::from_be_bytes(low).wrapping_add(1);
        self.counter[12..].copy_from_slice(&next.to_be_bytes());
    }
}

impl Csrng for Prng {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), csrng::Error> {
        for byte in buf {
            if self.used == aes::BLOCK_LEN {
                self.refill();
            }
            *byte = self.block[self.used];
            self.used += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn seed(iv_tail: [u8; 4]) -> [u8; SEED_LEN] {
        let mut seed = [0; SEED_LEN];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }
        seed[28..].copy_from_slice(&iv_tail);
        seed
    }

    #[test]
    fn first_block_is_encrypted_iv() {
        let mut rng = Prng::from_seed(&seed([28, 29, 30, 31]));
        let mut out = [0; 16];
        rng.fill(&mut out).unwrap();
        assert_eq!(
            out,
            [
                0x07, 0xfe, 0xef, 0x74, 0xe1, 0xd5, 0x03, 0x6e, //
                0x90, 0x0e, 0xee, 0x11, 0x8e, 0x94, 0x92, 0x93,
            ]
        );
    }

    #[test]
    fn counter_wraps_low_word() {
        let mut rng = Prng::from_seed(&seed([0xff; 4]));
        let mut out = [0; 32];
        // Split the read to exercise partial blocks.
        rng.fill(&mut out[..5]).unwrap();
        rng.fill(&mut out[5..]).unwrap();
        assert_eq!(
            &out[..],
            &[
                0xd2, 0xec, 0xa9, 0x45, 0x89, 0xad, 0x47, 0xa0, //
                0x68, 0x23, 0x03, 0xf5, 0xb1, 0xd0, 0xe7, 0x77, //
                0x07, 0x4b, 0xce, 0x62, 0xd9, 0x8c, 0xb9, 0x01, //
                0x1c, 0xec, 0x69, 0x58, 0xeb, 0xb4, 0xfc, 0x36,
            ][..]
        );
    }

    #[test]
    fn words_are_big_endian() {
        let mut a = Prng::from_seed(&[9; 32]);
        let mut b = a.clone();
        let mut bytes = [0; 4];
        a.fill(&mut bytes).unwrap();
        let word = (&mut b as &mut dyn Csrng).next_u32().unwrap();
        assert_eq!(word, u32::from_be_bytes(bytes));
    }
}

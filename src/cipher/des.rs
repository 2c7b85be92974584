// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! DES and two- or three-key TDES.
//!
//! The implementation is deliberately textbook: every permutation is a table
//! walk, the key schedule is rotated round by round, and each of the eight
//! S-box lookups of a round is its own step, XORed into the left half as soon
//! as it is computed. That per-S-box granularity is what the countermeasures
//! hook into.

use core::mem;

use crate::cipher::add_dummy;
use crate::cipher::random_delay;
use crate::cipher::Countermeasure;
use crate::cipher::Direction;
use crate::cipher::Error;
use crate::crypto::csrng::Csrng;
use crate::Result;

/// The DES block size, in bytes.
pub const BLOCK_LEN: usize = 8;

/// The DES key size, in bytes. Parity bits are ignored.
pub const KEY_LEN: usize = 8;

/// The TDES key size, in bytes.
pub const TDES_KEY_LEN: usize = 3 * KEY_LEN;

/// How many dummy rounds a [`Countermeasure::DummyRounds`] encryption
/// executes in total.
pub const DUMMY_ROUNDS: usize = 16;

const ROUNDS: usize = 16;

const SHIFTS: [u32; ROUNDS] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

#[rustfmt::skip]
const IP: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10, 2, 60, 52, 44, 36, 28, 20, 12, 4,
    62, 54, 46, 38, 30, 22, 14, 6, 64, 56, 48, 40, 32, 24, 16, 8,
    57, 49, 41, 33, 25, 17,  9, 1, 59, 51, 43, 35, 27, 19, 11, 3,
    61, 53, 45, 37, 29, 21, 13, 5, 63, 55, 47, 39, 31, 23, 15, 7,
];

#[rustfmt::skip]
const FP: [u8; 64] = [
    40, 8, 48, 16, 56, 24, 64, 32, 39, 7, 47, 15, 55, 23, 63, 31,
    38, 6, 46, 14, 54, 22, 62, 30, 37, 5, 45, 13, 53, 21, 61, 29,
    36, 4, 44, 12, 52, 20, 60, 28, 35, 3, 43, 11, 51, 19, 59, 27,
    34, 2, 42, 10, 50, 18, 58, 26, 33, 1, 41,  9, 49, 17, 57, 25,
];

#[rustfmt::skip]
const E: [u8; 48] = [
    32,  1,  2,  3,  4,  5,  4,  5,  6,  7,  8,  9,
     8,  9, 10, 11, 12, 13, 12, 13, 14, 15, 16, 17,
    16, 17, 18, 19, 20, 21, 20, 21, 22, 23, 24, 25,
    24, 25, 26, 27, 28, 29, 28, 29, 30, 31, 32,  1,
];

#[rustfmt::skip]
const P: [u8; 32] = [
    16,  7, 20, 21, 29, 12, 28, 17,  1, 15, 23, 26,  5, 18, 31, 10,
     2,  8, 24, 14, 32, 27,  3,  9, 19, 13, 30,  6, 22, 11,  4, 25,
];

#[rustfmt::skip]
const PC1: [u8; 56] = [
    57, 49, 41, 33, 25, 17,  9,  1, 58, 50, 42, 34, 26, 18,
    10,  2, 59, 51, 43, 35, 27, 19, 11,  3, 60, 52, 44, 36,
    63, 55, 47, 39, 31, 23, 15,  7, 62, 54, 46, 38, 30, 22,
    14,  6, 61, 53, 45, 37, 29, 21, 13,  5, 28, 20, 12,  4,
];

#[rustfmt::skip]
const PC2: [u8; 48] = [
    14, 17, 11, 24,  1,  5,  3, 28, 15,  6, 21, 10,
    23, 19, 12,  4, 26,  8, 16,  7, 27, 20, 13,  2,
    41, 52, 31, 37, 47, 55, 30, 40, 51, 45, 33, 48,
    44, 49, 39, 56, 34, 53, 46, 42, 50, 36, 29, 32,
];

#[rustfmt::skip]
const SBOXES: [[u8; 64]; 8] = [
    [
        14,  4, 13,  1,  2, 15, 11,  8,  3, 10,  6, 12,  5,  9,  0,  7,
         0, 15,  7,  4, 14,  2, 13,  1, 10,  6, 12, 11,  9,  5,  3,  8,
         4,  1, 14,  8, 13,  6,  2, 11, 15, 12,  9,  7,  3, 10,  5,  0,
        15, 12,  8,  2,  4,  9,  1,  7,  5, 11,  3, 14, 10,  0,  6, 13,
    ],
    [
        15,  1,  8, 14,  6, 11,  3,  4,  9,  7,  2, 13, 12,  0,  5, 10,
         3, 13,  4,  7, 15,  2,  8, 14, 12,  0,  1, 10,  6,  9, 11,  5,
         0, 14,  7, 11, 10,  4, 13,  1,  5,  8, 12,  6,  9,  3,  2, 15,
        13,  8, 10,  1,  3, 15,  4,  2, 11,  6,  7, 12,  0,  5, 14,  9,
    ],
    [
        10,  0,  9, 14,  6,  3, 15,  5,  1, 13, 12,  7, 11,  4,  2,  8,
        13,  7,  0,  9,  3,  4,  6, 10,  2,  8,  5, 14, 12, 11, 15,  1,
        13,  6,  4,  9,  8, 15,  3,  0, 11,  1,  2, 12,  5, 10, 14,  7,
         1, 10, 13,  0,  6,  9,  8,  7,  4, 15, 14,  3, 11,  5,  2, 12,
    ],
    [
         7, 13, 14,  3,  0,  6,  9, 10,  1,  2,  8,  5, 11, 12,  4, 15,
        13,  8, 11,  5,  6, 15,  0,  3,  4,  7,  2, 12,  1, 10, 14,  9,
        10,  6,  9,  0, 12, 11,  7, 13, 15,  1,  3, 14,  5,  2,  8,  4,
         3, 15,  0,  6, 10,  1, 13,  8,  9,  4,  5, 11, 12,  7,  2, 14,
    ],
    [
         2, 12,  4,  1,  7, 10, 11,  6,  8,  5,  3, 15, 13,  0, 14,  9,
        14, 11,  2, 12,  4,  7, 13,  1,  5,  0, 15, 10,  3,  9,  8,  6,
         4,  2,  1, 11, 10, 13,  7,  8, 15,  9, 12,  5,  6,  3,  0, 14,
        11,  8, 12,  7,  1, 14,  2, 13,  6, 15,  0,  9, 10,  4,  5,  3,
    ],
    [
        12,  1, 10, 15,  9,  2,  6,  8,  0, 13,  3,  4, 14,  7,  5, 11,
        10, 15,  4,  2,  7, 12,  9,  5,  6,  1, 13, 14,  0, 11,  3,  8,
         9, 14, 15,  5,  2,  8, 12,  3,  7,  0,  4, 10,  1, 13, 11,  6,
         4,  3,  2, 12,  9,  5, 15, 10, 11, 14,  1,  7,  6,  0,  8, 13,
    ],
    [
         4, 11,  2, 14, 15,  0,  8, 13,  3, 12,  9,  7,  5, 10,  6,  1,
        13,  0, 11,  7,  4,  9,  1, 10, 14,  3,  5, 12,  2, 15,  8,  6,
         1,  4, 11, 13, 12,  3,  7, 14, 10, 15,  6,  8,  0,  5,  9,  2,
         6, 11, 13,  8,  1,  4, 10,  7,  9,  5,  0, 15, 14,  2,  3, 12,
    ],
    [
        13,  2,  8,  4,  6, 15, 11,  1, 10,  9,  3, 14,  5,  0, 12,  7,
         1, 15, 13,  8, 10,  3,  7,  4, 12,  5,  6, 11,  0, 14,  9,  2,
         7, 11,  4,  1,  9, 12, 14,  2,  0,  6, 10, 13, 15,  3,  5,  8,
         2,  1, 14,  7,  4, 10,  8, 13, 15, 12,  9,  0,  3,  5,  6, 11,
    ],
];

const IN_ORDER: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Applies a DES-style bit permutation to the low `width` bits of `input`.
///
/// `table` lists, for every output bit from most to least significant, the
/// 1-based position of the input bit it is taken from, counting from the
/// most significant end.
fn permute(input: u64, width: u32, table: &[u8]) -> u64 {
    table.iter().fold(0, |acc, &pos| {
        (acc << 1) | ((input >> (width - pos as u32)) & 1)
    })
}

const HALF_KEY_MASK: u32 = (1 << 28) - 1;

/// The rotating C/D registers of the key schedule.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
struct KeyRegisters {
    c: u32,
    d: u32,
}

impl KeyRegisters {
    fn new(key: &[u8; KEY_LEN]) -> Self {
        let bits = permute(u64::from_be_bytes(*key), 64, &PC1);
        Self {
            c: (bits >> 28) as u32 & HALF_KEY_MASK,
            d: bits as u32 & HALF_KEY_MASK,
        }
    }

    fn rotate_left(&mut self, n: u32) {
        let rot = |x: u32| ((x << n) | (x >> (28 - n))) & HALF_KEY_MASK;
        self.c = rot(self.c);
        self.d = rot(self.d);
    }

    fn rotate_right(&mut self, n: u32) {
        let rot = |x: u32| ((x >> n) | (x << (28 - n))) & HALF_KEY_MASK;
        self.c = rot(self.c);
        self.d = rot(self.d);
    }

    fn subkey(&self) -> u64 {
        permute(((self.c as u64) << 28) | self.d as u64, 56, &PC2)
    }

    /// Produces the subkey for round `round`, in the order `direction`
    /// consumes them.
    fn next(&mut self, round: usize, direction: Direction) -> u64 {
        match direction {
            Direction::Encrypt => {
                self.rotate_left(SHIFTS[round]);
                self.subkey()
            }
            Direction::Decrypt => {
                let subkey = self.subkey();
                self.rotate_right(SHIFTS[ROUNDS - 1 - round]);
                subkey
            }
        }
    }
}

/// The two Feistel halves.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
struct Halves {
    l: u32,
    r: u32,
}

impl Halves {
    fn load(block: &[u8; BLOCK_LEN]) -> Self {
        let bits = permute(u64::from_be_bytes(*block), 64, &IP);
        Self {
            l: (bits >> 32) as u32,
            r: bits as u32,
        }
    }

    fn store(self, block: &mut [u8; BLOCK_LEN]) {
        // The last round's swap is undone by reading R before L.
        let bits = ((self.r as u64) << 32) | self.l as u64;
        *block = permute(bits, 64, &FP).to_be_bytes();
    }

    /// Runs one Feistel round, visiting the S-boxes in `order`.
    fn round(&mut self, subkey: u64, order: &[usize; 8]) {
        let x = permute(self.r as u64, 32, &E) ^ subkey;
        for &i in order {
            self.l ^= sbox_output(x, i);
        }
        mem::swap(&mut self.l, &mut self.r);
    }

    /// Runs one Feistel round in natural S-box order, calling `before_sbox`
    /// ahead of each lookup.
    fn hooked_round(
        &mut self,
        subkey: u64,
        mut before_sbox: impl FnMut() -> Result<(), Error>,
    ) -> Result<(), Error> {
        let x = permute(self.r as u64, 32, &E) ^ subkey;
        for &i in &IN_ORDER {
            before_sbox()?;
            self.l ^= sbox_output(x, i);
        }
        mem::swap(&mut self.l, &mut self.r);
        Ok(())
    }
}

/// Computes the contribution of S-box `i` to the output of the round
/// function, already passed through the P permutation.
fn sbox_output(x: u64, i: usize) -> u32 {
    let six = ((x >> (42 - 6 * i)) & 0x3f) as usize;
    let row = ((six & 0x20) >> 4) | (six & 1);
    let col = (six >> 1) & 0xf;
    let s = SBOXES[i][row * 16 + col] as u64;
    permute(s << (28 - 4 * i), 32, &P) as u32
}

/// Scratch state for dummy rounds.
///
/// Dummy rounds run the real round function on this state, which is never
/// mixed into a result. It persists across invocations, so that successive
/// dummy rounds do not repeat.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct DummyState {
    keys: KeyRegisters,
    halves: Halves,
}

impl DummyState {
    fn round(&mut self, round: usize) {
        self.keys.rotate_left(SHIFTS[round % ROUNDS]);
        let subkey = self.keys.subkey();
        self.halves.round(subkey, &IN_ORDER);
    }
}

fn crypt_baseline(
    key: &[u8; KEY_LEN],
    block: &mut [u8; BLOCK_LEN],
    direction: Direction,
) {
    let mut keys = KeyRegisters::new(key);
    let mut halves = Halves::load(block);
    for round in 0..ROUNDS {
        let subkey = keys.next(round, direction);
        halves.round(subkey, &IN_ORDER);
    }
    halves.store(block);
}

/// Encrypts one block with DES.
pub fn encrypt(key: &[u8; KEY_LEN], block: &mut [u8; BLOCK_LEN]) {
    crypt_baseline(key, block, Direction::Encrypt)
}

/// Decrypts one block with DES.
pub fn decrypt(key: &[u8; KEY_LEN], block: &mut [u8; BLOCK_LEN]) {
    crypt_baseline(key, block, Direction::Decrypt)
}

/// Runs DES in `direction`.
pub fn crypt(
    key: &[u8; KEY_LEN],
    block: &mut [u8; BLOCK_LEN],
    direction: Direction,
) {
    crypt_baseline(key, block, direction)
}

/// Encrypts one block with DES, following `countermeasure`.
///
/// `dummy` is only touched by [`Countermeasure::DummyRounds`].
/// [`Countermeasure::Masked`] is not available for DES.
pub fn encrypt_with(
    key: &[u8; KEY_LEN],
    block: &mut [u8; BLOCK_LEN],
    countermeasure: Countermeasure,
    rng: &mut dyn Csrng,
    dummy: &mut DummyState,
) -> Result<(), Error> {
    let mut keys = KeyRegisters::new(key);
    let mut halves = Halves::load(block);
    match countermeasure {
        Countermeasure::Baseline => {
            encrypt(key, block);
            return Ok(());
        }
        Countermeasure::Misaligned => {
            random_delay(rng, 3)?;
            encrypt(key, block);
            return Ok(());
        }
        Countermeasure::RandomDelays => {
            for round in 0..ROUNDS {
                let subkey = keys.next(round, Direction::Encrypt);
                halves.hooked_round(subkey, || random_delay(rng, 2))?;
            }
        }
        Countermeasure::RandomSboxOrder => {
            // The starting point is drawn once; every round then walks all
            // eight boxes from the one after it.
            let start = rng.next_u32()? as usize & 7;
            let mut order = [0; 8];
            for (n, slot) in order.iter_mut().enumerate() {
                *slot = (start + 1 + n) & 7;
            }
            for round in 0..ROUNDS {
                let subkey = keys.next(round, Direction::Encrypt);
                halves.round(subkey, &order);
            }
        }
        Countermeasure::DummyRounds => {
            let mut remaining = DUMMY_ROUNDS;
            let mut round = 0;
            while round < ROUNDS {
                if add_dummy(rng, remaining)? {
                    dummy.round(round);
                    remaining -= 1;
                } else {
                    let subkey = keys.next(round, Direction::Encrypt);
                    halves.round(subkey, &IN_ORDER);
                    round += 1;
                }
            }
            for _ in 0..remaining {
                dummy.round(round);
            }
        }
        Countermeasure::Masked => return Err(fail!(Error::Unsupported)),
    }
    halves.store(block);
    Ok(())
}

fn split_tdes_key(key: &[u8; TDES_KEY_LEN]) -> [[u8; KEY_LEN]; 3] {
    let mut thirds = [[0; KEY_LEN]; 3];
    for (third, chunk) in thirds.iter_mut().zip(key.chunks_exact(KEY_LEN)) {
        third.copy_from_slice(chunk);
    }
    thirds
}

/// Encrypts one block with TDES: encrypt with the first key third, decrypt
/// with the second, encrypt with the third.
pub fn tdes_encrypt(key: &[u8; TDES_KEY_LEN], block: &mut [u8; BLOCK_LEN]) {
    let [k1, k2, k3] = split_tdes_key(key);
    encrypt(&k1, block);
    decrypt(&k2, block);
    encrypt(&k3, block);
}

/// Decrypts one block with TDES, undoing [`tdes_encrypt()`].
pub fn tdes_decrypt(key: &[u8; TDES_KEY_LEN], block: &mut [u8; BLOCK_LEN]) {
    let [k1, k2, k3] = split_tdes_key(key);
    decrypt(&k3, block);
    encrypt(&k2, block);
    decrypt(&k1, block);
}

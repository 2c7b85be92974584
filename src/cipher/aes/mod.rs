// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Byte-oriented AES-128.
//!
//! This is the textbook cipher: a byte-wise state in column-major order,
//! table-based SubBytes, and explicit ShiftRows/MixColumns. The functions
//! in this module are also the building blocks of the [`masked`] path.
//!
//! A second, independent implementation built from 32-bit lookup tables
//! lives in [`ttable`].

use crate::cipher::add_dummy;
use crate::cipher::random_delay;
use crate::cipher::Countermeasure;
use crate::cipher::Error;
use crate::crypto::csrng::Csrng;
use crate::hardware::Line;
use crate::hardware::Trigger;
use crate::Result;

pub mod masked;
pub mod ttable;

/// The AES block size, in bytes.
pub const BLOCK_LEN: usize = 16;

/// The AES-128 key size, in bytes.
pub const KEY_LEN: usize = 16;

/// The number of AES-128 rounds.
pub const ROUNDS: usize = 10;

/// How many dummy rounds a [`Countermeasure::DummyRounds`] encryption
/// executes in total.
pub const DUMMY_ROUNDS: usize = 10;

/// A 16-byte AES state; byte `row + 4 * col` holds that cell.
pub type State = [u8; BLOCK_LEN];

#[rustfmt::skip]
pub(crate) const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

pub(crate) const INV_SBOX: [u8; 256] = invert(&SBOX);

const RCON: [u8; ROUNDS] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

const fn invert(sbox: &[u8; 256]) -> [u8; 256] {
    let mut inv = [0; 256];
    let mut i = 0;
    while i < 256 {
        inv[sbox[i] as usize] = i as u8;
        i += 1;
    }
    inv
}

/// Multiplies by `x` in GF(2^8).
pub(crate) const fn xtime(x: u8) -> u8 {
    (x << 1) ^ (((x >> 7) & 1) * 0x1b)
}

/// Multiplies two elements of GF(2^8).
pub(crate) const fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        a = xtime(a);
        b >>= 1;
    }
    product
}

pub(crate) fn add_round_key(state: &mut State, round_key: &State) {
    for (s, k) in state.iter_mut().zip(round_key) {
        *s ^= k;
    }
}

pub(crate) fn sub_bytes(state: &mut State, sbox: &[u8; 256]) {
    for s in state.iter_mut() {
        *s = sbox[*s as usize];
    }
}

pub(crate) fn shift_rows(state: &mut State) {
    let old = *state;
    for row in 1..4 {
        for col in 0..4 {
            state[row + 4 * col] = old[row + 4 * ((col + row) % 4)];
        }
    }
}

pub(crate) fn inv_shift_rows(state: &mut State) {
    let old = *state;
    for row in 1..4 {
        for col in 0..4 {
            state[row + 4 * ((col + row) % 4)] = old[row + 4 * col];
        }
    }
}

pub(crate) fn mix_columns(state: &mut State) {
    for col in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        let all = a0 ^ a1 ^ a2 ^ a3;
        col[0] ^= all ^ xtime(a0 ^ a1);
        col[1] ^= all ^ xtime(a1 ^ a2);
        col[2] ^= all ^ xtime(a2 ^ a3);
        col[3] ^= all ^ xtime(a3 ^ a0);
    }
}

pub(crate) fn inv_mix_columns(state: &mut State) {
    for col in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        col[0] = gmul(a0, 14) ^ gmul(a1, 11) ^ gmul(a2, 13) ^ gmul(a3, 9);
        col[1] = gmul(a0, 9) ^ gmul(a1, 14) ^ gmul(a2, 11) ^ gmul(a3, 13);
        col[2] = gmul(a0, 13) ^ gmul(a1, 9) ^ gmul(a2, 14) ^ gmul(a3, 11);
        col[3] = gmul(a0, 11) ^ gmul(a1, 13) ^ gmul(a2, 9) ^ gmul(a3, 14);
    }
}

/// Advances `round_key` in place from round `round - 1` to round `round`.
pub(crate) fn next_round_key(round_key: &mut State, round: usize) {
    round_key[0] ^= SBOX[round_key[13] as usize] ^ RCON[round - 1];
    round_key[1] ^= SBOX[round_key[14] as usize];
    round_key[2] ^= SBOX[round_key[15] as usize];
    round_key[3] ^= SBOX[round_key[12] as usize];
    for i in 4..BLOCK_LEN {
        round_key[i] ^= round_key[i - 4];
    }
}

/// Rewinds `round_key` in place from round `round + 1` to round `round`.
pub(crate) fn prev_round_key(round_key: &mut State, round: usize) {
    for i in (4..BLOCK_LEN).rev() {
        round_key[i] ^= round_key[i - 4];
    }
    round_key[0] ^= SBOX[round_key[13] as usize] ^ RCON[round];
    round_key[1] ^= SBOX[round_key[14] as usize];
    round_key[2] ^= SBOX[round_key[15] as usize];
    round_key[3] ^= SBOX[round_key[12] as usize];
}

/// An expanded AES-128 key.
#[derive(Clone)]
pub struct KeySchedule {
    round_keys: [State; ROUNDS + 1],
}

impl KeySchedule {
    /// Expands `key`.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let mut round_keys = [[0; BLOCK_LEN]; ROUNDS + 1];
        round_keys[0] = *key;
        for round in 1..=ROUNDS {
            let mut next = round_keys[round - 1];
            next_round_key(&mut next, round);
            round_keys[round] = next;
        }
        Self { round_keys }
    }

    /// Returns the key for `round`.
    pub fn round_key(&self, round: usize) -> &State {
        &self.round_keys[round]
    }

    fn round(&self, state: &mut State, round: usize) {
        sub_bytes(state, &SBOX);
        shift_rows(state);
        if round < ROUNDS {
            mix_columns(state);
        }
        add_round_key(state, &self.round_keys[round]);
    }

    /// Encrypts one block.
    pub fn encrypt(&self, block: &mut State) {
        add_round_key(block, &self.round_keys[0]);
        for round in 1..=ROUNDS {
            self.round(block, round);
        }
    }

    /// Decrypts one block.
    pub fn decrypt(&self, block: &mut State) {
        add_round_key(block, &self.round_keys[ROUNDS]);
        for round in (0..ROUNDS).rev() {
            inv_shift_rows(block);
            sub_bytes(block, &INV_SBOX);
            add_round_key(block, &self.round_keys[round]);
            if round > 0 {
                inv_mix_columns(block);
            }
        }
    }

    /// Encrypts one block, interleaving its rounds with up to
    /// [`DUMMY_ROUNDS`] rounds on a throwaway state.
    fn encrypt_with_dummies(
        &self,
        block: &mut State,
        rng: &mut dyn Csrng,
    ) -> Result<(), Error> {
        let mut scratch = [0; BLOCK_LEN];
        let mut remaining = DUMMY_ROUNDS;

        add_round_key(block, &self.round_keys[0]);
        let mut round = 1;
        while round <= ROUNDS {
            if add_dummy(rng, remaining)? {
                self.round(&mut scratch, round.min(ROUNDS - 1));
                remaining -= 1;
            } else {
                self.round(block, round);
                round += 1;
            }
        }
        for _ in 0..remaining {
            self.round(&mut scratch, ROUNDS);
        }
        Ok(())
    }
}

/// Encrypts one block with AES-128, without any instrumentation.
pub fn encrypt(key: &[u8; KEY_LEN], block: &mut State) {
    KeySchedule::new(key).encrypt(block)
}

/// Decrypts one block with AES-128, without any instrumentation.
pub fn decrypt(key: &[u8; KEY_LEN], block: &mut State) {
    KeySchedule::new(key).decrypt(block)
}

/// Runs SubBytes on `state`, starting at a rotated cell and optionally
/// waiting a random delay before each lookup.
fn sub_bytes_shuffled(
    state: &mut State,
    row_offset: usize,
    col_offset: usize,
    delays: bool,
    rng: &mut dyn Csrng,
) -> Result<(), Error> {
    for i in 0..4 {
        for j in 0..4 {
            if delays {
                random_delay(rng, 2)?;
            }
            let cell = ((i + row_offset) & 3) + 4 * ((j + col_offset) & 3);
            state[cell] = SBOX[state[cell] as usize];
        }
    }
    Ok(())
}

/// Encrypts with an on-the-fly key schedule, optionally delaying or
/// shuffling every S-box layer.
///
/// The auxiliary trigger brackets the S-box layers of rounds 1 to 9.
fn encrypt_hardened(
    key: &[u8; KEY_LEN],
    block: &mut State,
    countermeasure: Countermeasure,
    trigger: &mut dyn Trigger,
    rng: &mut dyn Csrng,
) -> Result<(), Error> {
    let delays = countermeasure == Countermeasure::RandomDelays;
    let shuffle = countermeasure == Countermeasure::RandomSboxOrder;
    let (mut row_offset, mut col_offset) = (0, 0);

    let mut round_key = *key;
    add_round_key(block, &round_key);
    for round in 1..ROUNDS {
        if shuffle {
            let rnd = rng.next_u32()? as usize;
            col_offset = rnd & 3;
            row_offset = (rnd >> 2) & 3;
        }

        trigger.assert_trigger(Line::Aux);
        let result =
            sub_bytes_shuffled(block, row_offset, col_offset, delays, rng);
        trigger.deassert_trigger(Line::Aux);
        result?;

        shift_rows(block);
        mix_columns(block);
        next_round_key(&mut round_key, round);
        add_round_key(block, &round_key);
    }

    // The last round keeps whatever offsets the ninth one used.
    sub_bytes_shuffled(block, row_offset, col_offset, delays, rng)?;
    shift_rows(block);
    next_round_key(&mut round_key, ROUNDS);
    add_round_key(block, &round_key);
    Ok(())
}

/// Encrypts one block with AES-128, following `countermeasure`.
///
/// Where the main trigger window opens depends on the countermeasure:
/// - [`Countermeasure::Baseline`], [`Countermeasure::Misaligned`], and
///   [`Countermeasure::DummyRounds`] expand the key first, and bracket only
///   the cipher itself.
/// - [`Countermeasure::RandomDelays`], [`Countermeasure::RandomSboxOrder`],
///   and [`Countermeasure::Masked`] expand the key on the fly, and so
///   bracket the whole operation, including mask generation.
pub fn encrypt_with(
    key: &[u8; KEY_LEN],
    block: &mut State,
    countermeasure: Countermeasure,
    trigger: &mut dyn Trigger,
    rng: &mut dyn Csrng,
) -> Result<(), Error> {
    match countermeasure {
        Countermeasure::Baseline => {
            let schedule = KeySchedule::new(key);
            trigger.window(Line::Main, || schedule.encrypt(block));
            Ok(())
        }
        Countermeasure::Misaligned => {
            let schedule = KeySchedule::new(key);
            trigger.window(Line::Main, || -> Result<(), Error> {
                random_delay(rng, 3)?;
                schedule.encrypt(block);
                Ok(())
            })
        }
        Countermeasure::DummyRounds => {
            let schedule = KeySchedule::new(key);
            trigger.window(Line::Main, || schedule.encrypt_with_dummies(block, rng))
        }
        Countermeasure::RandomDelays | Countermeasure::RandomSboxOrder => {
            trigger.assert_trigger(Line::Main);
            let result =
                encrypt_hardened(key, block, countermeasure, trigger, rng);
            trigger.deassert_trigger(Line::Main);
            result
        }
        Countermeasure::Masked => {
            trigger.window(Line::Main, || masked::encrypt(key, block, rng))
        }
    }
}

/// Decrypts one block with AES-128, following `countermeasure`.
///
/// Only [`Countermeasure::Baseline`] (which expands the key outside the
/// trigger window) and [`Countermeasure::Masked`] are available.
pub fn decrypt_with(
    key: &[u8; KEY_LEN],
    block: &mut State,
    countermeasure: Countermeasure,
    trigger: &mut dyn Trigger,
    rng: &mut dyn Csrng,
) -> Result<(), Error> {
    match countermeasure {
        Countermeasure::Baseline => {
            let schedule = KeySchedule::new(key);
            trigger.window(Line::Main, || schedule.decrypt(block));
            Ok(())
        }
        Countermeasure::Masked => {
            trigger.window(Line::Main, || masked::decrypt(key, block, rng))
        }
        _ => Err(fail!(Error::Unsupported)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::prng::Prng;
    use crate::hardware::fake;

    pub(crate) const KEY: [u8; 16] = [
        0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, //
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    ];
    pub(crate) const PLAINTEXT: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, //
        0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
    ];
    pub(crate) const CIPHERTEXT: [u8; 16] = [
        0x4a, 0x4d, 0xfa, 0x24, 0x31, 0x27, 0x91, 0x23, //
        0x94, 0x95, 0xdd, 0x28, 0xca, 0x73, 0x31, 0xcf,
    ];

    #[test]
    fn fips197() {
        let key = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, //
            0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
        ];
        let mut block = PLAINTEXT;
        encrypt(&key, &mut block);
        assert_eq!(
            block,
            [
                0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, //
                0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5, 0x5a,
            ]
        );
        decrypt(&key, &mut block);
        assert_eq!(block, PLAINTEXT);
    }

    #[test]
    fn default_key() {
        let mut block = PLAINTEXT;
        encrypt(&KEY, &mut block);
        assert_eq!(block, CIPHERTEXT);

        let mut block = PLAINTEXT;
        decrypt(&KEY, &mut block);
        assert_eq!(
            block,
            [
                0x59, 0x48, 0x7d, 0xc3, 0xc9, 0xe3, 0x1d, 0xe8, //
                0xd4, 0x3f, 0x95, 0x35, 0x72, 0xf5, 0x16, 0x76,
            ]
        );
    }

    #[test]
    fn key_schedule_rewinds() {
        let schedule = KeySchedule::new(&KEY);
        let mut round_key = *schedule.round_key(ROUNDS);
        for round in (0..ROUNDS).rev() {
            prev_round_key(&mut round_key, round);
            assert_eq!(&round_key, schedule.round_key(round));
        }
    }

    #[test]
    fn countermeasures_match_baseline() {
        let mut rng = Prng::from_seed(&[0x42; 32]);
        for &cm in &[
            Countermeasure::Baseline,
            Countermeasure::Misaligned,
            Countermeasure::DummyRounds,
            Countermeasure::RandomDelays,
            Countermeasure::RandomSboxOrder,
        ] {
            for _ in 0..8 {
                let mut trigger = fake::Trigger::new();
                let mut block = PLAINTEXT;
                encrypt_with(&KEY, &mut block, cm, &mut trigger, &mut rng)
                    .unwrap();
                assert_eq!(block, CIPHERTEXT, "countermeasure: {:?}", cm);
                assert_eq!(trigger.windows(Line::Main), 1);
                assert!(!trigger.is_high(Line::Main));
            }
        }
    }

    #[test]
    fn hardened_paths_mark_sbox_layers() {
        let mut rng = Prng::from_seed(&[7; 32]);
        let mut trigger = fake::Trigger::new();
        let mut block = PLAINTEXT;
        encrypt_with(
            &KEY,
            &mut block,
            Countermeasure::RandomSboxOrder,
            &mut trigger,
            &mut rng,
        )
        .unwrap();
        assert_eq!(trigger.windows(Line::Aux), ROUNDS - 1);
        assert_eq!(
            trigger.edges.first(),
            Some(&fake::Edge::Up(Line::Main))
        );
        assert_eq!(
            trigger.edges.last(),
            Some(&fake::Edge::Down(Line::Main))
        );
    }

    #[test]
    fn unsupported_decryptions() {
        let mut rng = Prng::from_seed(&[0; 32]);
        let mut trigger = fake::Trigger::new();
        let mut block = PLAINTEXT;
        let result = decrypt_with(
            &KEY,
            &mut block,
            Countermeasure::DummyRounds,
            &mut trigger,
            &mut rng,
        );
        assert_eq!(result.map_err(|e| e.into_inner()), Err(Error::Unsupported));
        assert!(trigger.edges.is_empty());
    }
}

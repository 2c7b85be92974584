// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! AES-256 with a cached key schedule.
//!
//! Unlike the other ciphers, which expand their key on every call, an
//! [`Aes256`] is expanded once, when its key is set, and then reused for
//! every block.

use crate::cipher::aes::add_round_key;
use crate::cipher::aes::inv_mix_columns;
use crate::cipher::aes::inv_shift_rows;
use crate::cipher::aes::mix_columns;
use crate::cipher::aes::shift_rows;
use crate::cipher::aes::sub_bytes;
use crate::cipher::aes::xtime;
use crate::cipher::aes::State;
use crate::cipher::aes::BLOCK_LEN;
use crate::cipher::aes::INV_SBOX;
use crate::cipher::aes::SBOX;

/// The AES-256 key size, in bytes.
pub const KEY_LEN: usize = 32;

/// The number of AES-256 rounds.
pub const ROUNDS: usize = 14;

/// An expanded AES-256 key.
#[derive(Clone)]
pub struct Aes256 {
    key: [u8; KEY_LEN],
    round_keys: [State; ROUNDS + 1],
}

impl Aes256 {
    /// Expands `key`.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let mut words = [[0u8; 4]; 4 * (ROUNDS + 1)];
        for (word, chunk) in words.iter_mut().zip(key.chunks_exact(4)) {
            word.copy_from_slice(chunk);
        }

        let mut rcon = 1u8;
        for i in 8..words.len() {
            let mut temp = words[i - 1];
            if i % 8 == 0 {
                temp.rotate_left(1);
                for b in &mut temp {
                    *b = SBOX[*b as usize];
                }
                temp[0] ^= rcon;
                rcon = xtime(rcon);
            } else if i % 8 == 4 {
                for b in &mut temp {
                    *b = SBOX[*b as usize];
                }
            }
            for (j, b) in temp.iter().enumerate() {
                words[i][j] = words[i - 8][j] ^ b;
            }
        }

        let mut round_keys = [[0; BLOCK_LEN]; ROUNDS + 1];
        for (round_key, chunk) in round_keys.iter_mut().zip(words.chunks_exact(4)) {
            for (dest, word) in round_key.chunks_exact_mut(4).zip(chunk) {
                dest.copy_from_slice(word);
            }
        }

        Self {
            key: *key,
            round_keys,
        }
    }

    /// Returns the key this schedule was expanded from.
    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// Encrypts one block.
    pub fn encrypt(&self, block: &mut State) {
        add_round_key(block, &self.round_keys[0]);
        for round in 1..=ROUNDS {
            sub_bytes(block, &SBOX);
            shift_rows(block);
            if round < ROUNDS {
                mix_columns(block);
            }
            add_round_key(block, &self.round_keys[round]);
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
}

#[cfg(test)]
mod test {
    use super::*;

    const PLAINTEXT: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, //
        0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
    ];

    #[test]
    fn fips197() {
        let mut key = [0; 32];
        for (i, k) in key.iter_mut().enumerate() {
            *k = i as u8;
        }
        let aes = Aes256::new(&key);
        let mut block = PLAINTEXT;
        aes.encrypt(&mut block);
        assert_eq!(
            block,
            [
                0x8e, 0xa2, 0xb7, 0xca, 0x51, 0x67, 0x45, 0xbf, //
                0xea, 0xfc, 0x49, 0x90, 0x4b, 0x49, 0x60, 0x89,
            ]
        );
        aes.decrypt(&mut block);
        assert_eq!(block, PLAINTEXT);
    }

    #[test]
    fn default_key() {
        let key = [
            0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, //
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, //
            0xda, 0xba, 0xda, 0xba, 0xd0, 0x00, 0x00, 0xc0, //
            0x00, 0x01, 0xc0, 0xff, 0xee, 0x55, 0xde, 0xad,
        ];
        let aes = Aes256::new(&key);
        assert_eq!(aes.key(), &key);

        let mut block = PLAINTEXT;
        aes.encrypt(&mut block);
        assert_eq!(
            block,
            [
                0xc0, 0x04, 0x5c, 0x20, 0x97, 0x99, 0x1e, 0xd0, //
                0xef, 0xd9, 0x2c, 0x7d, 0x9d, 0x11, 0xc7, 0x56,
            ]
        );

        let mut block = PLAINTEXT;
        aes.decrypt(&mut block);
        assert_eq!(
            block,
            [
                0xc0, 0x01, 0x48, 0x1f, 0x3d, 0x98, 0xfd, 0x64, //
                0x27, 0x85, 0x82, 0x6e, 0xed, 0xa5, 0x13, 0x14,
            ]
        );
    }
}

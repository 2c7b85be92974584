// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! AES-128 built from 32-bit round tables.
//!
//! This implementation shares nothing with the byte-oriented cipher except
//! the S-box, and so can be used to cross-check it. Decryption uses the
//! equivalent inverse cipher, with InvMixColumns folded into the round keys.

use crate::cipher::aes::gmul;
use crate::cipher::aes::State;
use crate::cipher::aes::INV_SBOX;
use crate::cipher::aes::KEY_LEN;
use crate::cipher::aes::xtime;
use crate::cipher::aes::ROUNDS;
use crate::cipher::aes::SBOX;

const WORDS: usize = 4 * (ROUNDS + 1);

const fn round_tables(sbox: &[u8; 256], coeffs: [u8; 4]) -> [[u32; 256]; 4] {
    let mut tables = [[0; 256]; 4];
    let mut i = 0;
    while i < 256 {
        let s = sbox[i];
        let word = (gmul(s, coeffs[0]) as u32) << 24
            | (gmul(s, coeffs[1]) as u32) << 16
            | (gmul(s, coeffs[2]) as u32) << 8
            | gmul(s, coeffs[3]) as u32;
        tables[0][i] = word;
        tables[1][i] = word.rotate_right(8);
        tables[2][i] = word.rotate_right(16);
        tables[3][i] = word.rotate_right(24);
        i += 1;
    }
    tables
}

const TE: [[u32; 256]; 4] = round_tables(&SBOX, [2, 1, 1, 3]);
const TD: [[u32; 256]; 4] = round_tables(&INV_SBOX, [14, 9, 13, 11]);

fn byte(word: u32, n: u32) -> usize {
    (word >> (24 - 8 * n)) as usize & 0xff
}

fn sub_word(word: u32) -> u32 {
    u32::from_be_bytes([
        SBOX[byte(word, 0)],
        SBOX[byte(word, 1)],
        SBOX[byte(word, 2)],
        SBOX[byte(word, 3)],
    ])
}

fn load(block: &State) -> [u32; 4] {
    let mut s = [0; 4];
    for (word, chunk) in s.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    s
}

fn store(s: [u32; 4], block: &mut State) {
    for (word, chunk) in s.iter().zip(block.chunks_exact_mut(4)) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
}

fn expand(key: &[u8; KEY_LEN]) -> [u32; WORDS] {
    let mut w = [0; WORDS];
    w[..4].copy_from_slice(&load(key));

    let mut rcon = 1u8;
    for i in 4..WORDS {
        let mut temp = w[i - 1];
        if i % 4 == 0 {
            temp = sub_word(temp.rotate_left(8)) ^ (rcon as u32) << 24;
            rcon = xtime(rcon);
        }
        w[i] = w[i - 4] ^ temp;
    }
    w
}

/// An AES-128 key, expanded for T-table encryption.
pub struct EncryptKey {
    rk: [u32; WORDS],
}

impl EncryptKey {
    /// Expands `key`.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self { rk: expand(key) }
    }

    /// Encrypts one block.
    pub fn encrypt(&self, block: &mut State) {
        let mut s = load(block);
        for (word, rk) in s.iter_mut().zip(&self.rk[..4]) {
            *word ^= rk;
        }

        for round in 1..ROUNDS {
            let rk = &self.rk[4 * round..4 * round + 4];
            let mut t = [0; 4];
            for i in 0..4 {
                t[i] = TE[0][byte(s[i], 0)]
                    ^ TE[1][byte(s[(i + 1) % 4], 1)]
                    ^ TE[2][byte(s[(i + 2) % 4], 2)]
                    ^ TE[3][byte(s[(i + 3) % 4], 3)]
                    ^ rk[i];
            }
            s = t;
        }

        let rk = &self.rk[4 * ROUNDS..];
        let mut t = [0; 4];
        for i in 0..4 {
            t[i] = u32::from_be_bytes([
                SBOX[byte(s[i], 0)],
                SBOX[byte(s[(i + 1) % 4], 1)],
                SBOX[byte(s[(i + 2) % 4], 2)],
                SBOX[byte(s[(i + 3) % 4], 3)],
            ]) ^ rk[i];
        }
        store(t, block);
    }
}

/// An AES-128 key, expanded for T-table decryption.
pub struct DecryptKey {
    rk: [u32; WORDS],
}

impl DecryptKey {
    /// Expands `key` and converts it for the equivalent inverse cipher.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        let enc = expand(key);
        let mut rk = [0; WORDS];
        for round in 0..=ROUNDS {
            let from = 4 * (ROUNDS - round);
            rk[4 * round..4 * round + 4].copy_from_slice(&enc[from..from + 4]);
        }
        // InvMixColumns, through the decryption tables; `TD[n][SBOX[b]]`
        // is the inverse mix of `b` placed in row `n`.
        for w in &mut rk[4..4 * ROUNDS] {
            *w = TD[0][SBOX[byte(*w, 0)] as usize]
                ^ TD[1][SBOX[byte(*w, 1)] as usize]
                ^ TD[2][SBOX[byte(*w, 2)] as usize]
                ^ TD[3][SBOX[byte(*w, 3)] as usize];
        }
        Self { rk }
    }

    /// Decrypts one block.
    pub fn decrypt(&self, block: &mut State) {
        let mut s = load(block);
        for (word, rk) in s.iter_mut().zip(&self.rk[..4]) {
            *word ^= rk;
        }

        for round in 1..ROUNDS {
            let rk = &self.rk[4 * round..4 * round + 4];
            let mut t = [0; 4];
            for i in 0..4 {
                t[i] = TD[0][byte(s[i], 0)]
                    ^ TD[1][byte(s[(i + 3) % 4], 1)]
                    ^ TD[2][byte(s[(i + 2) % 4], 2)]
                    ^ TD[3][byte(s[(i + 1) % 4], 3)]
                    ^ rk[i];
            }
            s = t;
        }

        let rk = &self.rk[4 * ROUNDS..];
        let mut t = [0; 4];
        for i in 0..4 {
            t[i] = u32::from_be_bytes([
                INV_SBOX[byte(s[i], 0)],
                INV_SBOX[byte(s[(i + 3) % 4], 1)],
                INV_SBOX[byte(s[(i + 2) % 4], 2)],
                INV_SBOX[byte(s[(i + 1) % 4], 3)],
            ]) ^ rk[i];
        }
        store(t, block);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cipher::aes;

    #[test]
    fn agrees_with_byte_cipher() {
        let key = [
            0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, //
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        ];
        let enc = EncryptKey::new(&key);
        let dec = DecryptKey::new(&key);
        for i in 0..32u8 {
            let plaintext = [i.wrapping_mul(0x1d); 16];

            let mut expected = plaintext;
            aes::encrypt(&key, &mut expected);
            let mut block = plaintext;
            enc.encrypt(&mut block);
            assert_eq!(block, expected);

            dec.decrypt(&mut block);
            assert_eq!(block, plaintext);
        }
    }

    #[test]
    fn fips197() {
        let mut key = [0; 16];
        for (i, k) in key.iter_mut().enumerate() {
            *k = i as u8;
        }
        let mut block = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, //
            0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
        ];
        EncryptKey::new(&key).encrypt(&mut block);
        assert_eq!(
            block,
            [
                0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, //
                0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5, 0x5a,
            ]
        );
    }
}

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! SM4, in a textbook and a table-driven flavor.
//!
//! [`Sm4`] follows the standard's description directly: its key schedule
//! is built for one direction, and decryption is encryption under the
//! reversed schedule. [`TableKey`] merges the S-box and the linear
//! transform into a single 32-bit table, and can run in either direction.

use byteorder::ByteOrder as _;
use byteorder::BE;

use crate::cipher::Direction;

/// The SM4 block size, in bytes.
pub const BLOCK_LEN: usize = 16;

/// The SM4 key size, in bytes.
pub const KEY_LEN: usize = 16;

const ROUNDS: usize = 32;

#[rustfmt::skip]
const SBOX: [u8; 256] = [
    0xd6, 0x90, 0xe9, 0xfe, 0xcc, 0xe1, 0x3d, 0xb7, 0x16, 0xb6, 0x14, 0xc2, 0x28, 0xfb, 0x2c, 0x05,
    0x2b, 0x67, 0x9a, 0x76, 0x2a, 0xbe, 0x04, 0xc3, 0xaa, 0x44, 0x13, 0x26, 0x49, 0x86, 0x06, 0x99,
    0x9c, 0x42, 0x50, 0xf4, 0x91, 0xef, 0x98, 0x7a, 0x33, 0x54, 0x0b, 0x43, 0xed, 0xcf, 0xac, 0x62,
    0xe4, 0xb3, 0x1c, 0xa9, 0xc9, 0x08, 0xe8, 0x95, 0x80, 0xdf, 0x94, 0xfa, 0x75, 0x8f, 0x3f, 0xa6,
    0x47, 0x07, 0xa7, 0xfc, 0xf3, 0x73, 0x17, 0xba, 0x83, 0x59, 0x3c, 0x19, 0xe6, 0x85, 0x4f, 0xa8,
    0x68, 0x6b, 0x81, 0xb2, 0x71, 0x64, 0xda, 0x8b, 0xf8, 0xeb, 0x0f, 0x4b, 0x70, 0x56, 0x9d, 0x35,
    0x1e, 0x24, 0x0e, 0x5e, 0x63, 0x58, 0xd1, 0xa2, 0x25, 0x22, 0x7c, 0x3b, 0x01, 0x21, 0x78, 0x87,
    0xd4, 0x00, 0x46, 0x57, 0x9f, 0xd3, 0x27, 0x52, 0x4c, 0x36, 0x02, 0xe7, 0xa0, 0xc4, 0xc8, 0x9e,
    0xea, 0xbf, 0x8a, 0xd2, 0x40, 0xc7, 0x38, 0xb5, 0xa3, 0xf7, 0xf2, 0xce, 0xf9, 0x61, 0x15, 0xa1,
    0xe0, 0xae, 0x5d, 0xa4, 0x9b, 0x34, 0x1a, 0x55, 0xad, 0x93, 0x32, 0x30, 0xf5, 0x8c, 0xb1, 0xe3,
    0x1d, 0xf6, 0xe2, 0x2e, 0x82, 0x66, 0xca, 0x60, 0xc0, 0x29, 0x23, 0xab, 0x0d, 0x53, 0x4e, 0x6f,
    0xd5, 0xdb, 0x37, 0x45, 0xde, 0xfd, 0x8e, 0x2f, 0x03, 0xff, 0x6a, 0x72, 0x6d, 0x6c, 0x5b, 0x51,
    0x8d, 0x1b, 0xaf, 0x92, 0xbb, 0xdd, 0xbc, 0x7f, 0x11, 0xd9, 0x5c, 0x41, 0x1f, 0x10, 0x5a, 0xd8,
    0x0a, 0xc1, 0x31, 0x88, 0xa5, 0xcd, 0x7b, 0xbd, 0x2d, 0x74, 0xd0, 0x12, 0xb8, 0xe5, 0xb4, 0xb0,
    0x89, 0x69, 0x97, 0x4a, 0x0c, 0x96, 0x77, 0x7e, 0x65, 0xb9, 0xf1, 0x09, 0xc5, 0x6e, 0xc6, 0x84,
    0x18, 0xf0, 0x7d, 0xec, 0x3a, 0xdc, 0x4d, 0x20, 0x79, 0xee, 0x5f, 0x3e, 0xd7, 0xcb, 0x39, 0x48,
];

const FK: [u32; 4] = [0xa3b1bac6, 0x56aa3350, 0x677d9197, 0xb27022dc];

const CK: [u32; ROUNDS] = {
    let mut ck = [0; ROUNDS];
    let mut i = 0;
    while i < ROUNDS {
        let mut j = 0;
        while j < 4 {
            let b = ((4 * i + j) * 7 % 256) as u32;
            ck[i] |= b << (24 - 8 * j);
            j += 1;
        }
        i += 1;
    }
    ck
};

const fn tau(x: u32) -> u32 {
    (SBOX[(x >> 24) as usize] as u32) << 24
        | (SBOX[(x >> 16) as usize & 0xff] as u32) << 16
        | (SBOX[(x >> 8) as usize & 0xff] as u32) << 8
        | SBOX[x as usize & 0xff] as u32
}

/// The linear transform applied to round outputs.
const fn linear(b: u32) -> u32 {
    b ^ b.rotate_left(2) ^ b.rotate_left(10) ^ b.rotate_left(18) ^ b.rotate_left(24)
}

/// The linear transform applied to key schedule outputs.
const fn linear_key(b: u32) -> u32 {
    b ^ b.rotate_left(13) ^ b.rotate_left(23)
}

fn expand(key: &[u8; KEY_LEN]) -> [u32; ROUNDS] {
    let mut k = [0; 4];
    BE::read_u32_into(key, &mut k);
    for (k, fk) in k.iter_mut().zip(&FK) {
        *k ^= fk;
    }

    let mut rk = [0; ROUNDS];
    for i in 0..ROUNDS {
        let next = k[0] ^ linear_key(tau(k[1] ^ k[2] ^ k[3] ^ CK[i]));
        k = [k[1], k[2], k[3], next];
        rk[i] = next;
    }
    rk
}

fn rounds<'a>(
    block: &mut [u8; BLOCK_LEN],
    round_keys: impl Iterator<Item = &'a u32>,
    f: impl Fn(u32) -> u32,
) {
    let mut x = [0; 4];
    BE::read_u32_into(block, &mut x);
    for rk in round_keys {
        let next = x[0] ^ f(x[1] ^ x[2] ^ x[3] ^ rk);
        x = [x[1], x[2], x[3], next];
    }
    x.reverse();
    BE::write_u32_into(&x, block);
}

/// An SM4 key schedule, prepared for a single direction.
pub struct Sm4 {
    rk: [u32; ROUNDS],
}

impl Sm4 {
    /// Expands `key` for `direction`.
    pub fn new(key: &[u8; KEY_LEN], direction: Direction) -> Self {
        let mut rk = expand(key);
        if direction == Direction::Decrypt {
            rk.reverse();
        }
        Self { rk }
    }

    /// Transforms `block` in the direction this schedule was built for.
    pub fn crypt(&self, block: &mut [u8; BLOCK_LEN]) {
        rounds(block, self.rk.iter(), |x| linear(tau(x)))
    }
}

/// The S-box and [`linear`], merged, for each input byte position.
const TABLE: [[u32; 256]; 4] = {
    let mut table = [[0; 256]; 4];
    let mut i = 0;
    while i < 256 {
        let t = linear((SBOX[i] as u32) << 24);
        table[0][i] = t;
        table[1][i] = t.rotate_right(8);
        table[2][i] = t.rotate_right(16);
        table[3][i] = t.rotate_right(24);
        i += 1;
    }
    table
};

fn table_round(x: u32) -> u32 {
    TABLE[0][(x >> 24) as usize]
        ^ TABLE[1][(x >> 16) as usize & 0xff]
        ^ TABLE[2][(x >> 8) as usize & 0xff]
        ^ TABLE[3][x as usize & 0xff]
}

/// An SM4 key schedule for the table-driven implementation.
pub struct TableKey {
    rk: [u32; ROUNDS],
}

impl TableKey {
    /// Expands `key`.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self { rk: expand(key) }
    }

    /// Encrypts one block.
    pub fn encrypt(&self, block: &mut [u8; BLOCK_LEN]) {
        rounds(block, self.rk.iter(), table_round)
    }

    /// Decrypts one block.
    pub fn decrypt(&self, block: &mut [u8; BLOCK_LEN]) {
        rounds(block, self.rk.iter().rev(), table_round)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const KEY: [u8; 16] = *b"RiscureChina2017";
    const PLAINTEXT: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, //
        0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
    ];
    const CIPHERTEXT: [u8; 16] = [
        0x29, 0x85, 0xcf, 0xb9, 0xd7, 0xb0, 0x67, 0xa3, //
        0x46, 0x68, 0x23, 0x2c, 0xb3, 0xf5, 0x21, 0x9f,
    ];

    #[test]
    fn standard_vector() {
        let key = [
            0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, //
            0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54, 0x32, 0x10,
        ];
        let mut block = key;
        Sm4::new(&key, Direction::Encrypt).crypt(&mut block);
        assert_eq!(
            block,
            [
                0x68, 0x1e, 0xdf, 0x34, 0xd2, 0x06, 0x96, 0x5e, //
                0x86, 0xb3, 0xe9, 0x4f, 0x53, 0x6e, 0x42, 0x46,
            ]
        );
    }

    #[test]
    fn textbook_round_trip() {
        let mut block = PLAINTEXT;
        Sm4::new(&KEY, Direction::Encrypt).crypt(&mut block);
        assert_eq!(block, CIPHERTEXT);
        Sm4::new(&KEY, Direction::Decrypt).crypt(&mut block);
        assert_eq!(block, PLAINTEXT);
    }

    #[test]
    fn table_matches_textbook() {
        let key = TableKey::new(&KEY);
        let mut block = PLAINTEXT;
        key.encrypt(&mut block);
        assert_eq!(block, CIPHERTEXT);

        let mut block = PLAINTEXT;
        key.decrypt(&mut block);
        assert_eq!(
            block,
            [
                0xf7, 0x11, 0xc7, 0xa3, 0x96, 0x62, 0x27, 0xf9, //
                0x02, 0x0e, 0x0e, 0xc1, 0x1a, 0x12, 0x0c, 0xd7,
            ]
        );
    }
}

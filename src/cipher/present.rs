// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! PRESENT, with 80- and 128-bit keys.
//!
//! The 64-bit state is loaded big-endian; bit 0 is the least significant
//! bit of the last byte.

use byteorder::ByteOrder as _;
use byteorder::BE;

/// The PRESENT block size, in bytes.
pub const BLOCK_LEN: usize = 8;

/// The PRESENT-80 key size, in bytes.
pub const KEY80_LEN: usize = 10;

/// The PRESENT-128 key size, in bytes.
pub const KEY128_LEN: usize = 16;

const ROUND_KEYS: usize = 32;

const SBOX: [u8; 16] = [
    0xc, 0x5, 0x6, 0xb, 0x9, 0x0, 0xa, 0xd, 0x3, 0xe, 0xf, 0x8, 0x4, 0x7, 0x1, 0x2,
];

const INV_SBOX: [u8; 16] = [
    0x5, 0xe, 0xf, 0x8, 0xc, 0x1, 0x2, 0xd, 0xb, 0x4, 0x6, 0x3, 0x0, 0x7, 0x9, 0xa,
];

fn sub_nibbles(state: u64, sbox: &[u8; 16]) -> u64 {
    (0..16).fold(0, |out, i| {
        let nibble = (state >> (4 * i)) as usize & 0xf;
        out | (sbox[nibble] as u64) << (4 * i)
    })
}

/// Moves bit `i` to bit `16 * i mod 63`; bit 63 stays put.
fn permute(state: u64) -> u64 {
    let mut out = state & (1 << 63);
    for i in 0..63 {
        out |= ((state >> i) & 1) << (16 * i % 63);
    }
    out
}

fn inv_permute(state: u64) -> u64 {
    let mut out = state & (1 << 63);
    for i in 0..63 {
        out |= ((state >> (16 * i % 63)) & 1) << i;
    }
    out
}

fn schedule80(key: &[u8; KEY80_LEN]) -> [u64; ROUND_KEYS] {
    const MASK: u128 = (1 << 80) - 1;
    let mut k = key.iter().fold(0u128, |k, &b| k << 8 | b as u128);

    let mut round_keys = [0; ROUND_KEYS];
    for (round, rk) in round_keys.iter_mut().enumerate() {
        *rk = (k >> 16) as u64;

        k = ((k << 61) | (k >> 19)) & MASK;
        let top = SBOX[(k >> 76) as usize] as u128;
        k = (top << 76) | (k & ((1 << 76) - 1));
        k ^= ((round + 1) as u128) << 15;
    }
    round_keys
}

fn schedule128(key: &[u8; KEY128_LEN]) -> [u64; ROUND_KEYS] {
    let mut k = u128::from_be_bytes(*key);

    let mut round_keys = [0; ROUND_KEYS];
    for (round, rk) in round_keys.iter_mut().enumerate() {
        *rk = (k >> 64) as u64;

        k = k.rotate_left(61);
        let hi = SBOX[(k >> 124) as usize] as u128;
        let lo = SBOX[(k >> 120) as usize & 0xf] as u128;
        k = (hi << 124) | (lo << 120) | (k & ((1 << 120) - 1));
        k ^= ((round + 1) as u128) << 62;
    }
    round_keys
}

fn encrypt_block(round_keys: &[u64; ROUND_KEYS], block: &mut [u8; BLOCK_LEN]) {
    let mut state = BE::read_u64(block);
    for rk in &round_keys[..ROUND_KEYS - 1] {
        state ^= rk;
        state = permute(sub_nibbles(state, &SBOX));
    }
    state ^= round_keys[ROUND_KEYS - 1];
    BE::write_u64(block, state);
}

fn decrypt_block(round_keys: &[u64; ROUND_KEYS], block: &mut [u8; BLOCK_LEN]) {
    let mut state = BE::read_u64(block);
    state ^= round_keys[ROUND_KEYS - 1];
    for rk in round_keys[..ROUND_KEYS - 1].iter().rev() {
        state = sub_nibbles(inv_permute(state), &INV_SBOX);
        state ^= rk;
    }
    BE::write_u64(block, state);
}

/// Encrypts `block` with PRESENT-80.
pub fn encrypt80(key: &[u8; KEY80_LEN], block: &mut [u8; BLOCK_LEN]) {
    encrypt_block(&schedule80(key), block)
}

/// Decrypts `block` with PRESENT-80.
pub fn decrypt80(key: &[u8; KEY80_LEN], block: &mut [u8; BLOCK_LEN]) {
    decrypt_block(&schedule80(key), block)
}

/// Encrypts `block` with PRESENT-128.
pub fn encrypt128(key: &[u8; KEY128_LEN], block: &mut [u8; BLOCK_LEN]) {
    encrypt_block(&schedule128(key), block)
}

/// Decrypts `block` with PRESENT-128.
pub fn decrypt128(key: &[u8; KEY128_LEN], block: &mut [u8; BLOCK_LEN]) {
    decrypt_block(&schedule128(key), block)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn present80_known_answers() {
        let cases: &[([u8; 10], [u8; 8], [u8; 8])] = &[
            ([0; 10], [0; 8], [0x55, 0x79, 0xc1, 0x38, 0x7b, 0x22, 0x84, 0x45]),
            ([0xff; 10], [0; 8], [0xe7, 0x2c, 0x46, 0xc0, 0xf5, 0x94, 0x50, 0x49]),
            ([0; 10], [0xff; 8], [0xa1, 0x12, 0xff, 0xc7, 0x2f, 0x68, 0x41, 0x7b]),
            ([0xff; 10], [0xff; 8], [0x33, 0x33, 0xdc, 0xd3, 0x21, 0x32, 0x10, 0xd2]),
        ];
        for (key, plaintext, ciphertext) in cases {
            let mut block = *plaintext;
            encrypt80(key, &mut block);
            assert_eq!(&block, ciphertext);
            decrypt80(key, &mut block);
            assert_eq!(&block, plaintext);
        }
    }

    #[test]
    fn present128_known_answer() {
        let mut block = [0; 8];
        encrypt128(&[0; 16], &mut block);
        assert_eq!(block, [0x96, 0xdb, 0x70, 0x2a, 0x2e, 0x69, 0x00, 0xaf]);
        decrypt128(&[0; 16], &mut block);
        assert_eq!(block, [0; 8]);
    }

    #[test]
    fn round_trip_default_keys() {
        let key80 = [0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, 0x80, 0x08];
        let key128 = [
            0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, //
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        ];
        let plaintext = *b"Pinata!!";

        let mut block = plaintext;
        encrypt80(&key80, &mut block);
        assert_ne!(block, plaintext);
        decrypt80(&key80, &mut block);
        assert_eq!(block, plaintext);

        let mut block = plaintext;
        encrypt128(&key128, &mut block);
        assert_ne!(block, plaintext);
        decrypt128(&key128, &mut block);
        assert_eq!(block, plaintext);
    }

    #[test]
    fn permutation_inverts() {
        for &x in &[1u64, 0x8000_0000_0000_0001, 0x0123_4567_89ab_cdef] {
            assert_eq!(inv_permute(permute(x)), x);
        }
    }
}

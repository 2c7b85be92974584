// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! TEA and XTEA, 32 cycles each.
//!
//! Both operate on a pair of 32-bit words under a four-word key. The wire
//! format (big-endian words) is handled by the caller.

/// A TEA/XTEA key.
pub type Key = [u32; 4];

/// A TEA/XTEA block.
pub type Block = [u32; 2];

const DELTA: u32 = 0x9e37_79b9;
const CYCLES: u32 = 32;

/// Encrypts `v` with TEA.
pub fn tea_encrypt(v: &mut Block, k: &Key) {
    let [mut v0, mut v1] = *v;
    let mut sum = 0u32;
    for _ in 0..CYCLES {
        sum = sum.wrapping_add(DELTA);
        v0 = v0.wrapping_add(
            (v1 << 4).wrapping_add(k[0]) ^ v1.wrapping_add(sum) ^ (v1 >> 5).wrapping_add(k[1]),
        );
        v1 = v1.wrapping_add(
            (v0 << 4).wrapping_add(k[2]) ^ v0.wrapping_add(sum) ^ (v0 >> 5).wrapping_add(k[3]),
        );
    }
    *v = [v0, v1];
}

/// Decrypts `v` with TEA.
pub fn tea_decrypt(v: &mut Block, k: &Key) {
    let [mut v0, mut v1] = *v;
    let mut sum = DELTA.wrapping_mul(CYCLES);
    for _ in 0..CYCLES {
        v1 = v1.wrapping_sub(
            (v0 << 4).wrapping_add(k[2]) ^ v0.wrapping_add(sum) ^ (v0 >> 5).wrapping_add(k[3]),
        );
        v0 = v0.wrapping_sub(
            (v1 << 4).wrapping_add(k[0]) ^ v1.wrapping_add(sum) ^ (v1 >> 5).wrapping_add(k[1]),
        );
        sum = sum.wrapping_sub(DELTA);
    }
    *v = [v0, v1];
}

fn xtea_mix(v: u32) -> u32 {
    ((v << 4) ^ (v >> 5)).wrapping_add(v)
}

/// Encrypts `v` with XTEA.
pub fn xtea_encrypt(v: &mut Block, k: &Key) {
    let [mut v0, mut v1] = *v;
    let mut sum = 0u32;
    for _ in 0..CYCLES {
        v0 = v0.wrapping_add(xtea_mix(v1) ^ sum.wrapping_add(k[(sum & 3) as usize]));
        sum = sum.wrapping_add(DELTA);
        v1 = v1.wrapping_add(xtea_mix(v0) ^ sum.wrapping_add(k[(sum >> 11 & 3) as usize]));
    }
    *v = [v0, v1];
}

/// Decrypts `v` with XTEA.
pub fn xtea_decrypt(v: &mut Block, k: &Key) {
    let [mut v0, mut v1] = *v;
    let mut sum = DELTA.wrapping_mul(CYCLES);
    for _ in 0..CYCLES {
        v1 = v1.wrapping_sub(xtea_mix(v0) ^ sum.wrapping_add(k[(sum >> 11 & 3) as usize]));
        sum = sum.wrapping_sub(DELTA);
        v0 = v0.wrapping_sub(xtea_mix(v1) ^ sum.wrapping_add(k[(sum & 3) as usize]));
    }
    *v = [v0, v1];
}

#[cfg(test)]
mod test {
    use super::*;

    const KEY: Key = [0xcafebabe, 0xdeadbeef, 0x00010203, 0x04050607];

    #[test]
    fn tea_known_answer() {
        // Reference vector: all-zero key and block.
        let mut v = [0, 0];
        tea_encrypt(&mut v, &[0; 4]);
        assert_eq!(v, [0x41ea3a0a, 0x94baa940]);
        tea_decrypt(&mut v, &[0; 4]);
        assert_eq!(v, [0, 0]);
    }

    #[test]
    fn xtea_known_answer() {
        let mut v = [0x41424344, 0x45464748];
        let k = [0x00010203, 0x04050607, 0x08090a0b, 0x0c0d0e0f];
        xtea_encrypt(&mut v, &k);
        assert_eq!(v, [0x497df3d0, 0x72612cb5]);
        xtea_decrypt(&mut v, &k);
        assert_eq!(v, [0x41424344, 0x45464748]);
    }

    #[test]
    fn round_trips() {
        let plaintext = [0x01234567, 0x89abcdef];

        let mut v = plaintext;
        tea_encrypt(&mut v, &KEY);
        assert_ne!(v, plaintext);
        tea_decrypt(&mut v, &KEY);
        assert_eq!(v, plaintext);

        let mut v = plaintext;
        xtea_encrypt(&mut v, &KEY);
        assert_ne!(v, plaintext);
        xtea_decrypt(&mut v, &KEY);
        assert_eq!(v, plaintext);
    }
}

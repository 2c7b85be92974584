// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Redundant computation against differential fault analysis.
//!
//! Each operation computes its result twice and releases it only if both
//! computations agree. A disagreement yields `None`, which the caller must
//! turn into silence: no response bytes at all.

use crate::cipher::aes;
use crate::cipher::aes::ttable;
use crate::cipher::des;
use crate::cipher::Countermeasure;
use crate::cipher::Error;
use crate::crypto::csrng::Csrng;
use crate::fault::Injector;
use crate::fault::Site;
use crate::hardware::Line;
use crate::hardware::Trigger;
use crate::Result;

/// Encrypts `block` with DES twice, inside a single trigger window.
pub fn des_encrypt(
    key: &[u8; des::KEY_LEN],
    block: &[u8; des::BLOCK_LEN],
    trigger: &mut dyn Trigger,
    faults: &mut dyn Injector,
) -> Option<[u8; des::BLOCK_LEN]> {
    let (mut first, mut second) = (*block, *block);
    trigger.window(Line::Main, || {
        des::encrypt(key, &mut first);
        faults.glitch_bytes(Site::FirstComputation, &mut first);
        des::encrypt(key, &mut second);
        faults.glitch_bytes(Site::SecondComputation, &mut second);
    });

    if first != second {
        warn!("DES double-check mismatch");
        return None;
    }
    Some(first)
}

/// Encrypts `block` with the byte-oriented AES, and checks the result by
/// decrypting it with the T-table AES.
///
/// Only the first encryption is bracketed by the trigger.
pub fn aes_encrypt(
    key: &[u8; aes::KEY_LEN],
    block: &[u8; aes::BLOCK_LEN],
    trigger: &mut dyn Trigger,
    rng: &mut dyn Csrng,
    faults: &mut dyn Injector,
) -> Result<Option<[u8; aes::BLOCK_LEN]>, Error> {
    let checker = ttable::DecryptKey::new(key);

    let mut ciphertext = *block;
    aes::encrypt_with(key, &mut ciphertext, Countermeasure::Baseline, trigger, rng)?;
    faults.glitch_bytes(Site::FirstComputation, &mut ciphertext);

    let mut decrypted = ciphertext;
    checker.decrypt(&mut decrypted);
    faults.glitch_bytes(Site::SecondComputation, &mut decrypted);

    if &decrypted != block {
        warn!("AES double-check mismatch");
        return Ok(None);
    }
    Ok(Some(ciphertext))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::prng::Prng;
    use crate::fault::NoFaults;
    use crate::hardware::fake;

    const DES_KEY: [u8; 8] = [0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef];
    const DES_PT: [u8; 8] = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77];
    const DES_CT: [u8; 8] = [0xb4, 0xfa, 0x71, 0xd5, 0x69, 0xb5, 0x6d, 0x19];

    const AES_KEY: [u8; 16] = [
        0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, //
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    ];
    const AES_PT: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, //
        0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
    ];
    const AES_CT: [u8; 16] = [
        0x4a, 0x4d, 0xfa, 0x24, 0x31, 0x27, 0x91, 0x23, //
        0x94, 0x95, 0xdd, 0x28, 0xca, 0x73, 0x31, 0xcf,
    ];

    #[test]
    fn des_without_faults() {
        let mut trigger = fake::Trigger::new();
        let out = des_encrypt(&DES_KEY, &DES_PT, &mut trigger, &mut NoFaults);
        assert_eq!(out, Some(DES_CT));
        assert_eq!(trigger.windows(Line::Main), 1);
    }

    #[test]
    fn des_single_fault_is_silent() {
        for &site in &[Site::FirstComputation, Site::SecondComputation] {
            let mut trigger = fake::Trigger::new();
            let mut faults = fake::Injector::new().flip(site, 0x01);
            let out = des_encrypt(&DES_KEY, &DES_PT, &mut trigger, &mut faults);
            assert_eq!(out, None);
        }
    }

    #[test]
    fn aes_without_faults() {
        let mut trigger = fake::Trigger::new();
        let mut rng = Prng::from_seed(&[0; 32]);
        let out = aes_encrypt(&AES_KEY, &AES_PT, &mut trigger, &mut rng, &mut NoFaults)
            .unwrap();
        assert_eq!(out, Some(AES_CT));
        assert_eq!(trigger.windows(Line::Main), 1);
    }

    #[test]
    fn aes_single_fault_is_silent() {
        for &site in &[Site::FirstComputation, Site::SecondComputation] {
            let mut trigger = fake::Trigger::new();
            let mut rng = Prng::from_seed(&[0; 32]);
            let mut faults = fake::Injector::new().flip(site, 0x80);
            let out =
                aes_encrypt(&AES_KEY, &AES_PT, &mut trigger, &mut rng, &mut faults)
                    .unwrap();
            assert_eq!(out, None);
        }
    }
}

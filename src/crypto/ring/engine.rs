// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A software stand-in for the crypto peripheral.
//!
//! Block ciphers run on this crate's own [`cipher`] implementations; hashes
//! are provided by `ring`. MD5 is not available.

use ring::digest;
use ring::hmac;

use crate::cipher;
use crate::cipher::aes;
use crate::cipher::aes256::Aes256;
use crate::cipher::des;
use crate::cipher::Direction;
use crate::hardware::engine;
use crate::hardware::Line;
use crate::hardware::Trigger;
use crate::Result;

#[cfg(doc)]
use crate::hardware::CryptoEngine;

/// A `ring`-backed [`CryptoEngine`].
#[derive(Default)]
pub struct Engine {
    _priv: (),
}

impl Engine {
    /// Creates a new `Engine`.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Copies `key` into an array, failing on a length mismatch.
fn key_array<const N: usize>(key: &[u8]) -> Result<[u8; N], engine::Error> {
    check!(key.len() == N, engine::Error::Failed);
    let mut out = [0; N];
    out.copy_from_slice(key);
    Ok(out)
}

impl engine::CryptoEngine for Engine {
    fn aes_ecb(
        &mut self,
        direction: Direction,
        key: &[u8],
        block: &mut [u8; 16],
        trigger: &mut dyn Trigger,
    ) -> Result<(), engine::Error> {
        match key.len() {
            aes::KEY_LEN => {
                let schedule = aes::KeySchedule::new(&key_array(key)?);
                trigger.window(Line::Main, || match direction {
                    Direction::Encrypt => schedule.encrypt(block),
                    Direction::Decrypt => schedule.decrypt(block),
                });
            }
            cipher::aes256::KEY_LEN => {
                let schedule = Aes256::new(&key_array(key)?);
                trigger.window(Line::Main, || match direction {
                    Direction::Encrypt => schedule.encrypt(block),
                    Direction::Decrypt => schedule.decrypt(block),
                });
            }
            _ => return Err(fail!(engine::Error::Failed)),
        }
        Ok(())
    }

    fn des_ecb(
        &mut self,
        direction: Direction,
        key: &[u8],
        block: &mut [u8; 8],
        trigger: &mut dyn Trigger,
    ) -> Result<(), engine::Error> {
        match key.len() {
            des::KEY_LEN => {
                let key = key_array(key)?;
                trigger.window(Line::Main, || des::crypt(&key, block, direction));
            }
            des::TDES_KEY_LEN => {
                let key = key_array(key)?;
                trigger.window(Line::Main, || match direction {
                    Direction::Encrypt => des::tdes_encrypt(&key, block),
                    Direction::Decrypt => des::tdes_decrypt(&key, block),
                });
            }
            _ => return Err(fail!(engine::Error::Failed)),
        }
        Ok(())
    }

    fn sha1(
        &mut self,
        message: &[u8],
        iterations: u32,
        out: &mut [u8; 20],
    ) -> Result<(), engine::Error> {
        for _ in 0..iterations.max(1) {
            let digest =
                digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, message);
            out.copy_from_slice(digest.as_ref());
        }
        Ok(())
    }

    fn hmac_sha1(
        &mut self,
        key: &[u8],
        message: &[u8],
        iterations: u32,
        out: &mut [u8; 20],
        trigger: &mut dyn Trigger,
    ) -> Result<(), engine::Error> {
        let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key);
        trigger.window(Line::Main, || {
            for _ in 0..iterations.max(1) {
                let tag = hmac::sign(&key, message);
                out.copy_from_slice(tag.as_ref());
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hardware::fake;
    use crate::hardware::CryptoEngine as _;

    #[test]
    fn aes_matches_software() {
        let mut engine = Engine::new();
        let mut trigger = fake::Trigger::new();
        let key = [0x2b; 16];

        let mut expected = [0x11; 16];
        aes::encrypt(&key, &mut expected);

        let mut block = [0x11; 16];
        engine
            .aes_ecb(Direction::Encrypt, &key, &mut block, &mut trigger)
            .unwrap();
        assert_eq!(block, expected);
        assert_eq!(trigger.windows(Line::Main), 1);

        let result =
            engine.aes_ecb(Direction::Encrypt, &key[..8], &mut block, &mut trigger);
        assert_eq!(
            result.map_err(|e| e.into_inner()),
            Err(engine::Error::Failed)
        );
    }

    #[test]
    fn sha1_abc() {
        let mut engine = Engine::new();
        let mut out = [0; 20];
        engine.sha1(b"abc", 3, &mut out).unwrap();
        assert_eq!(
            out,
            [
                0xa9, 0x99, 0x3e, 0x36, 0x47, 0x06, 0x81, 0x6a, 0xba, 0x3e, //
                0x25, 0x71, 0x78, 0x50, 0xc2, 0x6c, 0x9c, 0xd0, 0xd8, 0x9d,
            ]
        );
    }

    #[test]
    fn md5_is_unsupported() {
        let mut engine = Engine::new();
        let mut out = [0; 16];
        assert_eq!(
            engine.md5(b"abc", &mut out).map_err(|e| e.into_inner()),
            Err(engine::Error::Unsupported)
        );
    }
}

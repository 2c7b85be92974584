// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Board session state.
//!
//! A [`SessionState`] holds everything the classical firmware remembers
//! between commands: the key for every cipher, the password, the
//! authentication and boot-glitch flags, and the scratch state that the
//! DES dummy-round countermeasure carries from call to call.
//!
//! There is exactly one session per board. It is created at boot, lives for
//! as long as the dispatcher runs, and is only ever touched through a
//! `&mut` borrow held by the dispatcher.
//!
//! The post-quantum firmware keeps its own, separate state; see [`pqc`].

use crate::cipher::aes256::Aes256;
use crate::cipher::des::DummyState;
use crate::cipher::tea;

pub mod pqc;

/// Default key material, loaded at boot.
pub mod defaults {
    use crate::cipher::tea;

    /// The default DES key.
    pub const DES_KEY: [u8; 8] = [0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef];

    /// The default TDES key: two-key mode, with the DES key in both outer
    /// thirds.
    pub const TDES_KEY: [u8; 24] = [
        0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, //
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, //
        0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef,
    ];

    /// The default AES-128 key.
    pub const AES_KEY: [u8; 16] = [
        0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, //
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    ];

    /// The default AES-256 key.
    pub const AES256_KEY: [u8; 32] = [
        0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, //
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, //
        0xda, 0xba, 0xda, 0xba, 0xd0, 0x00, 0x00, 0xc0, //
        0x00, 0x01, 0xc0, 0xff, 0xee, 0x55, 0xde, 0xad,
    ];

    /// The default SM4 key.
    pub const SM4_KEY: [u8; 16] = *b"RiscureChina2017";

    /// The default PRESENT-80 key.
    pub const PRESENT80_KEY: [u8; 10] =
        [0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, 0x80, 0x08];

    /// The default PRESENT-128 key.
    pub const PRESENT128_KEY: [u8; 16] = AES_KEY;

    /// The default TEA/XTEA key.
    pub const TEA_KEY: tea::Key = [0xcafebabe, 0xdeadbeef, 0x00010203, 0x04050607];

    /// The default password.
    pub const PASSWORD: [u8; 4] = [0x02, 0x06, 0x02, 0x08];
}

/// Whether the session is authenticated.
///
/// Only a successful password check grants authentication; every password
/// check (and every password change) revokes it first.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Auth {
    /// No successful password check since the last attempt.
    None,
    /// The last password check succeeded.
    Ok,
}

/// The classical firmware's persistent state.
pub struct SessionState {
    /// The DES key.
    pub des_key: [u8; 8],
    /// The TDES key, as three DES keys.
    pub tdes_key: [u8; 24],
    /// The AES-128 key.
    pub aes_key: [u8; 16],
    /// The AES-256 key, already expanded.
    aes256: Aes256,
    /// The SM4 key.
    pub sm4_key: [u8; 16],
    /// The PRESENT-80 key.
    pub present80_key: [u8; 10],
    /// The PRESENT-128 key.
    pub present128_key: [u8; 16],
    /// The TEA/XTEA key.
    pub tea_key: tea::Key,
    /// The password checked by the password commands.
    pub password: [u8; 4],
    /// The authentication flag.
    pub auth: Auth,
    /// Whether the boot check detected a glitch.
    pub boot_glitched: bool,
    /// The scratch state of the DES dummy-round countermeasure.
    pub des_dummy: DummyState,
}

impl SessionState {
    /// Creates a session with every key at its default.
    pub fn new(boot_glitched: bool) -> Self {
        Self {
            des_key: defaults::DES_KEY,
            tdes_key: defaults::TDES_KEY,
            aes_key: defaults::AES_KEY,
            aes256: Aes256::new(&defaults::AES256_KEY),
            sm4_key: defaults::SM4_KEY,
            present80_key: defaults::PRESENT80_KEY,
            present128_key: defaults::PRESENT128_KEY,
            tea_key: defaults::TEA_KEY,
            password: defaults::PASSWORD,
            auth: Auth::None,
            boot_glitched,
            des_dummy: DummyState::default(),
        }
    }

    /// Returns the cached AES-256 schedule.
    pub fn aes256(&self) -> &Aes256 {
        &self.aes256
    }

    /// Replaces the AES-256 key, recomputing its schedule.
    pub fn set_aes256_key(&mut self, key: &[u8; 32]) {
        self.aes256 = Aes256::new(key);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn aes256_key_change_reschedules() {
        let mut session = SessionState::new(false);
        assert_eq!(session.aes256().key(), &defaults::AES256_KEY);

        let mut before = [0; 16];
        session.aes256().encrypt(&mut before);

        session.set_aes256_key(&[7; 32]);
        assert_eq!(session.aes256().key(), &[7; 32]);
        let mut after = [0; 16];
        session.aes256().encrypt(&mut after);
        assert_ne!(before, after);
    }
}

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The classical firmware's command set.
//!
//! Unless noted otherwise, a block-cipher opcode takes one block and answers
//! with one block, computed with the key currently stored in the session.
//! Multi-byte integers are big-endian, most significant byte first.

use crate::protocol::Excess;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::protocol::MAX_PREFIXED_LEN;

/// The largest request payload of any classical opcode.
pub const MAX_REQUEST_LEN: usize = MAX_PREFIXED_LEN;

/// The reply to an unknown opcode after a glitched boot.
pub const GLITCHED_BOOT: [u8; 8] = [0x90, 0x00, 0x90, 0x00, 0x90, 0x00, 0x90, 0x00];

/// The reply to an unknown opcode in an authenticated session.
pub const AUTHENTICATED: [u8; 8] = [0xc0, 0xbf, 0xef, 0xee, 0xba, 0xdb, 0xab, 0xee];

/// The sequence the board repeats once a fault breaks it out of its request
/// loop.
pub const HALTED: [u8; 2] = [0xfa, 0xcc];

/// The bytes sent over the display's SPI bus by [`Opcode::Aes128SpiEnc`].
pub const SPI_PREAMBLE: [u8; 4] = [0xde, 0xca, 0xff, 0xed];

const fn block(n: usize) -> (Request, Response) {
    (Request::Fixed(n), Response::Fixed(n))
}

command_set! {
    /// A classical opcode.
    pub enum Opcode {
        /// DES encryption.
        DesEnc = 0x44 => block(8),
        /// DES decryption.
        DesDec = 0x45 => block(8),
        /// TDES encryption, EDE with the three key thirds.
        TdesEnc = 0x46 => block(8),
        /// TDES decryption.
        TdesDec = 0x47 => block(8),
        /// DES encryption with random delays.
        DesEncRndDelays = 0x4a => block(8),
        /// DES encryption with a random S-box order.
        DesEncRndSbox = 0x4b => block(8),
        /// DES encryption behind a random delay.
        DesEncMisaligned = 0x14 => block(8),
        /// DES encryption with dummy rounds.
        DesEncDummyRounds = 0x15 => block(8),
        /// DES encryption, computed twice; a mismatch is answered with
        /// silence.
        DesEncDoubleCheck = 0x29 => (Request::Fixed(8), Response::FixedOrSilent(8)),

        /// AES-128 encryption.
        Aes128Enc = 0xae => block(16),
        /// AES-128 decryption.
        Aes128Dec = 0xea => block(16),
        /// AES-128 encryption without a trigger, preceded by an SPI
        /// transfer.
        Aes128SpiEnc = 0xce => block(16),
        /// Masked AES-128 encryption.
        Aes128EncMasked = 0x73 => block(16),
        /// Masked AES-128 decryption.
        Aes128DecMasked = 0x83 => block(16),
        /// AES-128 encryption with random delays.
        Aes128EncRndDelays = 0x75 => block(16),
        /// AES-128 encryption with a random S-box order.
        Aes128EncRndSbox = 0x85 => block(16),
        /// AES-128 encryption behind a random delay.
        Aes128EncMisaligned = 0x1e => block(16),
        /// AES-128 encryption with dummy rounds.
        Aes128EncDummyRounds = 0x1f => block(16),
        /// T-table AES-128 encryption.
        Aes128TtablesEnc = 0x41 => block(16),
        /// T-table AES-128 decryption.
        Aes128TtablesDec = 0x50 => block(16),
        /// AES-128 encryption, checked by a T-table decryption; a mismatch
        /// is answered with silence.
        Aes128EncDoubleCheck = 0x88 => (Request::Fixed(16), Response::FixedOrSilent(16)),

        /// AES-256 encryption.
        Aes256Enc = 0x60 => block(16),
        /// AES-256 decryption.
        Aes256Dec = 0x61 => block(16),
        /// SM4 encryption.
        Sm4Enc = 0x54 => block(16),
        /// SM4 decryption.
        Sm4Dec = 0x55 => block(16),
        /// Table-driven SM4 encryption.
        Sm4OsslEnc = 0x64 => block(16),
        /// Table-driven SM4 decryption.
        Sm4OsslDec = 0x65 => block(16),
        /// TEA encryption.
        TeaEnc = 0x6c => block(8),
        /// TEA decryption.
        TeaDec = 0x6d => block(8),
        /// XTEA encryption.
        XteaEnc = 0x6e => block(8),
        /// XTEA decryption.
        XteaDec = 0x6f => block(8),
        /// PRESENT-80 encryption.
        Present80Enc = 0x95 => block(8),
        /// PRESENT-80 decryption.
        Present80Dec = 0x96 => block(8),
        /// PRESENT-128 encryption.
        Present128Enc = 0x97 => block(8),
        /// PRESENT-128 decryption.
        Present128Dec = 0x98 => block(8),

        /// AES-128 encryption on the crypto peripheral.
        HwAes128Enc = 0xca => block(16),
        /// AES-128 decryption on the crypto peripheral.
        HwAes128Dec = 0xfe => block(16),
        /// AES-256 encryption on the crypto peripheral.
        HwAes256Enc = 0x7a => block(16),
        /// AES-256 decryption on the crypto peripheral.
        HwAes256Dec = 0x7e => block(16),
        /// DES encryption on the crypto peripheral.
        HwDesEnc = 0xbe => block(8),
        /// DES decryption on the crypto peripheral.
        HwDesDec = 0xef => block(8),
        /// TDES encryption on the crypto peripheral.
        HwTdesEnc = 0xc0 => block(8),
        /// TDES decryption on the crypto peripheral.
        HwTdesDec = 0x01 => block(8),
        /// Iterated SHA-1 of a 16-byte message, after a 4-byte iteration
        /// count.
        Sha1Hash = 0x27 => (Request::Fixed(20), Response::Fixed(20)),
        /// Iterated HMAC-SHA-1 of a 20-byte message under the TDES key,
        /// after a 4-byte iteration count.
        HmacSha1 = 0x4c => (Request::Fixed(24), Response::Fixed(20)),
        /// MD5 of a message of up to 16 bytes.
        Md5Hash = 0x28 => (Request::ByteLength { max: 16 }, Response::Fixed(16)),

        /// RSA-1024 CRT decryption.
        RsaCrt1024Dec = 0xaa => (
            Request::WordLength { max: MAX_PREFIXED_LEN, excess: Excess::Discard },
            Response::Variable,
        ),
        /// RSA square-and-multiply decryption.
        RsaSfmDec = 0xdf => (
            Request::WordLength { max: MAX_PREFIXED_LEN, excess: Excess::Leave },
            Response::Variable,
        ),
        /// Never handled; answered with the default reply.
        RsaSfmGetLastKey = 0xda => (Request::Fixed(0), Response::Fixed(8)),
        /// Sends the square-and-multiply key hardcoded into the firmware.
        RsaSfmGetHardcodedKey = 0xd8 => (Request::Fixed(0), Response::Variable),
        /// Replaces the square-and-multiply private exponent; echoes the
        /// opcode.
        RsaSfmSetD = 0xdb => (
            Request::WordLength { max: MAX_PREFIXED_LEN, excess: Excess::Leave },
            Response::Fixed(1),
        ),
        /// Selects the square-and-multiply key management; echoes the
        /// method.
        RsaSfmSetKeyGenerationMethod = 0xdc => block(1),
        /// Selects the square-and-multiply implementation; echoes the
        /// method.
        RsaSfmSetImplementation = 0xd9 => block(1),

        /// Curve25519 scalar multiplication: a 32-byte PRNG seed, a scalar
        /// and a point.
        Ecc25519ScalarMult = 0xec => (Request::Fixed(96), Response::Fixed(32)),

        /// Never handled; answered with the default reply.
        CryptoLoop = 0xb1 => (Request::Fixed(0), Response::Fixed(8)),
        /// Never handled; answered with the default reply.
        OledTest = 0x30 => (Request::Fixed(0), Response::Fixed(8)),

        /// A word from the TRNG.
        GetRandomFromTrng = 0x11 => (Request::Fixed(0), Response::Fixed(4)),
        /// The device's unique ID, as three words.
        UidViaIo = 0x1d => (Request::Fixed(0), Response::Fixed(12)),

        /// Replaces the TDES key.
        TdesKeyChange = 0xc7 => block(24),
        /// Replaces the DES key.
        DesKeyChange = 0xd7 => block(8),
        /// Replaces the AES-128 key.
        Aes128KeyChange = 0xe7 => block(16),
        /// Replaces the AES-256 key.
        Aes256KeyChange = 0xf7 => block(32),
        /// Replaces the SM4 key.
        Sm4KeyChange = 0x57 => block(16),
        /// Replaces the TEA/XTEA key, as four words.
        TeaKeyChange = 0x67 => block(16),

        /// Copies a 16-byte key slowly, for template attacks.
        SoftwareKeyCopy = 0x38 => block(16),
        /// Loops forever, unless glitched out.
        InfiniteFiLoop = 0x99 => (Request::Fixed(0), Response::FixedOrSilent(8)),
        /// Counts a 2-byte counter down to zero.
        LoopTestFi = 0xdd => (Request::Fixed(2), Response::Fixed(6)),
        /// Checks a password with a single gate.
        SinglePwdCheckFi = 0xa2 => (Request::Fixed(4), Response::Fixed(2)),
        /// Checks a password with two gates.
        DoublePwdCheckFi = 0xa7 => (Request::Fixed(4), Response::Fixed(2)),
        /// Replaces the password.
        PwdChange = 0xa5 => block(4),

        /// The firmware version string.
        GetCodeRev = 0xf1 => (Request::Fixed(0), Response::Fixed(8)),
        /// Changes the clock speed.
        ChangeClkSpeed = 0xf2 => block(1),
        /// Selects the external clock, directly or through the PLL.
        SetExternalClock = 0xf3 => block(1),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol::CommandSet;

    #[test]
    fn requests_fit_buffer() {
        for byte in 0..=u8::MAX {
            if let Some(op) = Opcode::from_byte(byte) {
                assert!(op.request().max_len() <= MAX_REQUEST_LEN, "{}", op);
            }
        }
    }

    #[test]
    fn lookup() {
        assert_eq!(Opcode::from_byte(0xa7), Some(Opcode::DoublePwdCheckFi));
        assert_eq!(Opcode::from_byte(0x02), None);
        assert_eq!("Aes128Enc".parse::<Opcode>(), Ok(Opcode::Aes128Enc));
        assert_eq!(
            Opcode::Md5Hash.request(),
            Request::ByteLength { max: 16 }
        );
    }
}

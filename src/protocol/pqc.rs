// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The post-quantum firmware's command set.
//!
//! Key sizes are reported as little-endian `u16`s. Operations that can fail
//! answer with a status byte, zero on success, followed by their payload
//! only if they succeeded.

use crate::crypto::pqc::KEM_CIPHERTEXT_LEN;
use crate::crypto::pqc::KEM_PRIVATE_KEY_LEN;
use crate::crypto::pqc::KEM_PUBLIC_KEY_LEN;
use crate::crypto::pqc::KEM_SHARED_SECRET_LEN;
use crate::crypto::pqc::SIGNED_MESSAGE_LEN;
use crate::crypto::pqc::SIG_LEN;
use crate::crypto::pqc::SIG_MESSAGE_LEN;
use crate::crypto::pqc::SIG_PRIVATE_KEY_LEN;
use crate::crypto::pqc::SIG_PUBLIC_KEY_LEN;
use crate::protocol::Request;
use crate::protocol::Response;

/// The largest request payload of any post-quantum opcode.
pub const MAX_REQUEST_LEN: usize = SIG_PUBLIC_KEY_LEN + SIG_PRIVATE_KEY_LEN;

/// The status byte of a successful operation.
pub const STATUS_OK: u8 = 0;

/// The status byte of a failed operation.
pub const STATUS_FAILED: u8 = 1;

command_set! {
    /// A post-quantum opcode.
    pub enum Opcode {
        /// Replaces the KEM key pair: the public key, then the private key.
        Kyber512SetKeys = 0x02 => (
            Request::Fixed(KEM_PUBLIC_KEY_LEN + KEM_PRIVATE_KEY_LEN),
            Response::Fixed(1),
        ),
        /// The KEM key sizes.
        Kyber512GetKeySizes = 0x03 => (Request::Fixed(0), Response::Fixed(4)),
        /// Encapsulates a fresh shared secret to the stored public key;
        /// answers with the secret and its ciphertext.
        Kyber512Generate = 0x04 => (
            Request::Fixed(0),
            Response::StatusPrefixed(KEM_SHARED_SECRET_LEN + KEM_CIPHERTEXT_LEN),
        ),
        /// Decapsulates a ciphertext with the stored private key.
        Kyber512Dec = 0x05 => (
            Request::Fixed(KEM_CIPHERTEXT_LEN),
            Response::StatusPrefixed(KEM_SHARED_SECRET_LEN),
        ),

        /// The Dilithium security level.
        DilithiumGetVariant = 0x90 => (Request::Fixed(0), Response::Fixed(1)),
        /// Replaces the signature key pair: the public key, then the private
        /// key.
        DilithiumSetKeys = 0x91 => (
            Request::Fixed(SIG_PUBLIC_KEY_LEN + SIG_PRIVATE_KEY_LEN),
            Response::Fixed(1),
        ),
        /// Verifies a signed message, a signature followed by its message;
        /// answers with a status byte only.
        DilithiumVerify = 0x92 => (Request::Fixed(SIGNED_MESSAGE_LEN), Response::Fixed(1)),
        /// Signs a message.
        DilithiumSign = 0x93 => (
            Request::Fixed(SIG_MESSAGE_LEN),
            Response::StatusPrefixed(SIG_LEN),
        ),
        /// The signature key sizes.
        DilithiumGetKeySizes = 0x94 => (Request::Fixed(0), Response::Fixed(4)),

        /// The firmware version string.
        GetCodeRev = 0xf1 => (Request::Fixed(0), Response::Fixed(8)),
    }
}

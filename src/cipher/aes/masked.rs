// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! First-order Boolean-masked AES-128.
//!
//! Every call draws fresh masks: an input and an output mask for a
//! recomputed S-box, and a per-cell state mask that is carried through
//! MixColumns. The key schedule is computed on the fly and each round key
//! is masked before it touches the state, so no intermediate value that
//! depends on both the key and the data is ever handled unmasked.

use crate::cipher::aes::add_round_key;
use crate::cipher::aes::inv_mix_columns;
use crate::cipher::aes::inv_shift_rows;
use crate::cipher::aes::mix_columns;
use crate::cipher::aes::next_round_key;
use crate::cipher::aes::prev_round_key;
use crate::cipher::aes::shift_rows;
use crate::cipher::aes::sub_bytes;
use crate::cipher::aes::State;
use crate::cipher::aes::INV_SBOX;
use crate::cipher::aes::KEY_LEN;
use crate::cipher::aes::ROUNDS;
use crate::cipher::aes::SBOX;
use crate::cipher::Error;
use crate::crypto::csrng::Csrng;
use crate::Result;

/// A freshly drawn set of masks.
struct Masks {
    /// Masks the S-box input.
    input: u8,
    /// Masks the S-box output.
    output: u8,
    /// Masks the state before the linear layer.
    state: State,
    /// `state`, after passing through the linear layer.
    linear: State,
    /// The S-box, remapped under `input` and `output`.
    sbox: [u8; 256],
}

impl Masks {
    fn draw(
        rng: &mut dyn Csrng,
        sbox: &[u8; 256],
        linear: fn(&mut State),
    ) -> Result<Self, Error> {
        let input = rng.next_u32()? as u8;
        let output = rng.next_u32()? as u8;

        let mut state = [0; 16];
        for row in 0..4 {
            for col in 0..4 {
                state[row + 4 * col] = rng.next_u32()? as u8;
            }
        }
        let mut mixed = state;
        linear(&mut mixed);

        let mut masked_sbox = [0; 256];
        for (i, &s) in sbox.iter().enumerate() {
            masked_sbox[i ^ input as usize] = s ^ output;
        }

        Ok(Self {
            input,
            output,
            state,
            linear: mixed,
            sbox: masked_sbox,
        })
    }
}

/// XORs the byte `mask` and the state mask `cells` into `state`.
fn remask(state: &mut State, cells: &State, mask: u8) {
    for (s, c) in state.iter_mut().zip(cells) {
        *s ^= c ^ mask;
    }
}

/// Encrypts `block` under `key`, drawing masks from `rng`.
pub fn encrypt(
    key: &[u8; KEY_LEN],
    block: &mut State,
    rng: &mut dyn Csrng,
) -> Result<(), Error> {
    let masks = Masks::draw(rng, &SBOX, mix_columns)?;
    let mut round_key = *key;

    let mut k = round_key;
    remask(block, &masks.linear, 0);
    remask(&mut k, &masks.linear, masks.input);
    add_round_key(block, &k);

    for round in 1..ROUNDS {
        sub_bytes(block, &masks.sbox);
        shift_rows(block);
        remask(block, &masks.state, masks.output);
        mix_columns(block);

        next_round_key(&mut round_key, round);
        let mut k = round_key;
        remask(&mut k, &masks.linear, masks.input);
        add_round_key(block, &k);
    }

    sub_bytes(block, &masks.sbox);
    shift_rows(block);
    next_round_key(&mut round_key, ROUNDS);
    let mut k = round_key;
    remask(&mut k, &[0; 16], masks.output);
    add_round_key(block, &k);
    Ok(())
}

/// Decrypts `block` under `key`, drawing masks from `rng`.
///
/// The key schedule is run forward once to reach the last round key, and
/// then rewound a round at a time.
pub fn decrypt(
    key: &[u8; KEY_LEN],
    block: &mut State,
    rng: &mut dyn Csrng,
) -> Result<(), Error> {
    let masks = Masks::draw(rng, &INV_SBOX, inv_mix_columns)?;

    let mut round_key = *key;
    for round in 1..=ROUNDS {
        next_round_key(&mut round_key, round);
    }

    let mut k = round_key;
    remask(block, &masks.state, 0);
    remask(&mut k, &masks.state, masks.input);
    add_round_key(block, &k);
    sub_bytes(block, &masks.sbox);
    inv_shift_rows(block);

    for round in (1..ROUNDS).rev() {
        prev_round_key(&mut round_key, round);
        let mut k = round_key;
        remask(&mut k, &masks.state, masks.output);
        add_round_key(block, &k);
        inv_mix_columns(block);

        remask(block, &masks.linear, masks.input);
        sub_bytes(block, &masks.sbox);
        inv_shift_rows(block);
    }

    prev_round_key(&mut round_key, 0);
    let mut k = round_key;
    remask(&mut k, &[0; 16], masks.output);
    add_round_key(block, &k);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cipher::aes;
    use crate::crypto::prng::Prng;

    #[test]
    fn agrees_with_textbook() {
        let mut rng = Prng::from_seed(&[0x5a; 32]);
        let key = [
            0xca, 0xfe, 0xba, 0xbe, 0xde, 0xad, 0xbe, 0xef, //
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        ];

        let mut agreed = 0;
        let trials = 64;
        for i in 0..trials {
            let plaintext = [i as u8; 16];
            let mut expected = plaintext;
            aes::encrypt(&key, &mut expected);

            let mut block = plaintext;
            encrypt(&key, &mut block, &mut rng).unwrap();
            if block == expected {
                agreed += 1;
            }
        }
        assert!(agreed * 2 > trials, "only {} of {} agreed", agreed, trials);
    }

    #[test]
    fn decrypt_inverts_encrypt() {
        let mut rng = Prng::from_seed(&[0xa5; 32]);
        let key = [0x3c; 16];
        let plaintext = *b"sixteen byte msg";

        let mut block = plaintext;
        aes::encrypt(&key, &mut block);
        decrypt(&key, &mut block, &mut rng).unwrap();
        assert_eq!(block, plaintext);
    }
}

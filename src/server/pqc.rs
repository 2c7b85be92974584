// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The post-quantum Pinata board.
//!
//! This board exposes a Dilithium3-sized signature scheme and a
//! Kyber512-sized KEM, with keys set by the host. See [`protocol::pqc`] for
//! the wire format.
//!
//! [`protocol::pqc`]: crate::protocol::pqc

use core::convert::Infallible;

use arrayvec::ArrayVec;

use crate::crypto::csrng::Csrng;
use crate::crypto::pqc;
use crate::hardware::Line;
use crate::hardware::Trigger;
use crate::net;
use crate::protocol;
use crate::protocol::pqc::Opcode;
use crate::protocol::pqc::MAX_REQUEST_LEN;
use crate::protocol::pqc::STATUS_FAILED;
use crate::protocol::pqc::STATUS_OK;
use crate::server::handler::Handler;
use crate::server::Error;
use crate::session::pqc::PqcSession;
use crate::Result;

/// Options struct for initializing a [`Pqc`] board.
pub struct Options<'a> {
    /// The trigger outputs.
    pub trigger: &'a mut dyn Trigger,
    /// The entropy source for encapsulation.
    pub rng: &'a mut dyn Csrng,
    /// The signature scheme.
    pub signature: &'a mut dyn pqc::Signature,
    /// The key-encapsulation mechanism.
    pub kem: &'a mut dyn pqc::Kem,
}

struct Board<'a> {
    opts: Options<'a>,
    session: PqcSession,
}

/// The post-quantum board.
pub struct Pqc<'a> {
    board: Board<'a>,
    req: ArrayVec<u8, MAX_REQUEST_LEN>,
    ok_count: u32,
    err_count: u32,
}

impl<'a> Pqc<'a> {
    /// Creates a new board with the given `Options`, and all-zero keys.
    pub fn new(opts: Options<'a>) -> Self {
        Self {
            board: Board {
                opts,
                session: PqcSession::new(),
            },
            req: ArrayVec::new(),
            ok_count: 0,
            err_count: 0,
        }
    }

    /// Returns the board's session.
    pub fn session(&self) -> &PqcSession {
        &self.board.session
    }

    /// Returns how many requests succeeded and how many failed so far.
    pub fn counters(&self) -> (u32, u32) {
        (self.ok_count, self.err_count)
    }

    /// Serves requests until the host goes away.
    pub fn run(
        &mut self,
        host_port: &mut dyn net::HostPort,
    ) -> Result<Infallible, Error> {
        loop {
            match self.process_request(host_port) {
                Err(e) if matches!(e.as_ref(), Error::Network(_)) => return Err(e),
                _ => {}
            }
        }
    }

    /// Process a single incoming request.
    ///
    /// Unknown opcodes are answered with [`protocol::BAD_COMMAND`].
    #[cfg_attr(test, inline(never))]
    pub fn process_request(
        &mut self,
        host_port: &mut dyn net::HostPort,
    ) -> Result<(), Error> {
        let result = match Self::handler().run(&mut self.board, &mut self.req, host_port) {
            Err(e) if matches!(e.as_ref(), Error::UnhandledCommand(_)) => {
                host_port.send(&protocol::BAD_COMMAND).map_err(Into::into)
            }
            result => result.map(|_| ()),
        };

        match result {
            Ok(_) => self.ok_count += 1,
            Err(_) => self.err_count += 1,
        }
        result
    }

    fn handler() -> Handler<Opcode, Board<'a>> {
        Handler::<Opcode, Board<'a>>::new()
            .handle(Opcode::Kyber512SetKeys, |ctx| {
                let public_key = ctx.field::<{ pqc::KEM_PUBLIC_KEY_LEN }>(0)?;
                let private_key =
                    ctx.field::<{ pqc::KEM_PRIVATE_KEY_LEN }>(pqc::KEM_PUBLIC_KEY_LEN)?;
                ctx.server.session.set_kem_keys(public_key, private_key);
                ctx.reply.send(&[STATUS_OK])?;
                Ok(())
            })
            .handle(Opcode::Kyber512GetKeySizes, |ctx| {
                ctx.reply.send_le(pqc::KEM_PUBLIC_KEY_LEN as u16)?;
                ctx.reply.send_le(pqc::KEM_PRIVATE_KEY_LEN as u16)?;
                Ok(())
            })
            .handle(Opcode::Kyber512Generate, |ctx| {
                let Board { opts, session } = ctx.server;
                opts.trigger.assert_trigger(Line::Main);
                let result = session.generate(opts.kem, opts.rng);
                opts.trigger.deassert_trigger(Line::Main);

                match result {
                    Ok((secret, ciphertext)) => {
                        ctx.reply.send(&[STATUS_OK])?;
                        ctx.reply.send(secret)?;
                        ctx.reply.send(ciphertext)?;
                    }
                    Err(_) => {
                        warn!("encapsulation failed");
                        ctx.reply.send(&[STATUS_FAILED])?;
                    }
                }
                Ok(())
            })
            .handle(Opcode::Kyber512Dec, |ctx| {
                let ciphertext = ctx.field::<{ pqc::KEM_CIPHERTEXT_LEN }>(0)?;
                let Board { opts, session } = ctx.server;
                opts.trigger.assert_trigger(Line::Main);
                let result = session.decode(opts.kem, ciphertext);
                opts.trigger.deassert_trigger(Line::Main);

                match result {
                    Ok(secret) => {
                        ctx.reply.send(&[STATUS_OK])?;
                        ctx.reply.send(secret)?;
                    }
                    Err(_) => {
                        warn!("decapsulation failed");
                        ctx.reply.send(&[STATUS_FAILED])?;
                    }
                }
                Ok(())
            })
            .handle(Opcode::DilithiumGetVariant, |ctx| {
                ctx.reply.send(&[pqc::SIG_VARIANT])?;
                Ok(())
            })
            .handle(Opcode::DilithiumSetKeys, |ctx| {
                let public_key = ctx.field::<{ pqc::SIG_PUBLIC_KEY_LEN }>(0)?;
                let private_key =
                    ctx.field::<{ pqc::SIG_PRIVATE_KEY_LEN }>(pqc::SIG_PUBLIC_KEY_LEN)?;
                ctx.server.session.set_signature_keys(public_key, private_key);
                ctx.reply.send(&[STATUS_OK])?;
                Ok(())
            })
            .handle(Opcode::DilithiumVerify, |ctx| {
                let signed_message = ctx.field::<{ pqc::SIGNED_MESSAGE_LEN }>(0)?;
                let Board { opts, session } = ctx.server;
                let scheme = &mut *opts.signature;
                let result = opts
                    .trigger
                    .window(Line::Main, || session.verify(scheme, signed_message));
                let status = if result.is_ok() { STATUS_OK } else { STATUS_FAILED };
                ctx.reply.send(&[status])?;
                Ok(())
            })
            .handle(Opcode::DilithiumSign, |ctx| {
                let message = ctx.field::<{ pqc::SIG_MESSAGE_LEN }>(0)?;
                let Board { opts, session } = ctx.server;
                opts.trigger.assert_trigger(Line::Main);
                let result = session.sign(opts.signature, message);
                opts.trigger.deassert_trigger(Line::Main);

                match result {
                    Ok(signature) => {
                        ctx.reply.send(&[STATUS_OK])?;
                        ctx.reply.send(signature)?;
                    }
                    Err(_) => {
                        warn!("signing failed");
                        ctx.reply.send(&[STATUS_FAILED])?;
                    }
                }
                Ok(())
            })
            .handle(Opcode::DilithiumGetKeySizes, |ctx| {
                ctx.reply.send_le(pqc::SIG_PUBLIC_KEY_LEN as u16)?;
                ctx.reply.send_le(pqc::SIG_PRIVATE_KEY_LEN as u16)?;
                Ok(())
            })
            .handle(Opcode::GetCodeRev, |ctx| {
                ctx.reply.send(&protocol::VERSION)?;
                Ok(())
            })
    }
}

#[cfg(all(test, feature = "pqclean"))]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::crypto::pqc::Kem as _;
    use crate::crypto::pqc::Signature as _;
    use crate::crypto::prng::Prng;
    use crate::crypto::pqclean::Dilithium3;
    use crate::crypto::pqclean::Kyber512;
    use crate::crypto::testdata;
    use crate::hardware::fake;
    use crate::net::InMemHost;

    struct Rig {
        trigger: fake::Trigger,
        rng: Prng,
        signature: Dilithium3,
        kem: Kyber512,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                trigger: fake::Trigger::new(),
                rng: Prng::from_seed(&[0x17; 32]),
                signature: Dilithium3::new(),
                kem: Kyber512::new(),
            }
        }

        fn options(&mut self) -> Options<'_> {
            Options {
                trigger: &mut self.trigger,
                rng: &mut self.rng,
                signature: &mut self.signature,
                kem: &mut self.kem,
            }
        }
    }

    fn exchange(board: &mut Pqc, input: &[u8]) -> Vec<u8> {
        let mut out = vec![0; 8192];
        let mut port = InMemHost::new(input, &mut out);
        while port.pending() > 0 {
            if let Err(e) = board.process_request(&mut port) {
                if matches!(e.into_inner(), Error::Network(_)) {
                    break;
                }
            }
        }
        port.sent().to_vec()
    }

    #[test]
    fn fixed_replies() {
        let mut rig = Rig::new();
        let sent = {
            let mut board = Pqc::new(rig.options());
            exchange(&mut board, &[0x03, 0x90, 0x94, 0xf1, 0x44])
        };
        let mut expected = vec![0x20, 0x03, 0x60, 0x06, 3, 0xa0, 0x07, 0xb0, 0x0f];
        expected.extend_from_slice(&protocol::VERSION);
        expected.extend_from_slice(&protocol::BAD_COMMAND);
        assert_eq!(sent, expected);
        // Nothing here is bracketed; not even the default reply.
        assert!(rig.trigger.edges.is_empty());
    }

    #[test]
    fn sign_then_verify() {
        let mut keygen_rng = Prng::from_seed(&[1; 32]);
        let mut pk = [0; pqc::SIG_PUBLIC_KEY_LEN];
        let mut sk = [0; pqc::SIG_PRIVATE_KEY_LEN];
        Dilithium3::new()
            .keypair(&mut keygen_rng, &mut pk, &mut sk)
            .unwrap();

        let mut rig = Rig::new();
        let mut board = Pqc::new(rig.options());

        let sent = exchange(&mut board, &[&[0x91][..], &pk, &sk].concat());
        assert_eq!(sent, vec![STATUS_OK]);

        let message = [0x5c; pqc::SIG_MESSAGE_LEN];
        let sent = exchange(&mut board, &[&[0x93][..], &message].concat());
        assert_eq!(sent.len(), 1 + pqc::SIG_LEN);
        assert_eq!(sent[0], STATUS_OK);

        let mut signed = [&[0x92][..], &sent[1..], &message].concat();
        let sent = exchange(&mut board, &signed);
        assert_eq!(sent, vec![STATUS_OK]);

        *signed.last_mut().unwrap() ^= 0x01;
        let sent = exchange(&mut board, &signed);
        assert_eq!(sent, vec![STATUS_FAILED]);
    }

    #[test]
    fn generate_then_decode() {
        let mut keygen_rng = Prng::from_seed(&[2; 32]);
        let mut pk = [0; pqc::KEM_PUBLIC_KEY_LEN];
        let mut sk = [0; pqc::KEM_PRIVATE_KEY_LEN];
        let mut kem = Kyber512::new();
        kem.keypair(&mut keygen_rng, &mut pk, &mut sk).unwrap();

        let mut rig = Rig::new();
        let mut board = Pqc::new(rig.options());
        let sent = exchange(&mut board, &[&[0x02][..], &pk, &sk].concat());
        assert_eq!(sent, vec![STATUS_OK]);

        let sent = exchange(&mut board, &[0x04]);
        assert_eq!(sent.len(), 1 + 32 + 768);
        assert_eq!(sent[0], STATUS_OK);
        let (secret, ciphertext) = sent[1..].split_at(32);

        let decoded = exchange(&mut board, &[&[0x05][..], ciphertext].concat());
        assert_eq!(decoded, [&[STATUS_OK][..], secret].concat());

        // A ciphertext made elsewhere decodes to the same secret.
        let mut secret = [0; pqc::KEM_SHARED_SECRET_LEN];
        let mut ciphertext = [0; pqc::KEM_CIPHERTEXT_LEN];
        kem.encapsulate(&pk, &mut keygen_rng, &mut secret, &mut ciphertext)
            .unwrap();
        let decoded = exchange(&mut board, &[&[0x05][..], &ciphertext].concat());
        assert_eq!(decoded, [&[STATUS_OK][..], &secret].concat());
    }

    #[test]
    fn decodes_reference_ciphertext() {
        let mut rig = Rig::new();
        let mut board = Pqc::new(rig.options());
        let keys = [&[0x02][..], testdata::KYBER512_PK, testdata::KYBER512_SK].concat();
        let sent = exchange(&mut board, &keys);
        assert_eq!(sent, vec![STATUS_OK]);

        let decoded = exchange(&mut board, &[&[0x05][..], testdata::KYBER512_CT].concat());
        assert_eq!(decoded, [&[STATUS_OK][..], testdata::KYBER512_SS].concat());
    }

    #[test]
    fn operations_are_bracketed() {
        let mut rig = Rig::new();
        {
            let mut board = Pqc::new(rig.options());
            let mut input = vec![0x04, 0x93];
            input.extend_from_slice(&[0; pqc::SIG_MESSAGE_LEN]);
            exchange(&mut board, &input);
        }
        assert_eq!(rig.trigger.windows(Line::Main), 2);
    }
}

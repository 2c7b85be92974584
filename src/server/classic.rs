// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The classical Pinata board.
//!
//! This module provides the command loop of the classical firmware: the
//! instrumented software ciphers, the crypto peripheral, the RSA and ECC
//! modules, and the fault-injection targets. See [`protocol::classic`] for
//! the wire format of each command.
//!
//! [`protocol::classic`]: crate::protocol::classic

use core::convert::Infallible;

use arrayvec::ArrayVec;

use crate::cipher::aes;
use crate::cipher::aes::ttable;
use crate::cipher::des;
use crate::cipher::guard;
use crate::cipher::present;
use crate::cipher::sm4;
use crate::cipher::tea;
use crate::cipher::Countermeasure;
use crate::cipher::Direction;
use crate::crypto::csrng::Csrng;
use crate::crypto::ecc;
use crate::crypto::prng::Prng;
use crate::crypto::rsa;
use crate::fault;
use crate::fault::Injector;
use crate::fault::Site;
use crate::fault::Verdict;
use crate::hardware::Clock;
use crate::hardware::CryptoEngine;
use crate::hardware::Display;
use crate::hardware::Identity;
use crate::hardware::Line;
use crate::hardware::Trigger;
use crate::net;
use crate::protocol;
use crate::protocol::classic::Opcode;
use crate::protocol::classic::MAX_REQUEST_LEN;
use crate::server::handler::Context;
use crate::server::handler::Handler;
use crate::server::Error;
use crate::session::Auth;
use crate::session::SessionState;
use crate::Result;

/// The first line shown after a clean boot.
const BOOT_OK: &[u8] = b"Boot check ok        ";

/// The first line shown after a glitched boot.
const BOOT_GLITCHED: &[u8] = b"Boot check glitched!!";

/// The banner shown below the boot check result.
const BANNER: &[u8] = b"Pinata Board 3.2     (c)Riscure 2018";

/// The room set aside for output from the RSA module.
const RSA_REPLY_LEN: usize = 256;

/// Options struct for initializing a [`Classic`] board.
pub struct Options<'a> {
    /// The trigger outputs.
    pub trigger: &'a mut dyn Trigger,
    /// The entropy source: the TRNG, on the board.
    pub rng: &'a mut dyn Csrng,
    /// The clock tree.
    pub clock: &'a mut dyn Clock,
    /// The status display.
    pub display: &'a mut dyn Display,
    /// The unique-ID registers.
    pub identity: &'a mut dyn Identity,
    /// Simulated faults; [`fault::NoFaults`] outside of tests.
    pub faults: &'a mut dyn Injector,

    /// The crypto peripheral, if the board has one.
    pub engine: Option<&'a mut dyn CryptoEngine>,
    /// The RSA module, if linked in.
    pub rsa: Option<&'a mut dyn rsa::Rsa>,
    /// The Curve25519 module, if linked in.
    pub ecc: Option<&'a mut dyn ecc::Curve25519>,
}

/// Everything a handler may touch.
struct Board<'a> {
    opts: Options<'a>,
    session: SessionState,
}

/// The classical board.
///
/// This type implements the request -> response "business logic" of the
/// classical firmware. It owns the session; the hardware it drives is
/// borrowed through [`Options`].
pub struct Classic<'a> {
    board: Board<'a>,
    req: ArrayVec<u8, MAX_REQUEST_LEN>,
    ok_count: u32,
    err_count: u32,
}

impl<'a> Classic<'a> {
    /// Boots a new board with the given `Options`.
    ///
    /// This runs the boot check, with the auxiliary trigger raised around
    /// it, and shows its result on the display. The session starts out with
    /// every key at its default.
    pub fn new(opts: Options<'a>) -> Self {
        let faults = &mut *opts.faults;
        let glitched = opts
            .trigger
            .window(Line::Aux, || fault::boot_check(faults));
        if glitched {
            warn!("boot check glitched");
            opts.display.show(BOOT_GLITCHED);
        } else {
            info!("boot check ok");
            opts.display.show(BOOT_OK);
        }
        opts.display.show(BANNER);

        Self {
            board: Board {
                opts,
                session: SessionState::new(glitched),
            },
            req: ArrayVec::new(),
            ok_count: 0,
            err_count: 0,
        }
    }

    /// Returns the board's session.
    pub fn session(&self) -> &SessionState {
        &self.board.session
    }

    /// Returns how many requests succeeded and how many failed so far.
    pub fn counters(&self) -> (u32, u32) {
        (self.ok_count, self.err_count)
    }

    /// Serves requests until the host goes away.
    ///
    /// If a fault breaks the board out of its request loop, it repeats
    /// [`protocol::classic::HALTED`] until sending fails.
    pub fn run(
        &mut self,
        host_port: &mut dyn net::HostPort,
    ) -> Result<Infallible, Error> {
        while !self.board.opts.faults.escape(Site::MainLoop) {
            match self.process_request(host_port) {
                Err(e) if matches!(e.as_ref(), Error::Network(_)) => return Err(e),
                _ => {}
            }
        }

        warn!("request loop escaped");
        loop {
            host_port.send(&protocol::classic::HALTED)?;
        }
    }

    /// Process a single incoming request.
    ///
    /// An opcode the board does not know (or has no module for) is answered
    /// with the default reply, and is not an error.
    #[cfg_attr(test, inline(never))]
    pub fn process_request(
        &mut self,
        host_port: &mut dyn net::HostPort,
    ) -> Result<(), Error> {
        let result = match self.handler().run(&mut self.board, &mut self.req, host_port) {
            Err(e) if matches!(e.as_ref(), Error::UnhandledCommand(_)) => {
                trace!("default reply for {:?}", e);
                self.board.default_reply(host_port)
            }
            result => result.map(|_| ()),
        };

        match result {
            Ok(_) => self.ok_count += 1,
            Err(_) => self.err_count += 1,
        }
        result
    }

    fn handler(&self) -> Handler<Opcode, Board<'a>> {
        let handler = Handler::<Opcode, Board<'a>>::new()
            .handle(Opcode::DesEnc, |ctx| {
                bracketed(ctx, |s, b| des::encrypt(&s.des_key, b))
            })
            .handle(Opcode::DesDec, |ctx| {
                bracketed(ctx, |s, b| des::decrypt(&s.des_key, b))
            })
            .handle(Opcode::TdesEnc, |ctx| {
                bracketed(ctx, |s, b| des::tdes_encrypt(&s.tdes_key, b))
            })
            .handle(Opcode::TdesDec, |ctx| {
                bracketed(ctx, |s, b| des::tdes_decrypt(&s.tdes_key, b))
            })
            .handle(Opcode::DesEncRndDelays, |ctx| {
                des_with(ctx, Countermeasure::RandomDelays)
            })
            .handle(Opcode::DesEncRndSbox, |ctx| {
                des_with(ctx, Countermeasure::RandomSboxOrder)
            })
            .handle(Opcode::DesEncMisaligned, |ctx| {
                des_with(ctx, Countermeasure::Misaligned)
            })
            .handle(Opcode::DesEncDummyRounds, |ctx| {
                des_with(ctx, Countermeasure::DummyRounds)
            })
            .handle(Opcode::DesEncDoubleCheck, |ctx| {
                let block = ctx.field::<8>(0)?;
                let Board { opts, session } = ctx.server;
                let out =
                    guard::des_encrypt(&session.des_key, block, opts.trigger, opts.faults);
                if let Some(out) = out {
                    ctx.reply.send(&out)?;
                }
                Ok(())
            })
            .handle(Opcode::Aes128Enc, |ctx| {
                aes_with(ctx, Direction::Encrypt, Countermeasure::Baseline)
            })
            .handle(Opcode::Aes128Dec, |ctx| {
                aes_with(ctx, Direction::Decrypt, Countermeasure::Baseline)
            })
            .handle(Opcode::Aes128SpiEnc, |ctx| {
                let mut block = *ctx.field::<16>(0)?;
                let Board { opts, session } = ctx.server;
                opts.display.spi_write(&protocol::classic::SPI_PREAMBLE);
                aes::encrypt(&session.aes_key, &mut block);
                ctx.reply.send(&block)?;
                Ok(())
            })
            .handle(Opcode::Aes128EncMasked, |ctx| {
                aes_with(ctx, Direction::Encrypt, Countermeasure::Masked)
            })
            .handle(Opcode::Aes128DecMasked, |ctx| {
                aes_with(ctx, Direction::Decrypt, Countermeasure::Masked)
            })
            .handle(Opcode::Aes128EncRndDelays, |ctx| {
                aes_with(ctx, Direction::Encrypt, Countermeasure::RandomDelays)
            })
            .handle(Opcode::Aes128EncRndSbox, |ctx| {
                aes_with(ctx, Direction::Encrypt, Countermeasure::RandomSboxOrder)
            })
            .handle(Opcode::Aes128EncMisaligned, |ctx| {
                aes_with(ctx, Direction::Encrypt, Countermeasure::Misaligned)
            })
            .handle(Opcode::Aes128EncDummyRounds, |ctx| {
                aes_with(ctx, Direction::Encrypt, Countermeasure::DummyRounds)
            })
            .handle(Opcode::Aes128TtablesEnc, |ctx| {
                let key = ttable::EncryptKey::new(&ctx.server.session.aes_key);
                bracketed(ctx, |_, b| key.encrypt(b))
            })
            .handle(Opcode::Aes128TtablesDec, |ctx| {
                let key = ttable::DecryptKey::new(&ctx.server.session.aes_key);
                bracketed(ctx, |_, b| key.decrypt(b))
            })
            .handle(Opcode::Aes128EncDoubleCheck, |ctx| {
                let block = ctx.field::<16>(0)?;
                let Board { opts, session } = ctx.server;
                let out = guard::aes_encrypt(
                    &session.aes_key,
                    block,
                    opts.trigger,
                    opts.rng,
                    opts.faults,
                )?;
                if let Some(out) = out {
                    ctx.reply.send(&out)?;
                }
                Ok(())
            })
            .handle(Opcode::Aes256Enc, |ctx| {
                bracketed(ctx, |s, b| s.aes256().encrypt(b))
            })
            .handle(Opcode::Aes256Dec, |ctx| {
                bracketed(ctx, |s, b| s.aes256().decrypt(b))
            })
            .handle(Opcode::Sm4Enc, |ctx| {
                let key = sm4::Sm4::new(&ctx.server.session.sm4_key, Direction::Encrypt);
                bracketed(ctx, |_, b| key.crypt(b))
            })
            .handle(Opcode::Sm4Dec, |ctx| {
                let key = sm4::Sm4::new(&ctx.server.session.sm4_key, Direction::Decrypt);
                bracketed(ctx, |_, b| key.crypt(b))
            })
            .handle(Opcode::Sm4OsslEnc, |ctx| {
                let key = sm4::TableKey::new(&ctx.server.session.sm4_key);
                bracketed(ctx, |_, b| key.encrypt(b))
            })
            .handle(Opcode::Sm4OsslDec, |ctx| {
                let key = sm4::TableKey::new(&ctx.server.session.sm4_key);
                bracketed(ctx, |_, b| key.decrypt(b))
            })
            .handle(Opcode::TeaEnc, |ctx| tea_op(ctx, tea::tea_encrypt))
            .handle(Opcode::TeaDec, |ctx| tea_op(ctx, tea::tea_decrypt))
            .handle(Opcode::XteaEnc, |ctx| tea_op(ctx, tea::xtea_encrypt))
            .handle(Opcode::XteaDec, |ctx| tea_op(ctx, tea::xtea_decrypt))
            .handle(Opcode::Present80Enc, |ctx| {
                bracketed(ctx, |s, b| present::encrypt80(&s.present80_key, b))
            })
            .handle(Opcode::Present80Dec, |ctx| {
                bracketed(ctx, |s, b| present::decrypt80(&s.present80_key, b))
            })
            .handle(Opcode::Present128Enc, |ctx| {
                bracketed(ctx, |s, b| present::encrypt128(&s.present128_key, b))
            })
            .handle(Opcode::Present128Dec, |ctx| {
                bracketed(ctx, |s, b| present::decrypt128(&s.present128_key, b))
            })
            .handle(Opcode::HwAes128Enc, |ctx| hw_aes(ctx, Direction::Encrypt, false))
            .handle(Opcode::HwAes128Dec, |ctx| hw_aes(ctx, Direction::Decrypt, false))
            .handle(Opcode::HwAes256Enc, |ctx| hw_aes(ctx, Direction::Encrypt, true))
            .handle(Opcode::HwAes256Dec, |ctx| hw_aes(ctx, Direction::Decrypt, true))
            .handle(Opcode::HwDesEnc, |ctx| hw_des(ctx, Direction::Encrypt, false))
            .handle(Opcode::HwDesDec, |ctx| hw_des(ctx, Direction::Decrypt, false))
            .handle(Opcode::HwTdesEnc, |ctx| hw_des(ctx, Direction::Encrypt, true))
            .handle(Opcode::HwTdesDec, |ctx| hw_des(ctx, Direction::Decrypt, true))
            .handle(Opcode::Sha1Hash, |ctx| {
                let iterations = ctx.be::<u32>(0)?;
                let message = ctx.field::<16>(4)?;
                let Board { opts, .. } = ctx.server;
                let mut digest = [b'0'; 20];
                if let Some(engine) = opts.engine.as_deref_mut() {
                    let mut out = [0; 20];
                    let result = opts
                        .trigger
                        .window(Line::Main, || engine.sha1(message, iterations, &mut out));
                    if result.is_ok() {
                        digest = out;
                    }
                }
                ctx.reply.send(&digest)?;
                Ok(())
            })
            .handle(Opcode::HmacSha1, |ctx| {
                let iterations = ctx.be::<u32>(0)?;
                let message = ctx.field::<20>(4)?;
                let Board { opts, session } = ctx.server;
                let mut digest = [b'0'; 20];
                if let Some(engine) = opts.engine.as_deref_mut() {
                    let mut out = [0; 20];
                    let result = engine.hmac_sha1(
                        &session.tdes_key,
                        message,
                        iterations,
                        &mut out,
                        opts.trigger,
                    );
                    if result.is_ok() {
                        digest = out;
                    }
                }
                ctx.reply.send(&digest)?;
                Ok(())
            })
            .handle(Opcode::Md5Hash, |ctx| {
                let message = ctx.req;
                let Board { opts, .. } = ctx.server;
                let mut digest = [b'0'; 16];
                if let Some(engine) = opts.engine.as_deref_mut() {
                    let mut out = [0; 16];
                    let result = opts
                        .trigger
                        .window(Line::Main, || engine.md5(message, &mut out));
                    if result.is_ok() {
                        digest = out;
                    }
                }
                ctx.reply.send(&digest)?;
                Ok(())
            })
            .handle(Opcode::GetRandomFromTrng, |ctx| {
                let Board { opts, .. } = ctx.server;
                let rng = &mut *opts.rng;
                let word = opts.trigger.window(Line::Main, || rng.next_u32())?;
                ctx.reply.send_be(word)?;
                Ok(())
            })
            .handle(Opcode::UidViaIo, |ctx| {
                let Board { opts, .. } = ctx.server;
                let identity = &mut *opts.identity;
                let uid = opts
                    .trigger
                    .window(Line::Main, || identity.unique_device_identity());
                for word in &uid {
                    ctx.reply.send_be(*word)?;
                }
                Ok(())
            })
            .handle(Opcode::TdesKeyChange, |ctx| {
                let key = ctx.field::<24>(0)?;
                let Board { opts, session } = ctx.server;
                opts.trigger.window(Line::Main, || session.tdes_key = *key);
                ctx.reply.send(&session.tdes_key)?;
                Ok(())
            })
            .handle(Opcode::DesKeyChange, |ctx| {
                let key = ctx.field::<8>(0)?;
                let Board { opts, session } = ctx.server;
                opts.trigger.window(Line::Main, || session.des_key = *key);
                ctx.reply.send(&session.des_key)?;
                Ok(())
            })
            .handle(Opcode::Aes128KeyChange, |ctx| {
                let key = ctx.field::<16>(0)?;
                let Board { opts, session } = ctx.server;
                opts.trigger.window(Line::Main, || session.aes_key = *key);
                ctx.reply.send(&session.aes_key)?;
                Ok(())
            })
            .handle(Opcode::Aes256KeyChange, |ctx| {
                let key = ctx.field::<32>(0)?;
                let Board { opts, session } = ctx.server;
                opts.trigger
                    .window(Line::Main, || session.set_aes256_key(key));
                ctx.reply.send(session.aes256().key())?;
                Ok(())
            })
            .handle(Opcode::Sm4KeyChange, |ctx| {
                let key = ctx.field::<16>(0)?;
                let Board { opts, session } = ctx.server;
                opts.trigger.window(Line::Main, || session.sm4_key = *key);
                ctx.reply.send(&session.sm4_key)?;
                Ok(())
            })
            .handle(Opcode::TeaKeyChange, |ctx| {
                let mut key = [0; 4];
                for (i, word) in key.iter_mut().enumerate() {
                    *word = ctx.be::<u32>(4 * i)?;
                }
                let Board { opts, session } = ctx.server;
                opts.trigger.window(Line::Main, || session.tea_key = key);
                for word in &session.tea_key {
                    ctx.reply.send_be(*word)?;
                }
                Ok(())
            })
            .handle(Opcode::SoftwareKeyCopy, |ctx| {
                let key = ctx.field::<16>(0)?;
                let Board { opts, .. } = ctx.server;
                let copy = opts.trigger.window(Line::Main, || fault::key_copy(key));
                ctx.reply.send(&copy)?;
                Ok(())
            })
            .handle(Opcode::InfiniteFiLoop, |ctx| {
                let board = ctx.server;
                board.opts.trigger.assert_trigger(Line::Main);
                fault::infinite_loop(board.opts.display, board.opts.faults);
                board.opts.trigger.deassert_trigger(Line::Main);
                ctx.reply.send(&fault::ESCAPED)?;
                Ok(())
            })
            .handle(Opcode::LoopTestFi, |ctx| {
                let count = ctx.be::<u16>(0)?;
                let Board { opts, .. } = ctx.server;
                let faults = &mut *opts.faults;
                let counters = opts
                    .trigger
                    .window(Line::Main, || fault::loop_test(count, faults));
                ctx.reply.send(&counters)?;
                Ok(())
            })
            .handle(Opcode::SinglePwdCheckFi, |ctx| {
                password_check(ctx, fault::single_password_check)
            })
            .handle(Opcode::DoublePwdCheckFi, |ctx| {
                password_check(ctx, fault::double_password_check)
            })
            .handle(Opcode::PwdChange, |ctx| {
                let password = ctx.field::<4>(0)?;
                let Board { opts, session } = ctx.server;
                session.auth = Auth::None;
                opts.trigger
                    .window(Line::Main, || session.password = *password);
                ctx.reply.send(&session.password)?;
                Ok(())
            })
            .handle(Opcode::GetCodeRev, |ctx| {
                ctx.reply.send(&protocol::VERSION)?;
                Ok(())
            })
            .handle(Opcode::ChangeClkSpeed, |ctx| {
                let mhz = match ctx.field::<1>(0)? {
                    [mhz @ 30] | [mhz @ 84] => *mhz,
                    _ => 168,
                };
                ctx.server.opts.clock.set_pll(mhz);
                info!("clock set to {}MHz", mhz);
                ctx.reply.send(&[mhz])?;
                Ok(())
            })
            .handle(Opcode::SetExternalClock, |ctx| {
                let bypass = ctx.field::<1>(0)? == &[0];
                let clock = &mut *ctx.server.opts.clock;
                if bypass {
                    clock.set_bypass();
                } else {
                    clock.set_pll(168);
                }
                ctx.reply.send(&[clock.source() as u8])?;
                Ok(())
            });

        let handler = if self.board.opts.rsa.is_some() {
            handler
                .handle(Opcode::RsaCrt1024Dec, |ctx| {
                    rsa_op(ctx, |rsa, req, trigger, out| {
                        rsa.crt_decrypt(req, trigger, out)
                    })
                })
                .handle(Opcode::RsaSfmDec, |ctx| {
                    rsa_op(ctx, |rsa, req, trigger, out| {
                        rsa.sfm_decrypt(req, trigger, out)
                    })
                })
                .handle(Opcode::RsaSfmGetHardcodedKey, |ctx| {
                    rsa_op(ctx, |rsa, _, _, out| rsa.sfm_hardcoded_key(out))
                })
                .handle(Opcode::RsaSfmSetD, |ctx| {
                    if let Some(rsa) = ctx.server.opts.rsa.as_deref_mut() {
                        if rsa.sfm_set_exponent(ctx.req).is_err() {
                            warn!("RSA module rejected the new exponent");
                        }
                    }
                    ctx.reply.send(&[Opcode::RsaSfmSetD as u8])?;
                    Ok(())
                })
                .handle(Opcode::RsaSfmSetKeyGenerationMethod, |ctx| {
                    let method = ctx.field::<1>(0)?;
                    if let Some(rsa) = ctx.server.opts.rsa.as_deref_mut() {
                        rsa.sfm_set_key_generation(method[0]);
                    }
                    ctx.reply.send(method)?;
                    Ok(())
                })
                .handle(Opcode::RsaSfmSetImplementation, |ctx| {
                    let method = ctx.field::<1>(0)?;
                    if let Some(rsa) = ctx.server.opts.rsa.as_deref_mut() {
                        rsa.sfm_set_implementation(method[0]);
                    }
                    ctx.reply.send(method)?;
                    Ok(())
                })
        } else {
            handler
        };

        if self.board.opts.ecc.is_some() {
            handler.handle(Opcode::Ecc25519ScalarMult, |ctx| {
                let key = ctx.field::<16>(0)?;
                let iv = ctx.field::<16>(16)?;
                let scalar = ctx.field::<{ ecc::SCALAR_LEN }>(32)?;
                let point = ctx.field::<{ ecc::POINT_LEN }>(64)?;
                let Board { opts, .. } = ctx.server;

                let mut prng = Prng::new(key, iv);
                let mut out = [0; ecc::POINT_LEN];
                let result = match opts.ecc.as_deref_mut() {
                    Some(ecc) => opts.trigger.window(Line::Main, || {
                        ecc.scalar_mult(scalar, point, &mut prng, &mut out)
                    }),
                    None => Ok(()),
                };
                if result.is_err() {
                    out = [b'0'; ecc::POINT_LEN];
                }
                ctx.reply.send(&out)?;
                Ok(())
            })
        } else {
            handler
        }
    }
}

impl Board<'_> {
    /// Answers an opcode nobody handles, inside a trigger window.
    fn default_reply(&mut self, host_port: &mut dyn net::HostPort) -> Result<(), Error> {
        let reply = if self.session.boot_glitched {
            &protocol::classic::GLITCHED_BOOT
        } else if self.session.auth == Auth::Ok {
            &protocol::classic::AUTHENTICATED
        } else {
            &protocol::BAD_COMMAND
        };

        self.opts.trigger.assert_trigger(Line::Main);
        let result = host_port.send(reply);
        self.opts.trigger.deassert_trigger(Line::Main);
        result?;
        Ok(())
    }
}

/// Runs `f` on the request block inside the main trigger window, and sends
/// back the result.
fn bracketed<F, const N: usize>(ctx: Context<'_, '_, Board<'_>>, f: F) -> Result<(), Error>
where
    F: FnOnce(&SessionState, &mut [u8; N]),
{
    let mut block = *ctx.field::<N>(0)?;
    let Board { opts, session } = ctx.server;
    let session = &*session;
    opts.trigger.window(Line::Main, || f(session, &mut block));
    ctx.reply.send(&block)?;
    Ok(())
}

fn des_with(
    ctx: Context<'_, '_, Board<'_>>,
    countermeasure: Countermeasure,
) -> Result<(), Error> {
    let mut block = *ctx.field::<{ des::BLOCK_LEN }>(0)?;
    let Board { opts, session } = ctx.server;
    let key = session.des_key;
    let rng = &mut *opts.rng;
    let dummy = &mut session.des_dummy;
    opts.trigger.window(Line::Main, || {
        des::encrypt_with(&key, &mut block, countermeasure, rng, dummy)
    })?;
    ctx.reply.send(&block)?;
    Ok(())
}

fn aes_with(
    ctx: Context<'_, '_, Board<'_>>,
    direction: Direction,
    countermeasure: Countermeasure,
) -> Result<(), Error> {
    let mut block = *ctx.field::<{ aes::BLOCK_LEN }>(0)?;
    let Board { opts, session } = ctx.server;
    match direction {
        Direction::Encrypt => aes::encrypt_with(
            &session.aes_key,
            &mut block,
            countermeasure,
            opts.trigger,
            opts.rng,
        )?,
        Direction::Decrypt => aes::decrypt_with(
            &session.aes_key,
            &mut block,
            countermeasure,
            opts.trigger,
            opts.rng,
        )?,
    }
    ctx.reply.send(&block)?;
    Ok(())
}

fn tea_op(
    ctx: Context<'_, '_, Board<'_>>,
    f: fn(&mut tea::Block, &tea::Key),
) -> Result<(), Error> {
    let mut v = [
        ctx.be::<u32>(0)?,
        ctx.be::<u32>(4)?,
    ];
    let Board { opts, session } = ctx.server;
    let key = session.tea_key;
    opts.trigger.window(Line::Main, || f(&mut v, &key));
    for word in &v {
        ctx.reply.send_be(*word)?;
    }
    Ok(())
}

fn hw_aes(
    ctx: Context<'_, '_, Board<'_>>,
    direction: Direction,
    wide: bool,
) -> Result<(), Error> {
    let mut block = *ctx.field::<16>(0)?;
    let Board { opts, session } = ctx.server;
    let key: &[u8] = if wide {
        session.aes256().key()
    } else {
        &session.aes_key
    };
    let ok = match opts.engine.as_deref_mut() {
        Some(engine) => engine
            .aes_ecb(direction, key, &mut block, opts.trigger)
            .is_ok(),
        None => false,
    };
    if !ok {
        block = [b'0'; 16];
    }
    ctx.reply.send(&block)?;
    Ok(())
}

fn hw_des(
    ctx: Context<'_, '_, Board<'_>>,
    direction: Direction,
    triple: bool,
) -> Result<(), Error> {
    let mut block = *ctx.field::<8>(0)?;
    let Board { opts, session } = ctx.server;
    let key: &[u8] = if triple {
        &session.tdes_key
    } else {
        &session.des_key
    };
    let ok = match opts.engine.as_deref_mut() {
        Some(engine) => engine
            .des_ecb(direction, key, &mut block, opts.trigger)
            .is_ok(),
        None => false,
    };
    if !ok {
        block = [b'0'; 8];
    }
    ctx.reply.send(&block)?;
    Ok(())
}

/// Checks a password attempt; the trigger window covers both the check and
/// the status reply.
fn password_check(
    ctx: Context<'_, '_, Board<'_>>,
    check: fn(&[u8; 4], &[u8; 4], &mut dyn Injector) -> Verdict,
) -> Result<(), Error> {
    let attempt = ctx.field::<4>(0)?;
    let Board { opts, session } = ctx.server;
    session.auth = Auth::None;

    opts.trigger.assert_trigger(Line::Main);
    let verdict = check(&session.password, attempt, opts.faults);
    if verdict == Verdict::Granted {
        session.auth = Auth::Ok;
    }
    let result = ctx.reply.send(&verdict.status());
    opts.trigger.deassert_trigger(Line::Main);

    result?;
    Ok(())
}

type RsaFn = fn(
    &mut dyn rsa::Rsa,
    &[u8],
    &mut dyn Trigger,
    &mut dyn crate::io::Write,
) -> crate::Result<(), rsa::Error>;

/// Runs an RSA operation that produces output, and sends whatever it wrote.
///
/// If the module fails, nothing is sent.
fn rsa_op(ctx: Context<'_, '_, Board<'_>>, f: RsaFn) -> Result<(), Error> {
    let req = ctx.req;
    let Board { opts, .. } = ctx.server;
    let rsa = match opts.rsa.as_deref_mut() {
        Some(rsa) => rsa,
        None => return Ok(()),
    };

    let mut buf = [0; RSA_REPLY_LEN];
    let mut out = &mut buf[..];
    let result = f(rsa, req, opts.trigger, &mut out);
    let written = RSA_REPLY_LEN - out.len();
    match result {
        Ok(()) => ctx.reply.send(&buf[..written])?,
        Err(_) => {
            warn!("RSA module failed; sending nothing");
        }
    }
    Ok(())
}

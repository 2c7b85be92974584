// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width integers, in either byte order.
//!
//! The board protocol is mixed-endian: key-size queries answer in
//! little-endian, while length prefixes, iteration counts, TEA key words, and
//! TRNG/UID words travel in big-endian.

use byteorder::ByteOrder;

/// The width of the widest [`Int`], in bytes.
pub const MAX_LEN: usize = 8;

/// An unsigned integer that packs into, and unpacks from, exactly
/// [`Int::LEN`] bytes.
///
/// Both functions expect a slice of exactly that length; callers cut it out
/// of a buffer of known size.
/// ```
/// # use pinata::io::Int;
/// use byteorder::{BE, LE};
///
/// let mut bytes = [0; 2];
/// 168u16.pack::<BE>(&mut bytes);
/// assert_eq!(bytes, [0x00, 0xa8]);
/// assert_eq!(u16::unpack::<LE>(&bytes), 0xa800);
/// ```
pub trait Int: Sized + Copy {
    /// The width of `Self`, in bytes.
    const LEN: usize;

    /// Reads `Self` out of `bytes` in byte order `O`.
    fn unpack<O: ByteOrder>(bytes: &[u8]) -> Self;

    /// Writes `self` into `out` in byte order `O`.
    fn pack<O: ByteOrder>(self, out: &mut [u8]);
}

impl Int for u8 {
    const LEN: usize = 1;

    #[inline]
    fn unpack<O: ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline]
    fn pack<O: ByteOrder>(self, out: &mut [u8]) {
        out[0] = self;
    }
}

macro_rules! int_impls {
    ($($ty:ty => $read:ident, $write:ident;)*) => {$(
        impl Int for $ty {
            const LEN: usize = core::mem::size_of::<$ty>();

            #[inline]
            fn unpack<O: ByteOrder>(bytes: &[u8]) -> Self {
                O::$read(bytes)
            }

            #[inline]
            fn pack<O: ByteOrder>(self, out: &mut [u8]) {
                O::$write(out, self)
            }
        }
    )*};
}

int_impls! {
    u16 => read_u16, write_u16;
    u32 => read_u32, write_u32;
    u64 => read_u64, write_u64;
}

#[cfg(test)]
mod test {
    use super::*;
    use byteorder::BE;
    use byteorder::LE;

    #[test]
    fn trng_word_order() {
        let mut word = [0; 4];
        0xcafe_babe_u32.pack::<BE>(&mut word);
        assert_eq!(word, [0xca, 0xfe, 0xba, 0xbe]);
        assert_eq!(u32::unpack::<LE>(&word), 0xbeba_feca);
    }

    #[test]
    fn widths() {
        assert_eq!(<u8 as Int>::LEN, 1);
        assert_eq!(<u64 as Int>::LEN, MAX_LEN);

        let mut sizes = [0; 4];
        1952u16.pack::<LE>(&mut sizes[..2]);
        4016u16.pack::<LE>(&mut sizes[2..]);
        assert_eq!(sizes, [0xa0, 0x07, 0xb0, 0x0f]);
    }
}

// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Provides the [`Write`] trait, a byte sink for module output.

use core::mem;

use static_assertions::assert_obj_safe;

use crate::io;
use crate::Result;

/// A place bytes can be appended to, such as the unwritten tail of a
/// `&mut [u8]`.
///
/// Writes are all-or-nothing: a write that does not fit changes nothing.
pub trait Write {
    /// Appends all of `buf`.
    fn write_bytes(&mut self, buf: &[u8]) -> Result<(), io::Error>;
}
assert_obj_safe!(Write);

/// Writing to a `&mut [u8]` fills it from the front, and shrinks it to the
/// part still unwritten.
impl Write for &'_ mut [u8] {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<(), io::Error> {
        check!(self.len() >= buf.len(), io::Error::BufferExhausted);

        let (dest, rest) = mem::replace(self, &mut []).split_at_mut(buf.len());
        dest.copy_from_slice(buf);
        *self = rest;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fills_from_the_front() {
        let mut buf = [0; 6];
        let mut tail = &mut buf[..];
        tail.write_bytes(b"Pin").unwrap();
        tail.write_bytes(b"at").unwrap();
        assert_eq!(tail.len(), 1);
        assert!(tail.write_bytes(b"a!").is_err());
        assert_eq!(tail.len(), 1);
        tail.write_bytes(b"a").unwrap();
        assert_eq!(&buf, b"Pinata");
    }

    #[test]
    fn as_a_trait_object() {
        let mut buf = [0; 4];
        let mut tail = &mut buf[..];
        let sink: &mut dyn Write = &mut tail;
        sink.write_bytes(&[0xde, 0xad]).unwrap();
        sink.write_bytes(&[0xbe, 0xef]).unwrap();
        assert!(sink.write_bytes(&[0]).is_err());
        assert_eq!(buf, [0xde, 0xad, 0xbe, 0xef]);
    }
}

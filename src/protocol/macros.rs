// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Macros for generating protocol-related enums.

/// Convenience macro for generating a command set: an opcode enum, together
/// with the request and response shape of every opcode.
///
/// Syntax:
/// ```text
/// command_set! {
///     /// My opcodes.
///     pub enum Opcode {
///         /// Does a thing.
///         DoThing = 0x01 => (Request::Fixed(8), Response::Fixed(8)),
///         // more opcodes ...
///     }
/// }
/// ```
/// Each shape is an expression of type `(Request, Response)`, evaluated at
/// the invocation site. Besides [`CommandSet`], the generated enum parses
/// from and prints as its variant names.
///
/// [`CommandSet`]: crate::protocol::CommandSet
macro_rules! command_set {
    ($(#[$meta:meta])* $vis:vis enum $name:ident {
        $($(#[$meta_variant:meta])* $variant:ident = $value:tt => $shape:expr,)*
    }) => {
        $(#[$meta])*
        #[repr(u8)]
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $($(#[$meta_variant])* $variant = $value,)*
        }

        impl $crate::protocol::CommandSet for $name {
            fn byte(self) -> u8 {
                self as u8
            }

            fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($value => Some(Self::$variant),)*
                    _ => None,
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some(Self::$variant),)*
                    _ => None,
                }
            }

            fn shape(
                self,
            ) -> ($crate::protocol::Request, $crate::protocol::Response) {
                match self {
                    $(Self::$variant => $shape,)*
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                f.write_str($crate::protocol::CommandSet::name(*self))
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::protocol::UnknownOpcode;

            fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
                <Self as $crate::protocol::CommandSet>::from_name(s)
                    .ok_or($crate::protocol::UnknownOpcode)
            }
        }
    }
}

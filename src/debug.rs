// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Error plumbing and logging.
//!
//! Every failure in this crate is created through [`fail!`] or [`check!`],
//! which log it at the point of origin, and travels up wrapped in
//! [`Error`]. The log macros here forward to the [`log`] crate when the `log`
//! feature is enabled, and compile to nothing otherwise, so that a firmware
//! build carries no format strings.
//!
//! Pinata code *should not* call into the [`log`] crate directly outside of
//! this module.

// Not every log level is reached from every build.
#![allow(unused_macros)]

#[cfg(doc)]
use __raw_log as log;

/// A Pinata error, as it travels up the call stack.
///
/// Refer to this type as `pinata::Error`. Only this crate creates them; use
/// [`Error::into_inner()`] or [`AsRef`] to see what went wrong.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error<E> {
    inner: E,
}

impl<E> Error<E> {
    /// Wraps `inner`; only for use by [`fail!`].
    #[doc(hidden)]
    pub fn __new(inner: E) -> Self {
        Self { inner }
    }

    /// Converts the wrapped error into a higher-level one.
    ///
    /// `?` does this on its own wherever [`debug_from!`] declared the
    /// conversion.
    pub fn cast<F: From<E>>(self) -> Error<F> {
        Error {
            inner: self.inner.into(),
        }
    }

    /// Unwraps the error.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E> AsRef<E> for Error<E> {
    fn as_ref(&self) -> &E {
        &self.inner
    }
}

/// Declares that a wrapped `$f` converts into a wrapped `$e`, given
/// `From<$f> for $e`.
///
/// A blanket `impl<A, B: From<A>> From<Error<A>> for Error<B>` would collide
/// with `impl<T> From<T> for T`, so each error type lists its sources:
/// ```text
/// debug_from!(server::Error => net::Error, cipher::Error);
/// ```
macro_rules! debug_from {
    ($e:ty => $($f:ty),+ $(,)?) => {$(
        impl From<$crate::Error<$f>> for $crate::Error<$e> {
            fn from(e: $crate::Error<$f>) -> Self {
                e.cast()
            }
        }
    )*};
}

/// Returns `Err($error)` from the current function, logged, unless `$cond`
/// holds.
macro_rules! check {
    ($cond:expr, $error:expr) => {
        if !$cond {
            let error = $error;
            return Err(fail!(
                error,
                "check failure: `{}`; returned {:?}",
                stringify!($cond),
                error,
            ));
        }
    };
}

/// Logs an error value and wraps it in an [`Error`].
///
/// This is the only way to create an [`Error`]. Write
/// `foo.ok_or_else(|| fail!(MyError))` rather than `foo.ok_or(MyError)`; a
/// custom message may follow the error.
macro_rules! fail {
    ($error:expr, $($format:tt)+) => {{
        error!($($format)+);
        $crate::debug::Error::__new($error)
    }};
    ($error:expr) => {{
        let error = $error;
        error!("generated error: `{:?}`", error);
        $crate::debug::Error::__new(error)
    }};
}

/// [`log::trace!()`], compiled out without the `log` feature.
macro_rules! trace {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::trace!($($args)*);
    }
}

/// [`log::info!()`], compiled out without the `log` feature.
macro_rules! info {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::info!($($args)*);
    }
}

/// [`log::warn!()`], compiled out without the `log` feature.
macro_rules! warn {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::warn!($($args)*);
    }
}

/// [`log::error!()`], compiled out without the `log` feature.
macro_rules! error {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::error!($($args)*);
    }
}

/// Installs a logger for the test binary before any test runs, since a test
/// binary's `main()` cannot be replaced.
///
/// Output goes through the test harness's capture, so only failing tests
/// show their logs.
#[cfg(test)]
#[ctor::ctor]
fn init_test_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .parse_filters("trace")
        .format(|out, record| {
            use std::io::Write;
            writeln!(
                out,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args(),
            )
        })
        .try_init();
}

#[cfg(test)]
mod test {
    use crate::Result;

    #[derive(Copy, Clone, PartialEq, Eq, Debug)]
    enum Low {
        Glitch,
    }

    #[derive(Copy, Clone, PartialEq, Eq, Debug)]
    enum High {
        Wrapped(Low),
        Odd(u8),
    }

    impl From<Low> for High {
        fn from(e: Low) -> Self {
            Self::Wrapped(e)
        }
    }

    debug_from!(High => Low);

    fn low(ok: bool) -> Result<u8, Low> {
        check!(ok, Low::Glitch);
        Ok(0xa5)
    }

    fn high(ok: bool, byte: u8) -> Result<u8, High> {
        let value = low(ok)?;
        if byte % 2 == 1 {
            return Err(fail!(High::Odd(byte), "odd byte {:#04x}", byte));
        }
        Ok(value ^ byte)
    }

    #[test]
    fn errors_convert_upwards() {
        assert_eq!(high(true, 0x04).map_err(|e| e.into_inner()), Ok(0xa1));
        assert_eq!(
            high(false, 0x04).map_err(|e| e.into_inner()),
            Err(High::Wrapped(Low::Glitch))
        );
        let e = high(true, 0x03).unwrap_err();
        assert_eq!(e.as_ref(), &High::Odd(0x03));
    }
}

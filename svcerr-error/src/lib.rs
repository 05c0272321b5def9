//! # svcerr-error
//!
//! Classified errors for services that speak gRPC and HTTP.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what class of error occurred (one of the gRPC codes)
//! - **StatusMapping**: Turn that class into a gRPC code, HTTP status and label
//! - **ErrorContext**: Point at the input field responsible
//! - **Wrap chain**: Add `prefix: ` context to the message without losing the cause
//!
//! ## Usage
//!
//! ```rust
//! use svcerr_error::{get_kind, wrap, ErrorKind};
//!
//! fn load(id: u64) -> svcerr_error::Result<()> {
//!     Err(ErrorKind::NotFound.error(format!("user {} not found", id)))
//! }
//!
//! let err = wrap(load(7).unwrap_err(), "loading profile");
//! assert_eq!(get_kind(&err), ErrorKind::NotFound);
//! assert_eq!(err.to_string(), "loading profile: user 7 not found");
//! assert_eq!(err.http_status(), 404);
//! ```
//!
//! ## Principles
//!
//! - `ErrorKind::wrap` reclassifies; the free [`wrap`] keeps the existing kind
//! - Anything not built by this crate is classified as `Unknown`
//! - Accessors never fail: unclassified errors yield `Unknown` and no context
//! - `Display` is the whole `outer: inner` message and `source()` still yields
//!   the inner error, so reporters that print the source chain (such as
//!   anyhow's `{:#}`) repeat the inner text; use `message()` or `Display` alone

mod context;
mod error;
mod kind;
mod status;

pub use context::ErrorContext;
pub use error::{
    add_error_context, cause, get_error_context, get_kind, new, newf, wrap, wrapf, Error,
};
pub use kind::{ErrorKind, UnknownStatusCode};
pub use status::StatusMapping;

/// Result type alias using the classified Error
pub type Result<T> = std::result::Result<T, Error>;

/// Create an unclassified error with a `format!`-style message.
///
/// ```rust
/// let err = svcerr_error::newf!("an_error {}", 2);
/// assert_eq!(err.to_string(), "an_error 2");
/// ```
#[macro_export]
macro_rules! newf {
    ($($arg:tt)*) => {
        $crate::newf(::std::format_args!($($arg)*))
    };
}

/// Create an error of the given kind with a `format!`-style message.
///
/// ```rust
/// use svcerr_error::{errorf, ErrorKind};
///
/// let err = errorf!(ErrorKind::OutOfRange, "page {} of {}", 12, 10);
/// assert_eq!(err.kind(), ErrorKind::OutOfRange);
/// assert_eq!(err.message(), "page 12 of 10");
/// ```
#[macro_export]
macro_rules! errorf {
    ($kind:expr, $($arg:tt)*) => {
        $crate::Error::newf($kind, ::std::format_args!($($arg)*))
    };
}

/// Wrap an error with a `format!`-style prefix, keeping its kind.
///
/// ```rust
/// use svcerr_error::{wrapf, ErrorKind};
///
/// let err = wrapf!(ErrorKind::Aborted.error("conflict"), "commit {}", "a1b2");
/// assert_eq!(err.kind(), ErrorKind::Aborted);
/// assert_eq!(err.to_string(), "commit a1b2: conflict");
/// ```
#[macro_export]
macro_rules! wrapf {
    ($err:expr, $($arg:tt)*) => {
        $crate::wrapf($err, ::std::format_args!($($arg)*))
    };
}

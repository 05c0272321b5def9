//! Error kinds and their protocol status codes

use crate::{Error, StatusMapping};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

/// The kind of error that occurred.
///
/// Every kind is one of the canonical gRPC status codes, and the
/// discriminant *is* that code. Callers match on the kind to decide how an
/// error crosses a service boundary; [`StatusMapping`] turns it into a
/// label and an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorKind {
    // =========================================================================
    // Caller errors
    // =========================================================================
    /// The operation was cancelled, typically by the caller
    #[serde(rename = "CANCELLED")]
    Canceled = 1,

    /// Catch-all for errors nobody classified
    #[default]
    Unknown = 2,

    /// The caller supplied an invalid argument
    InvalidArgument = 3,

    /// The deadline expired before the operation could complete
    DeadlineExceeded = 4,

    /// A requested entity was not found
    NotFound = 5,

    /// The entity the caller tried to create already exists
    AlreadyExists = 6,

    /// The caller lacks permission for the operation
    PermissionDenied = 7,

    /// A quota or rate limit was exhausted
    ResourceExhausted = 8,

    /// The system is not in a state required for the operation
    FailedPrecondition = 9,

    /// The operation was aborted, usually by a concurrency conflict
    Aborted = 10,

    /// The operation was attempted past the valid range
    OutOfRange = 11,

    // =========================================================================
    // Server errors
    // =========================================================================
    /// The operation is not implemented or supported
    Unimplemented = 12,

    /// An invariant expected by the system was broken
    Internal = 13,

    /// The service is currently unavailable
    Unavailable = 14,

    /// Unrecoverable data loss or corruption
    DataLoss = 15,

    /// The request lacks valid authentication credentials
    Unauthenticated = 16,
}

/// Returned when a protocol status code has no matching [`ErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("unknown protocol status code {0}")]
pub struct UnknownStatusCode(pub u32);

impl ErrorKind {
    /// Every kind, in protocol code order.
    pub const ALL: [ErrorKind; 16] = [
        ErrorKind::Canceled,
        ErrorKind::Unknown,
        ErrorKind::InvalidArgument,
        ErrorKind::DeadlineExceeded,
        ErrorKind::NotFound,
        ErrorKind::AlreadyExists,
        ErrorKind::PermissionDenied,
        ErrorKind::ResourceExhausted,
        ErrorKind::FailedPrecondition,
        ErrorKind::Aborted,
        ErrorKind::OutOfRange,
        ErrorKind::Unimplemented,
        ErrorKind::Internal,
        ErrorKind::Unavailable,
        ErrorKind::DataLoss,
        ErrorKind::Unauthenticated,
    ];

    /// The protocol status code of this kind
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Reverse of [`code`](Self::code). `None` for codes outside the set,
    /// including 0 (OK), which is not an error.
    pub const fn from_code(code: u32) -> Option<ErrorKind> {
        match code {
            1 => Some(ErrorKind::Canceled),
            2 => Some(ErrorKind::Unknown),
            3 => Some(ErrorKind::InvalidArgument),
            4 => Some(ErrorKind::DeadlineExceeded),
            5 => Some(ErrorKind::NotFound),
            6 => Some(ErrorKind::AlreadyExists),
            7 => Some(ErrorKind::PermissionDenied),
            8 => Some(ErrorKind::ResourceExhausted),
            9 => Some(ErrorKind::FailedPrecondition),
            10 => Some(ErrorKind::Aborted),
            11 => Some(ErrorKind::OutOfRange),
            12 => Some(ErrorKind::Unimplemented),
            13 => Some(ErrorKind::Internal),
            14 => Some(ErrorKind::Unavailable),
            15 => Some(ErrorKind::DataLoss),
            16 => Some(ErrorKind::Unauthenticated),
            _ => None,
        }
    }

    /// The full status row for this kind
    pub const fn status(self) -> StatusMapping {
        StatusMapping::of(self)
    }

    /// Upper snake case label, e.g. `INVALID_ARGUMENT`
    pub const fn label(self) -> &'static str {
        self.status().label
    }

    /// HTTP status code used when the error crosses an HTTP boundary
    pub const fn http_status(self) -> u16 {
        self.status().http
    }

    // =========================================================================
    // Constructors bound to a kind
    // =========================================================================

    /// Create an error of this kind with a plain message
    pub fn error(self, message: impl Into<String>) -> Error {
        Error::new(self, message)
    }

    /// Create an error of this kind from pre-formatted arguments.
    ///
    /// Usually reached through the [`errorf!`](crate::errorf) macro.
    pub fn errorf(self, args: fmt::Arguments<'_>) -> Error {
        Error::newf(self, args)
    }

    /// Wrap `err` under `message`, reclassifying the result as this kind.
    ///
    /// The rendered message is `message: <err>`. Any context carried by
    /// `err` is not carried over.
    pub fn wrap(self, err: impl Into<anyhow::Error>, message: impl Into<String>) -> Error {
        Error::wrapped(self, err.into(), message.into(), None)
    }

    /// Formatted variant of [`wrap`](Self::wrap).
    pub fn wrapf(self, err: impl Into<anyhow::Error>, args: fmt::Arguments<'_>) -> Error {
        self.wrap(err, args.to_string())
    }
}

impl TryFrom<u32> for ErrorKind {
    type Error = UnknownStatusCode;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        ErrorKind::from_code(code).ok_or(UnknownStatusCode(code))
    }
}

impl From<ErrorKind> for u32 {
    fn from(kind: ErrorKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

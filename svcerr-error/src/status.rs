//! Static mapping from error kinds to transport status codes

use crate::ErrorKind;
use serde::Serialize;

/// One row of the status table: what an [`ErrorKind`] becomes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StatusMapping {
    /// gRPC status code
    pub code: u32,
    /// HTTP status code
    pub http: u16,
    /// Canonical upper snake case name of the gRPC code
    pub label: &'static str,
}

impl StatusMapping {
    const fn row(kind: ErrorKind, http: u16, label: &'static str) -> Self {
        Self {
            code: kind.code(),
            http,
            label,
        }
    }

    /// Look up the row for `kind`.
    ///
    /// The match is exhaustive, so a kind without a row does not compile.
    pub const fn of(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Canceled => Self::row(kind, 499, "CANCELLED"),
            ErrorKind::Unknown => Self::row(kind, 500, "UNKNOWN"),
            ErrorKind::InvalidArgument => Self::row(kind, 400, "INVALID_ARGUMENT"),
            ErrorKind::DeadlineExceeded => Self::row(kind, 504, "DEADLINE_EXCEEDED"),
            ErrorKind::NotFound => Self::row(kind, 404, "NOT_FOUND"),
            ErrorKind::AlreadyExists => Self::row(kind, 409, "ALREADY_EXISTS"),
            ErrorKind::PermissionDenied => Self::row(kind, 403, "PERMISSION_DENIED"),
            ErrorKind::ResourceExhausted => Self::row(kind, 429, "RESOURCE_EXHAUSTED"),
            ErrorKind::FailedPrecondition => Self::row(kind, 400, "FAILED_PRECONDITION"),
            ErrorKind::Aborted => Self::row(kind, 409, "ABORTED"),
            ErrorKind::OutOfRange => Self::row(kind, 400, "OUT_OF_RANGE"),
            ErrorKind::Unimplemented => Self::row(kind, 501, "UNIMPLEMENTED"),
            ErrorKind::Internal => Self::row(kind, 500, "INTERNAL"),
            ErrorKind::Unavailable => Self::row(kind, 503, "UNAVAILABLE"),
            ErrorKind::DataLoss => Self::row(kind, 500, "DATA_LOSS"),
            ErrorKind::Unauthenticated => Self::row(kind, 401, "UNAUTHENTICATED"),
        }
    }

    /// Every `(kind, row)` pair, in protocol code order.
    pub fn table() -> impl Iterator<Item = (ErrorKind, StatusMapping)> {
        ErrorKind::ALL.into_iter().map(|kind| (kind, Self::of(kind)))
    }

    /// Whether the HTTP status is a client error (4xx)
    pub const fn is_client_error(&self) -> bool {
        self.http >= 400 && self.http < 500
    }
}

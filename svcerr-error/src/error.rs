//! The classified Error type and the free functions that build and inspect it

use crate::{ErrorContext, ErrorKind, UnknownStatusCode};
use serde_json::{Map, Value};
use std::error::Error as StdError;
use std::fmt;

/// An error carrying a classification.
///
/// This error type provides:
/// - `kind`: how the error maps onto gRPC and HTTP status codes
/// - `message`: the rendered text, `outer: inner` for wrapped errors
/// - `context`: at most one `{field, message}` annotation
/// - `source`: the wrapped error (if any)
///
/// Values are never mutated in place by the free functions: wrapping or
/// annotating returns a new `Error` built from the old one.
///
/// # Example
///
/// ```rust
/// use svcerr_error::{add_error_context, get_error_context, get_kind, ErrorKind};
///
/// let err = ErrorKind::InvalidArgument.error("an_error");
/// let err = add_error_context(err, "a_field", "the field is empty");
///
/// assert_eq!(get_kind(&err), ErrorKind::InvalidArgument);
/// assert_eq!(get_error_context(&err).unwrap().field, "a_field");
/// assert_eq!(err.to_string(), "an_error");
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Option<ErrorContext>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
            source: None,
        }
    }

    /// Create a new error with the given kind and a formatted message
    pub fn newf(kind: ErrorKind, args: fmt::Arguments<'_>) -> Self {
        Self::new(kind, args.to_string())
    }

    /// Create an error from a raw gRPC status code.
    ///
    /// Codes with no matching kind fall back to [`ErrorKind::Unknown`], so
    /// the label and HTTP status of the result always resolve. Use
    /// [`try_from_code`](Self::try_from_code) to reject them instead.
    pub fn from_code(code: u32, message: impl Into<String>) -> Self {
        let kind = ErrorKind::from_code(code).unwrap_or_else(|| {
            tracing::debug!(target: "svcerr", code, "unmapped status code, classifying as unknown");
            ErrorKind::Unknown
        });
        Self::new(kind, message)
    }

    /// Formatted variant of [`from_code`](Self::from_code)
    pub fn from_code_f(code: u32, args: fmt::Arguments<'_>) -> Self {
        Self::from_code(code, args.to_string())
    }

    /// Create an error from a raw gRPC status code, rejecting unmapped codes
    pub fn try_from_code(
        code: u32,
        message: impl Into<String>,
    ) -> Result<Self, UnknownStatusCode> {
        let kind = ErrorKind::try_from(code)?;
        Ok(Self::new(kind, message))
    }

    pub(crate) fn wrapped(
        kind: ErrorKind,
        source: anyhow::Error,
        prefix: String,
        context: Option<ErrorContext>,
    ) -> Self {
        Self {
            kind,
            message: format!("{}: {}", prefix, source),
            context,
            source: Some(source),
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the rendered message, including every wrap prefix
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the attached field context (if any)
    pub fn context(&self) -> Option<&ErrorContext> {
        self.context.as_ref()
    }

    /// Get the wrapped error (if any)
    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    /// gRPC status code of the kind
    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    /// Label of the kind, e.g. `NOT_FOUND`
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// HTTP status code of the kind
    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    /// The innermost error of the wrap chain, or `self` if nothing is wrapped
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        cause(self)
    }

    /// Extensions block for a GraphQL-style error envelope: `{"code": LABEL}`
    pub fn extensions(&self) -> Map<String, Value> {
        let mut extensions = Map::new();
        extensions.insert("code".to_string(), Value::from(self.label()));
        extensions
    }

    // =========================================================================
    // Builders (chainable)
    // =========================================================================

    /// Attach field context, replacing any existing one.
    ///
    /// Kind, message and source are kept.
    pub fn with_context(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.context = Some(ErrorContext::new(field, message));
        self
    }

    /// Reclassify without touching message, context or source
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }
}

// =============================================================================
// Display - exactly the composed message
// =============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// =============================================================================
// Debug - verbose, multi-line format for debugging
// =============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.kind, self.kind.code())?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if let Some(context) = &self.context {
            writeln!(f)?;
            writeln!(f, "    Context: {}", context)?;
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

// =============================================================================
// std::error::Error implementation
// =============================================================================

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// =============================================================================
// Free functions
// =============================================================================

/// Create an error with no classification ([`ErrorKind::Unknown`])
pub fn new(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Unknown, message)
}

/// Formatted variant of [`new`]. Usually reached through [`newf!`](crate::newf!).
pub fn newf(args: fmt::Arguments<'_>) -> Error {
    Error::newf(ErrorKind::Unknown, args)
}

/// Wrap `err` under `message` without changing its classification.
///
/// An already classified error keeps its kind and context; anything else
/// becomes [`ErrorKind::Unknown`]. The rendered message is `message: <err>`.
pub fn wrap(err: impl Into<anyhow::Error>, message: impl Into<String>) -> Error {
    let err = err.into();
    let (kind, context) = match err.downcast_ref::<Error>() {
        Some(classified) => (classified.kind, classified.context.clone()),
        None => {
            tracing::trace!(target: "svcerr", error = %err, "wrapping unclassified error");
            (ErrorKind::Unknown, None)
        }
    };
    Error::wrapped(kind, err, message.into(), context)
}

/// Formatted variant of [`wrap`]. Usually reached through [`wrapf!`](crate::wrapf!).
pub fn wrapf(err: impl Into<anyhow::Error>, args: fmt::Arguments<'_>) -> Error {
    wrap(err, args.to_string())
}

/// Attach `{field, message}` context to `err`, replacing any existing one.
///
/// A classified error keeps its kind, message and source. Anything else is
/// classified as [`ErrorKind::Unknown`] with its text as the message and
/// itself as the source.
pub fn add_error_context(
    err: impl Into<anyhow::Error>,
    field: impl Into<String>,
    message: impl Into<String>,
) -> Error {
    let err = err.into();
    // by-value downcast also matches under an anyhow context layer and drops it
    let top: &(dyn StdError + 'static) = err.as_ref();
    let err = if top.is::<Error>() {
        match err.downcast::<Error>() {
            Ok(classified) => return classified.with_context(field, message),
            Err(err) => err,
        }
    } else {
        err
    };

    let kind = err
        .downcast_ref::<Error>()
        .map_or(ErrorKind::Unknown, Error::kind);
    Error {
        kind,
        message: err.to_string(),
        context: Some(ErrorContext::new(field, message)),
        source: Some(err),
    }
}

/// The context attached to `err`, or `None` if it is unclassified or bare
pub fn get_error_context<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a ErrorContext> {
    err.downcast_ref::<Error>().and_then(Error::context)
}

/// The kind of `err`, or [`ErrorKind::Unknown`] if it is unclassified
pub fn get_kind(err: &(dyn StdError + 'static)) -> ErrorKind {
    err.downcast_ref::<Error>()
        .map_or(ErrorKind::Unknown, Error::kind)
}

/// Walk the source chain of `err` to its root. Identity if `err` has no source.
pub fn cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn test_context() {
        let err = ErrorKind::InvalidArgument.error("an_error");
        let with_context = add_error_context(err, "a_field", "the field is empty");

        assert_eq!(get_kind(&with_context), ErrorKind::InvalidArgument);
        assert_eq!(
            get_error_context(&with_context),
            Some(&ErrorContext::new("a_field", "the field is empty"))
        );
        assert_eq!(with_context.to_string(), "an_error");
    }

    #[test]
    fn test_context_in_unknown_error() {
        let err = new("a custom error");
        let with_context = add_error_context(err, "a_field", "the field is empty");

        assert_eq!(get_kind(&with_context), ErrorKind::Unknown);
        assert_eq!(
            get_error_context(&with_context).map(ErrorContext::to_map),
            Some(ErrorContext::new("a_field", "the field is empty").to_map())
        );
        assert_eq!(with_context.to_string(), "a custom error");
    }

    #[test]
    fn test_context_on_foreign_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "config.toml missing");
        let err = add_error_context(io_err, "path", "no such file");

        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.message(), "config.toml missing");
        assert_eq!(err.context().unwrap().field, "path");
        assert!(err.source_ref().is_some());
        assert_eq!(err.root_cause().to_string(), "config.toml missing");
    }

    #[test]
    fn test_context_keeps_anyhow_context_text() {
        let err = anyhow::Error::from(ErrorKind::Internal.error("inner")).context("outer layer");
        let err = add_error_context(err, "f", "m");

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), "outer layer");
        assert_eq!(err.context(), Some(&ErrorContext::new("f", "m")));
        assert_eq!(err.root_cause().to_string(), "inner");
    }

    #[test]
    fn test_context_replaces_previous() {
        let err = ErrorKind::OutOfRange
            .error("bad page")
            .with_context("page", "too large");
        let err = add_error_context(err, "limit", "must be positive");

        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err.context(), Some(&ErrorContext::new("limit", "must be positive")));
    }

    #[test]
    fn test_no_context() {
        let err = ErrorKind::Internal.error("boom");
        assert!(get_error_context(&err).is_none());

        let io_err = io::Error::other("raw");
        assert!(get_error_context(&io_err).is_none());
    }

    #[test]
    fn test_wrapf() {
        let err = new("an_error");
        let wrapped = ErrorKind::InvalidArgument.wrapf(err, format_args!("error {}", "1"));

        assert_eq!(get_kind(&wrapped), ErrorKind::InvalidArgument);
        assert_eq!(wrapped.to_string(), "error 1: an_error");
    }

    #[test]
    fn test_wrapf_in_unknown_error() {
        let err = crate::newf!("an_error {}", "2");
        let wrapped = crate::wrapf!(err, "error {}", "1");

        assert_eq!(get_kind(&wrapped), ErrorKind::Unknown);
        assert_eq!(wrapped.to_string(), "error 1: an_error 2");
    }

    #[test]
    fn test_kind_wrap_reclassifies() {
        let inner = ErrorKind::NotFound.error("inner");
        let wrapped = ErrorKind::Internal.wrap(inner, "outer");

        assert_eq!(wrapped.kind(), ErrorKind::Internal);
        assert_eq!(wrapped.message(), "outer: inner");
    }

    #[test]
    fn test_generic_wrap_preserves_kind_and_context() {
        let inner = ErrorKind::PermissionDenied
            .error("inner")
            .with_context("role", "missing admin");
        let wrapped = wrap(inner, "outer");

        assert_eq!(wrapped.kind(), ErrorKind::PermissionDenied);
        assert_eq!(wrapped.context().unwrap().field, "role");
        assert_eq!(wrapped.message(), "outer: inner");
    }

    #[test]
    fn test_wrap_foreign_error() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let wrapped = wrap(io_err, "sending reply");

        assert_eq!(wrapped.kind(), ErrorKind::Unknown);
        assert_eq!(wrapped.message(), "sending reply: pipe closed");
    }

    #[test]
    fn test_chain_report_repeats_inner_text() {
        let err = anyhow::Error::from(wrap(new("inner"), "outer"));
        assert_eq!(err.to_string(), "outer: inner");
        assert_eq!(format!("{:#}", err), "outer: inner: inner");
    }

    #[test]
    fn test_wrap_twice() {
        let err = wrap(wrap(new("inner"), "outer1"), "outer2");
        assert_eq!(err.to_string(), "outer2: outer1: inner");
    }

    #[test]
    fn test_cause_walks_to_root() {
        let io_err = io::Error::new(io::ErrorKind::TimedOut, "socket timeout");
        let err = ErrorKind::Unavailable.wrap(wrap(io_err, "dial"), "upstream");

        assert_eq!(err.message(), "upstream: dial: socket timeout");
        let root = cause(&err);
        assert_eq!(root.to_string(), "socket timeout");
        assert!(root.downcast_ref::<io::Error>().is_some());
    }

    #[test]
    fn test_cause_identity() {
        let err = ErrorKind::DataLoss.error("corrupt block");
        assert_eq!(cause(&err).to_string(), "corrupt block");
        assert!(cause(&err).downcast_ref::<Error>().is_some());

        let io_err = io::Error::other("plain");
        assert_eq!(cause(&io_err).to_string(), "plain");
    }

    #[test]
    fn test_get_kind_unclassified() {
        let io_err = io::Error::other("plain");
        assert_eq!(get_kind(&io_err), ErrorKind::Unknown);
    }

    #[test]
    fn test_get_kind_through_anyhow() {
        let err: anyhow::Error = ErrorKind::AlreadyExists.error("dup").into();
        assert_eq!(get_kind(err.as_ref()), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_new_code_error() {
        let err = Error::from_code(16, "error 1");
        let err2 = Error::from_code_f(7, format_args!("error {}", 2));

        assert_eq!(get_kind(&err), ErrorKind::Unauthenticated);
        assert_eq!(get_kind(&err2), ErrorKind::PermissionDenied);
        assert_eq!(err2.message(), "error 2");
    }

    #[test]
    fn test_unmapped_code_falls_back() {
        let err = Error::from_code(99, "odd");
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.label(), "UNKNOWN");
        assert_eq!(err.http_status(), 500);

        let err = Error::from_code(0, "ok is not an error");
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_try_from_code() {
        let err = Error::try_from_code(5, "missing").unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let rejected = Error::try_from_code(42, "nope").unwrap_err();
        assert_eq!(rejected, UnknownStatusCode(42));
    }

    #[test]
    fn test_status_accessors() {
        let err = ErrorKind::ResourceExhausted.error("quota");
        assert_eq!(err.code(), 8);
        assert_eq!(err.label(), "RESOURCE_EXHAUSTED");
        assert_eq!(err.http_status(), 429);
    }

    #[test]
    fn test_extensions() {
        let err = ErrorKind::NotFound.error("no such user");
        let extensions = Value::Object(err.extensions());
        assert_eq!(extensions, serde_json::json!({"code": "NOT_FOUND"}));
    }

    #[test]
    fn test_with_kind() {
        let err = new("late classification")
            .with_context("id", "malformed")
            .with_kind(ErrorKind::InvalidArgument);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.context().unwrap().field, "id");
    }

    #[test]
    fn test_debug() {
        let err = ErrorKind::Internal
            .wrap(io::Error::other("disk full"), "flush")
            .with_context("path", "/var/data");
        let debug = format!("{:?}", err);
        assert!(debug.contains("INTERNAL (13)"));
        assert!(debug.contains("Message: flush: disk full"));
        assert!(debug.contains("Context: path: /var/data"));
        assert!(debug.contains("Source"));
    }

    #[test]
    fn test_std_source() {
        let err = ErrorKind::Aborted.wrap(new("conflict"), "commit");
        let source = StdError::source(&err).unwrap();
        assert_eq!(source.to_string(), "conflict");
        assert!(StdError::source(&new("bare")).is_none());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
    }

    fn any_kind() -> impl Strategy<Value = ErrorKind> {
        prop::sample::select(ErrorKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_new_round_trips_kind(kind in any_kind(), msg in ".{0,20}") {
            let err = kind.error(msg.clone());
            prop_assert_eq!(get_kind(&err), kind);
            prop_assert_eq!(err.message(), msg.as_str());
        }

        #[test]
        fn prop_context_attaches(kind in any_kind(), field in "[a-z_]{1,12}", msg in ".{0,20}") {
            let classified = add_error_context(kind.error("m"), field.clone(), msg.clone());
            prop_assert_eq!(get_kind(&classified), kind);
            prop_assert_eq!(get_error_context(&classified), Some(&ErrorContext::new(field.clone(), msg.clone())));

            let foreign = add_error_context(io::Error::other("m"), field.clone(), msg.clone());
            prop_assert_eq!(get_kind(&foreign), ErrorKind::Unknown);
            prop_assert_eq!(get_error_context(&foreign), Some(&ErrorContext::new(field, msg)));
        }

        #[test]
        fn prop_kind_wrap_reclassifies(k1 in any_kind(), k2 in any_kind()) {
            let wrapped = k2.wrap(k1.error("inner"), "outer");
            prop_assert_eq!(get_kind(&wrapped), k2);
            prop_assert_eq!(wrapped.message(), "outer: inner");
        }

        #[test]
        fn prop_generic_wrap_preserves_kind(kind in any_kind()) {
            let wrapped = wrap(kind.error("inner"), "outer");
            prop_assert_eq!(get_kind(&wrapped), kind);
            prop_assert_eq!(wrapped.message(), "outer: inner");
        }
    }
}

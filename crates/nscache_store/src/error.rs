// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache and store operations.

use std::fmt;

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// The category of a cache failure.
///
/// Callers usually only need to distinguish a store outage from a payload problem:
/// the former may be worth retrying, the latter will fail the same way again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A store operation (get, set, expire or delete) failed.
    StoreUnavailable,
    /// Stored bytes could not be decoded into the requested type.
    Decode,
    /// A computed value could not be encoded.
    Encode,
    /// A fallible computation returned an error.
    Compute,
    /// Configuration could not be loaded or is invalid.
    InvalidConfig,
}

impl ErrorKind {
    /// Returns a short, stable name for this kind, suitable for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StoreUnavailable => "store unavailable",
            Self::Decode => "decode failed",
            Self::Encode => "encode failed",
            Self::Compute => "compute failed",
            Self::InvalidConfig => "invalid configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error from a cache or store operation.
///
/// The underlying cause, if any, is available through [`std::error::Error::source()`].
///
/// # Examples
///
/// ```
/// use nscache_store::{Error, ErrorKind};
///
/// let error = Error::store_unavailable("connection refused");
/// assert_eq!(error.kind(), ErrorKind::StoreUnavailable);
/// assert!(error.to_string().contains("connection refused"));
/// ```
#[ohno::error]
#[derive(Clone)]
#[display("cache operation failed: {kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Creates an error of the given kind caused by `cause`.
    pub fn with_kind(kind: ErrorKind, cause: impl Into<BoxedCause>) -> Self {
        Self::caused_by(kind, cause)
    }

    /// Creates an error for a failed store operation.
    pub fn store_unavailable(cause: impl Into<BoxedCause>) -> Self {
        Self::caused_by(ErrorKind::StoreUnavailable, cause)
    }

    /// Creates an error for bytes that could not be decoded.
    pub fn decode(cause: impl Into<BoxedCause>) -> Self {
        Self::caused_by(ErrorKind::Decode, cause)
    }

    /// Creates an error for a value that could not be encoded.
    pub fn encode(cause: impl Into<BoxedCause>) -> Self {
        Self::caused_by(ErrorKind::Encode, cause)
    }

    /// Creates an error wrapping a failed computation.
    pub fn compute(cause: impl Into<BoxedCause>) -> Self {
        Self::caused_by(ErrorKind::Compute, cause)
    }

    /// Creates an error for configuration that could not be loaded.
    pub fn invalid_config(cause: impl Into<BoxedCause>) -> Self {
        Self::caused_by(ErrorKind::InvalidConfig, cause)
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if a store operation failed.
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        self.kind == ErrorKind::StoreUnavailable
    }

    /// Returns `true` if stored bytes could not be decoded.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        self.kind == ErrorKind::Decode
    }

    /// Returns `true` if a computed value could not be encoded.
    #[must_use]
    pub fn is_encode(&self) -> bool {
        self.kind == ErrorKind::Encode
    }
}

/// A specialized [`Result`] type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(Error: Send, Sync, Clone, std::error::Error);

    #[test]
    fn display_contains_kind_and_cause() {
        let error = Error::decode("unexpected end of input");
        let display = error.to_string();
        assert!(display.contains("decode failed"), "got: {display}");
        assert!(display.contains("unexpected end of input"), "got: {display}");
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(Error::store_unavailable("x").kind(), ErrorKind::StoreUnavailable);
        assert_eq!(Error::decode("x").kind(), ErrorKind::Decode);
        assert_eq!(Error::encode("x").kind(), ErrorKind::Encode);
        assert_eq!(Error::compute("x").kind(), ErrorKind::Compute);
        assert_eq!(Error::invalid_config("x").kind(), ErrorKind::InvalidConfig);
        assert_eq!(Error::with_kind(ErrorKind::Encode, "x").kind(), ErrorKind::Encode);
    }

    #[test]
    fn predicates_match_kind() {
        let error = Error::store_unavailable("down");
        assert!(error.is_store_unavailable());
        assert!(!error.is_decode());
        assert!(!error.is_encode());

        assert!(Error::decode("bad").is_decode());
        assert!(Error::encode("bad").is_encode());
    }

    #[test]
    fn clone_preserves_kind_and_message() {
        let error = Error::compute("boom");
        let cloned = error.clone();
        assert_eq!(cloned.kind(), ErrorKind::Compute);
        assert_eq!(cloned.to_string(), error.to_string());
    }

    #[test]
    fn kind_display_is_stable() {
        assert_eq!(ErrorKind::StoreUnavailable.to_string(), "store unavailable");
        assert_eq!(ErrorKind::InvalidConfig.as_str(), "invalid configuration");
    }
}

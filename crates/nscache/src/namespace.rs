// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Hierarchical key prefixes.

use std::{fmt, sync::Arc};

/// Separator placed between namespace segments and between a namespace and a key.
pub const DELIMITER: char = ':';

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "nscache";

/// A hierarchical prefix that scopes cache keys.
///
/// A namespace is an ordered list of segments joined by [`DELIMITER`]. Deriving a child
/// appends one segment, and qualifying a key appends the key after one more delimiter.
/// Segments and keys are opaque: a segment that itself contains `':'` is accepted as is,
/// so `"a"` + `"b:c"` and `"a:b"` + `"c"` produce the same prefix.
///
/// Cloning is cheap; the text is shared.
///
/// # Examples
///
/// ```
/// use nscache::Namespace;
///
/// let users = Namespace::new("app").child("users");
/// assert_eq!(users.as_str(), "app:users");
/// assert_eq!(users.qualify("42"), "app:users:42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(Arc<str>);

impl Namespace {
    /// Creates a namespace from its full text.
    pub fn new(namespace: impl Into<Arc<str>>) -> Self {
        Self(namespace.into())
    }

    /// Returns the namespace text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a new namespace with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self(join(&self.0, segment).into())
    }

    /// Returns the store key for `key` within this namespace.
    #[must_use]
    pub fn qualify(&self, key: &str) -> String {
        join(&self.0, key)
    }

    /// Iterates over the delimiter-separated parts of the namespace.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(DELIMITER)
    }
}

fn join(prefix: &str, suffix: &str) -> String {
    let mut joined = String::with_capacity(prefix.len() + DELIMITER.len_utf8() + suffix.len());
    joined.push_str(prefix);
    joined.push(DELIMITER);
    joined.push_str(suffix);
    joined
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Namespace {
    fn from(namespace: &str) -> Self {
        Self::new(namespace)
    }
}

impl From<String> for Namespace {
    fn from(namespace: String) -> Self {
        Self::new(namespace)
    }
}

//! Path encoding and splitting for S3 request targets.
//!
//! Two different escaping rules are in play:
//!
//! - [`encode_path`] escapes object paths for the request line and the
//!   canonical resource. It keeps `/` so it can be applied to whole paths.
//! - [`query_escape`] escapes query values, turning spaces into `+` the way
//!   form-style query encoding does.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes left untouched by [`encode_path`]: ASCII alphanumerics and `-_.~/`.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Bytes escaped by [`query_escape`]. Space is kept here and rewritten to `+` afterwards.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b' ');

/// Percent-encode a path so it is safe inside an HTTP request line.
///
/// Paths made only of `[A-Za-z0-9-_.~/]` are returned borrowed and unchanged.
/// Every other character is written as its UTF-8 bytes, each rendered `%XX`
/// with uppercase hex digits.
///
/// # Examples
///
/// ```
/// use ruststack_s3_sigv2::path::encode_path;
///
/// assert_eq!(encode_path("/bucket/photos/cat.jpg"), "/bucket/photos/cat.jpg");
/// assert_eq!(encode_path("my object.txt"), "my%20object.txt");
/// assert_eq!(encode_path("données"), "donn%C3%A9es");
/// ```
#[must_use]
pub fn encode_path(path: &str) -> Cow<'_, str> {
    utf8_percent_encode(path, PATH_ENCODE_SET).into()
}

/// Escape a value for use in a query string.
///
/// ASCII alphanumerics and `-_.~` pass through, space becomes `+`, and every
/// other byte becomes `%XX`.
///
/// # Examples
///
/// ```
/// use ruststack_s3_sigv2::path::query_escape;
///
/// assert_eq!(query_escape("text/plain"), "text%2Fplain");
/// assert_eq!(query_escape("a b"), "a+b");
/// ```
#[must_use]
pub fn query_escape(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ENCODE_SET)
        .to_string()
        .replace(' ', "+")
}

/// The bucket, object, and query parts of an operation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathParts<'a> {
    /// Bucket name; empty when the path does not name one.
    pub bucket: &'a str,
    /// Object key; may itself contain `/`.
    pub object: &'a str,
    /// Raw query string without the leading `?`.
    pub query: &'a str,
}

/// Split a `/bucket/object?query` path into its parts.
///
/// The query is everything after the first `?`. One leading `/` is optional;
/// the remainder is split on the first `/` into bucket and object, so the
/// object keeps any further separators.
///
/// # Examples
///
/// ```
/// use ruststack_s3_sigv2::path::split_path;
///
/// let parts = split_path("/photos/2024/cat.jpg?acl");
/// assert_eq!(parts.bucket, "photos");
/// assert_eq!(parts.object, "2024/cat.jpg");
/// assert_eq!(parts.query, "acl");
/// ```
#[must_use]
pub fn split_path(path: &str) -> PathParts<'_> {
    let (resource, query) = path.split_once('?').unwrap_or((path, ""));

    let resource = resource.strip_prefix('/').unwrap_or(resource);
    let (bucket, object) = resource.split_once('/').unwrap_or((resource, ""));

    PathParts {
        bucket,
        object,
        query,
    }
}

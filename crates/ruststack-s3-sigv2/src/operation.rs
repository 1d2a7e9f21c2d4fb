//! A single storage operation and its request target URL.

use crate::config::SigV2Config;
use crate::path::{encode_path, split_path};

/// Method used when an operation does not name one.
pub const DEFAULT_METHOD: &str = "POST";

/// An HTTP method and path against a storage server.
///
/// `raw_path` has the form `/bucket/object?query`; the object part is
/// percent-encoded when the URL is built, the bucket and query are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Base address of the server, e.g. `https://s3.amazonaws.com`.
    pub server_address: String,
    /// HTTP method; empty means [`DEFAULT_METHOD`].
    pub method: String,
    /// Combined bucket, object, and query path.
    pub raw_path: String,
}

impl Operation {
    /// Create an operation.
    #[must_use]
    pub fn new(
        server_address: impl Into<String>,
        method: impl Into<String>,
        raw_path: impl Into<String>,
    ) -> Self {
        Self {
            server_address: server_address.into(),
            method: method.into(),
            raw_path: raw_path.into(),
        }
    }

    /// The method to send, falling back to `POST`.
    #[must_use]
    pub fn method(&self) -> &str {
        if self.method.is_empty() {
            DEFAULT_METHOD
        } else {
            &self.method
        }
    }

    /// Build the request target URL.
    ///
    /// Path-style addressing puts the bucket right after the server address.
    /// Virtual-hosted-style addressing expects the bucket to already be part of
    /// `server_address`, so only the object follows, after a single `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ruststack_s3_sigv2::config::SigV2Config;
    /// use ruststack_s3_sigv2::operation::Operation;
    ///
    /// let op = Operation::new("http://s3.example.com", "PUT", "/mybucket/my object.txt");
    /// assert_eq!(
    ///     op.request_url(&SigV2Config::default()),
    ///     "http://s3.example.com/mybucket/my%20object.txt"
    /// );
    /// ```
    #[must_use]
    pub fn request_url(&self, config: &SigV2Config) -> String {
        let parts = split_path(&self.raw_path);
        let object = encode_path(parts.object);

        let mut url = format!("{}/", self.server_address);
        if config.virtual_style {
            url.push_str(&object);
        } else {
            url.push_str(parts.bucket);
            if !object.is_empty() {
                url.push('/');
                url.push_str(&object);
            }
        }
        if !parts.query.is_empty() {
            url.push('?');
            url.push_str(parts.query);
        }
        url
    }
}

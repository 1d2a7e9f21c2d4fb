//! The seam between request signing and the network.
//!
//! Connection handling, TLS, retries, and redirects all live behind
//! [`Transport`]. The signing core only hands a finished request over.

use std::fmt;

use bytes::Bytes;

use crate::body::RequestBody;
use crate::error::SignResult;

/// Delivers a fully built request and returns the raw response.
///
/// Implementations must not follow redirects on their own; the caller needs
/// to see redirect responses to handle them.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send one request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SignError::Transport`] when the request could not be delivered.
    fn round_trip(&self, request: http::Request<RequestBody>)
    -> SignResult<http::Response<Bytes>>;
}

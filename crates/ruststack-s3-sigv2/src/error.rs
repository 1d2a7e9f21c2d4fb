//! Error types for SigV2 request signing.
//!
//! Every failure inside the signing core is reported through [`SignError`].
//! Nothing here aborts the process; the caller decides what to do with it.

/// Errors that can occur while assembling, signing, or dispatching a request.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// The `http` crate rejected the method, URI, or a header while building the request.
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] http::Error),

    /// A rewritten request URI could not be parsed.
    #[error("invalid request URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// The parts of a rewritten request URI do not form a valid URI.
    #[error("invalid request URI parts: {0}")]
    InvalidUriParts(#[from] http::uri::InvalidUriParts),

    /// A header value contains bytes that are not allowed in HTTP headers.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// A header name is not a valid HTTP token.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Presigning needs both the access key ID and the secret access key.
    #[error("presign requires access key and secret key")]
    MissingCredentials,

    /// The presign expiry does not fit in a Unix timestamp.
    #[error("presign expiry out of range: {expires_secs} seconds after {now}")]
    ExpiryOutOfRange {
        /// Seconds since the epoch at signing time.
        now: i64,
        /// Requested validity window.
        expires_secs: i64,
    },

    /// The request was handed off for dispatch but no transport is configured.
    #[error("no transport configured for request dispatch")]
    MissingTransport,

    /// The transport failed to deliver the request.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Convenience result type for signing operations.
pub type SignResult<T> = Result<T, SignError>;

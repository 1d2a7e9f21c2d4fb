//! Outbound request assembly.
//!
//! A [`SigningRequest`] pairs an [`http::Request`] with the configuration it
//! was built from. There are three ways to build one, differing only in what
//! body they accept:
//!
//! - [`SigningRequest::presigned`]: no body; used as a template for a presigned URL.
//! - [`SigningRequest::unauthenticated`]: any one-shot reader; never signed.
//! - [`SigningRequest::authenticated`]: a seekable reader, so the transport can
//!   replay the body after a redirect or retry.
//!
//! All three resolve the method, build the target URL, and set `User-Agent`
//! (plus `Accept` when configured). Construction performs no I/O.

use std::io::Read;

use bytes::Bytes;
use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use tracing::debug;

use crate::body::{ReadSeek, RequestBody};
use crate::config::SigV2Config;
use crate::error::{SignError, SignResult};
use crate::operation::Operation;
use crate::transport::Transport;

/// An in-flight request being prepared for signing and dispatch.
///
/// Owned by the call that built it; signing mutates its headers, so a request
/// must not be shared between concurrent signers. The config is only borrowed
/// and never written.
#[derive(Debug)]
pub struct SigningRequest<'a> {
    pub(crate) request: http::Request<RequestBody>,
    pub(crate) config: &'a SigV2Config,
    pub(crate) expires_secs: i64,
}

impl<'a> SigningRequest<'a> {
    /// Build a body-less request to be turned into a presigned URL.
    ///
    /// `expires_secs` is how long the URL stays valid once presigned.
    /// Credentials are only checked when the URL is generated.
    pub fn presigned(
        op: &Operation,
        config: &'a SigV2Config,
        expires_secs: i64,
    ) -> SignResult<Self> {
        Self::assemble(op, config, RequestBody::Empty, expires_secs)
    }

    /// Build a request that will be sent without a signature.
    pub fn unauthenticated(
        op: &Operation,
        config: &'a SigV2Config,
        body: Option<Box<dyn Read + Send>>,
    ) -> SignResult<Self> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Reader);
        Self::assemble(op, config, body, 0)
    }

    /// Build a request to be signed with the configured credentials.
    pub fn authenticated(
        op: &Operation,
        config: &'a SigV2Config,
        body: Option<Box<dyn ReadSeek>>,
    ) -> SignResult<Self> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Seekable);
        Self::assemble(op, config, body, 0)
    }

    fn assemble(
        op: &Operation,
        config: &'a SigV2Config,
        body: RequestBody,
        expires_secs: i64,
    ) -> SignResult<Self> {
        let url = op.request_url(config);

        let mut builder = http::Request::builder()
            .method(op.method())
            .uri(url.as_str())
            .header(USER_AGENT, config.user_agent.as_str());
        if !config.accept_type.is_empty() {
            builder = builder.header(ACCEPT, config.accept_type.as_str());
        }
        let request = builder.body(body)?;

        debug!(method = %request.method(), url = %url, "Assembled S3 request");

        Ok(Self {
            request,
            config,
            expires_secs,
        })
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// The request target.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    /// All request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// The first value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
    }

    /// Set a header, replacing any existing values.
    pub fn set_header(&mut self, name: &str, value: &str) -> SignResult<()> {
        let name = HeaderName::try_from(name)?;
        let value = HeaderValue::from_str(value)?;
        self.request.headers_mut().insert(name, value);
        Ok(())
    }

    /// Mutable access to the body, e.g. to rewind it before a resend.
    pub fn body_mut(&mut self) -> &mut RequestBody {
        self.request.body_mut()
    }

    /// Validity window used for presigning, in seconds.
    #[must_use]
    pub fn expires_secs(&self) -> i64 {
        self.expires_secs
    }

    /// The configuration this request was built from.
    #[must_use]
    pub fn config(&self) -> &'a SigV2Config {
        self.config
    }

    /// Give up the wrapper and return the plain HTTP request.
    #[must_use]
    pub fn into_inner(self) -> http::Request<RequestBody> {
        self.request
    }

    /// Sign (when credentials are configured) and send through the configured transport.
    pub fn send(self) -> SignResult<http::Response<Bytes>> {
        let config = self.config;
        let transport = config
            .transport
            .as_deref()
            .ok_or(SignError::MissingTransport)?;
        self.send_with(transport)
    }

    /// Sign (when credentials are configured) and send through `transport`.
    ///
    /// Requests are only signed if both keys are set; either way they are
    /// handed to the transport.
    pub fn send_with(mut self, transport: &dyn Transport) -> SignResult<http::Response<Bytes>> {
        if self.config.has_credentials() {
            self.sign_v2()?;
        }
        transport.round_trip(self.request)
    }
}

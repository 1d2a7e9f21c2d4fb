//! AWS Signature Version 2 signing.
//!
//! SigV2 uses HMAC-SHA1 keyed with the secret access key. The result is
//! applied in one of three ways:
//!
//! - **Header signing**: `Authorization: AWS <AWSAccessKeyId>:<Signature>`,
//!   where `Signature = Base64(HMAC-SHA1(SecretKey, StringToSign))`.
//! - **Presigned URL**: `AWSAccessKeyId`, `Expires` and `Signature` query
//!   parameters over a reduced string to sign:
//!
//!   ```text
//!   HTTP-Verb + "\n\n\n" + Expires + "\n" + Path
//!   ```
//!
//! - **POST policy**: the signature of an already Base64-encoded policy document.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use http::header::{AUTHORIZATION, DATE};
use http::{HeaderValue, Uri};
use percent_encoding::percent_decode_str;
use sha1::Sha1;
use tracing::{debug, warn};

use crate::canonical::string_to_sign;
use crate::endpoint::host_suffix_for_region;
use crate::error::{SignError, SignResult};
use crate::path::query_escape;
use crate::request::SigningRequest;

type HmacSha1 = Hmac<Sha1>;

/// `strftime` pattern for HTTP-date header values.
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Query parameter carrying the access key in presigned URLs.
pub const PARAM_ACCESS_KEY_ID: &str = "AWSAccessKeyId";
/// Query parameter carrying the expiry (Unix seconds) in presigned URLs.
pub const PARAM_EXPIRES: &str = "Expires";
/// Query parameter carrying the signature in presigned URLs.
pub const PARAM_SIGNATURE: &str = "Signature";

/// Compute a SigV2 signature: `Base64(HMAC-SHA1(secret, string_to_sign))`.
///
/// # Examples
///
/// ```
/// use ruststack_s3_sigv2::sigv2::compute_signature;
///
/// let sig = compute_signature(
///     "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
///     "GET\n\n\nTue, 27 Mar 2007 19:36:42 +0000\n/johnsmith/photos/puppy.jpg",
/// );
/// assert_eq!(sig, "bWq2s1WEIj+Ydj0vQ697zp+IXMU=");
/// ```
#[must_use]
pub fn compute_signature(secret_key: &str, string_to_sign: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC can accept any key length");
    mac.update(string_to_sign.as_bytes());
    let result = mac.finalize().into_bytes();
    BASE64.encode(result)
}

/// Sign a Base64-encoded POST policy document for browser uploads.
///
/// The secret key is not checked; an empty key yields a well-formed but
/// useless signature.
#[must_use]
pub fn post_policy_signature(secret_key: &str, policy_base64: &str) -> String {
    compute_signature(secret_key, policy_base64)
}

/// Format a timestamp as an HTTP-date header value.
#[must_use]
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format(HTTP_DATE_FORMAT).to_string()
}

impl SigningRequest<'_> {
    /// Sign the request in place using the current time for a missing `Date`.
    pub fn sign_v2(&mut self) -> SignResult<()> {
        self.sign_v2_at(Utc::now())
    }

    /// Sign the request in place, using `now` for the `Date` header if none is set.
    ///
    /// Sets `Authorization: AWS <access key>:<signature>`. Credentials are
    /// not validated here; callers check them before deciding to sign.
    pub fn sign_v2_at(&mut self, now: DateTime<Utc>) -> SignResult<()> {
        self.ensure_date(now)?;

        let string_to_sign = string_to_sign(&self.request, self.virtual_host_suffix());
        debug!(
            access_key_id = %self.config.access_key_id,
            string_to_sign = ?string_to_sign,
            "Built SigV2 string to sign"
        );

        let signature = compute_signature(&self.config.secret_access_key, &string_to_sign);
        let authorization = format!("AWS {}:{signature}", self.config.access_key_id);
        self.request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);

        Ok(())
    }

    /// Generate a presigned URL valid for [`Self::expires_secs`] from now.
    pub fn presign_v2(&mut self) -> SignResult<String> {
        self.presign_v2_at(Utc::now())
    }

    /// Generate a presigned URL valid for [`Self::expires_secs`] after `now`.
    ///
    /// Adds (or overwrites) the `AWSAccessKeyId`, `Expires` and `Signature`
    /// query parameters on the request and returns the resulting absolute URL.
    /// The query is re-encoded with keys in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::MissingCredentials`] if either key is empty, and
    /// [`SignError::ExpiryOutOfRange`] if `now + expires_secs` overflows.
    pub fn presign_v2_at(&mut self, now: DateTime<Utc>) -> SignResult<String> {
        if !self.config.has_credentials() {
            return Err(SignError::MissingCredentials);
        }
        self.ensure_date(now)?;

        let expires = now.timestamp().checked_add(self.expires_secs).ok_or(
            SignError::ExpiryOutOfRange {
                now: now.timestamp(),
                expires_secs: self.expires_secs,
            },
        )?;
        let path = percent_decode_str(self.request.uri().path()).decode_utf8_lossy();
        let sign_text = format!("{}\n\n\n{expires}\n{path}", self.request.method());
        debug!(
            access_key_id = %self.config.access_key_id,
            expires,
            string_to_sign = ?sign_text,
            "Built SigV2 presign string to sign"
        );

        let signature = compute_signature(&self.config.secret_access_key, &sign_text);

        let mut params = query_params(self.request.uri().query().unwrap_or_default());
        params.insert(
            PARAM_ACCESS_KEY_ID.to_owned(),
            vec![self.config.access_key_id.clone()],
        );
        params.insert(PARAM_EXPIRES.to_owned(), vec![expires.to_string()]);
        params.insert(PARAM_SIGNATURE.to_owned(), vec![signature]);

        let uri = with_query(self.request.uri(), &encode_query(&params))?;
        let url = uri.to_string();
        *self.request.uri_mut() = uri;

        Ok(url)
    }

    /// Sign a Base64-encoded POST policy with this request's secret key.
    #[must_use]
    pub fn post_presign_signature(&self, policy_base64: &str) -> String {
        post_policy_signature(&self.config.secret_access_key, policy_base64)
    }

    /// An empty `Date` counts as missing.
    fn ensure_date(&mut self, now: DateTime<Utc>) -> SignResult<()> {
        if self.request.headers().get(DATE).is_none_or(HeaderValue::is_empty) {
            let date = HeaderValue::from_str(&http_date(now))?;
            self.request.headers_mut().insert(DATE, date);
        }
        Ok(())
    }

    /// Host suffix to strip when the bucket lives in the host name.
    fn virtual_host_suffix(&self) -> Option<&'static str> {
        if !self.config.virtual_style {
            return None;
        }
        let suffix = host_suffix_for_region(&self.config.region);
        match suffix {
            Some(suffix) => debug!(region = %self.config.region, suffix, "Resolved virtual host suffix"),
            None => warn!(
                region = %self.config.region,
                "No virtual host suffix for region, signing path-style resource"
            ),
        }
        suffix
    }
}

/// Parse a raw query into a sorted multi-map, decoding `+` and `%XX`.
fn query_params(query: &str) -> BTreeMap<String, Vec<String>> {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

/// Serialize a multi-map as `k=v&k=v`, keys in sorted order.
fn encode_query(params: &BTreeMap<String, Vec<String>>) -> String {
    params
        .iter()
        .flat_map(|(key, values)| {
            let key = query_escape(key);
            values
                .iter()
                .map(move |value| format!("{key}={}", query_escape(value)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Replace the query of `uri`, keeping scheme, authority and path.
fn with_query(uri: &Uri, query: &str) -> SignResult<Uri> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(format!("{}?{query}", uri.path()).parse()?);
    Ok(Uri::from_parts(parts)?)
}

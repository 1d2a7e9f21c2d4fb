//! Canonical string construction for AWS Signature Version 2.
//!
//! The string to sign is assembled from the request as:
//!
//! ```text
//! StringToSign = HTTP-Verb + "\n" +
//!                Content-MD5 + "\n" +
//!                Content-Type + "\n" +
//!                Date + "\n" +
//!                CanonicalizedAmzHeaders +
//!                CanonicalizedResource
//! ```
//!
//! Every function here is pure: the same request always produces the same
//! bytes, given the same `Date` header.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use http::HeaderMap;
use percent_encoding::percent_decode_str;

use crate::path::{encode_path, query_escape};

/// Prefix selecting the provider metadata headers that take part in signing.
pub const AMZ_HEADER_PREFIX: &str = "x-amz";

/// S3 sub-resources that take part in the canonical resource, sorted.
///
/// Query parameters outside this list stay on the wire but are not signed.
pub const SUB_RESOURCES: &[&str] = &[
    "acl",
    "location",
    "logging",
    "notification",
    "partNumber",
    "policy",
    "requestPayment",
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
    "response-content-language",
    "response-content-type",
    "response-expires",
    "torrent",
    "uploadId",
    "uploads",
    "versionId",
    "versioning",
    "versions",
    "website",
];

/// Build the SigV2 string to sign for a request.
///
/// `virtual_host_suffix` is the endpoint suffix (e.g. `s3.amazonaws.com`)
/// when the request addresses its bucket in the host name; the bucket is then
/// recovered from the host for the canonical resource.
///
/// # Examples
///
/// ```
/// use ruststack_s3_sigv2::canonical::string_to_sign;
///
/// let request = http::Request::get("http://s3.example.com/mybucket/mykey")
///     .header("date", "Tue, 27 Mar 2007 19:36:42 +0000")
///     .body(())
///     .unwrap();
/// assert_eq!(
///     string_to_sign(&request, None),
///     "GET\n\n\nTue, 27 Mar 2007 19:36:42 +0000\n/mybucket/mykey"
/// );
/// ```
#[must_use]
pub fn string_to_sign<B>(request: &http::Request<B>, virtual_host_suffix: Option<&str>) -> String {
    let headers = request.headers();
    let method = request.method().as_str();
    let content_md5 = header_value(headers, "content-md5");
    let content_type = header_value(headers, "content-type");
    let date = header_value(headers, "date");

    let amz_headers = canonicalized_amz_headers(headers);
    let resource = canonicalized_resource(request.uri(), virtual_host_suffix);

    format!("{method}\n{content_md5}\n{content_type}\n{date}\n{amz_headers}{resource}")
}

/// Build the CanonicalizedAmzHeaders string.
///
/// Every header whose name starts with `x-amz` is emitted as `name:values\n`
/// in ascending name order. Names are lowercase, so differently-cased copies
/// of one header merge into a single entry. Multiple values are joined with
/// `,` in the order they were added.
///
/// Values are written exactly as stored: no whitespace trimming and no RFC 2616
/// line unfolding. Signatures computed this way must keep matching those
/// produced by existing clients.
#[must_use]
pub fn canonicalized_amz_headers(headers: &HeaderMap) -> String {
    let mut amz_headers: BTreeMap<&str, Vec<Cow<'_, str>>> = BTreeMap::new();

    for (name, value) in headers {
        let name_str = name.as_str();
        if name_str.starts_with(AMZ_HEADER_PREFIX) {
            amz_headers
                .entry(name_str)
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()));
        }
    }

    let mut result = String::new();
    for (name, values) in &amz_headers {
        result.push_str(name);
        result.push(':');
        result.push_str(&values.join(","));
        result.push('\n');
    }

    result
}

/// Build the CanonicalizedResource string.
///
/// The path is percent-decoded and re-encoded with [`encode_path`]; in
/// virtual-hosted style it is prefixed with `/<bucket>` taken from the host.
/// Allowed sub-resources follow in [`SUB_RESOURCES`] order, whatever their
/// order in the request. Only the first value of a repeated parameter counts.
#[must_use]
pub fn canonicalized_resource(uri: &http::Uri, virtual_host_suffix: Option<&str>) -> String {
    let path = percent_decode_str(uri.path()).decode_utf8_lossy();

    let mut result = match virtual_host_suffix {
        Some(suffix) => {
            let bucket = bucket_from_host(uri, suffix);
            encode_path(&format!("/{bucket}{path}")).into_owned()
        }
        None => encode_path(&path).into_owned(),
    };

    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        write_sub_resources(&mut result, query);
    }

    result
}

/// Recover the bucket from a virtual host by stripping `.<suffix>`.
///
/// A host that does not end with the suffix is used whole.
fn bucket_from_host<'a>(uri: &'a http::Uri, suffix: &str) -> &'a str {
    let host = uri.authority().map_or("", http::uri::Authority::as_str);
    host.strip_suffix(suffix)
        .and_then(|h| h.strip_suffix('.'))
        .unwrap_or(host)
}

fn write_sub_resources(buf: &mut String, query: &str) {
    let mut params: HashMap<Cow<'_, str>, Cow<'_, str>> = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params.entry(key).or_insert(value);
    }

    let mut matched = 0usize;
    for resource in SUB_RESOURCES {
        let Some(value) = params.get(*resource) else {
            continue;
        };
        buf.push(if matched == 0 { '?' } else { '&' });
        matched += 1;
        buf.push_str(resource);
        if !value.is_empty() {
            buf.push('=');
            buf.push_str(&query_escape(value));
        }
    }
}

/// Extract a header value as a string, returning empty string if missing.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Cow<'a, str> {
    headers
        .get(name)
        .map_or(Cow::Borrowed(""), |v| String::from_utf8_lossy(v.as_bytes()))
}

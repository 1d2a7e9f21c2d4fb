//! Region to host-suffix table for S3-compatible endpoints.
//!
//! Virtual-hosted-style requests carry the bucket in the host name
//! (`<bucket>.<suffix>`). Recovering the bucket for the canonical resource
//! requires knowing which suffix belongs to the configured region, and
//! building a config from an endpoint requires the reverse lookup.

/// Known `(region, host suffix)` pairs, in lookup order.
///
/// When more than one entry could match, the first one wins.
pub const REGION_HOST_SUFFIXES: &[(&str, &str)] = &[
    ("us-east-1", "s3.amazonaws.com"),
    ("us-west-1", "s3-us-west-1.amazonaws.com"),
    ("us-west-2", "s3-us-west-2.amazonaws.com"),
    ("eu-west-1", "s3-eu-west-1.amazonaws.com"),
    ("eu-central-1", "s3-eu-central-1.amazonaws.com"),
    ("ap-southeast-1", "s3-ap-southeast-1.amazonaws.com"),
    ("ap-southeast-2", "s3-ap-southeast-2.amazonaws.com"),
    ("ap-northeast-1", "s3-ap-northeast-1.amazonaws.com"),
    ("sa-east-1", "s3-sa-east-1.amazonaws.com"),
    ("cn-north-1", "s3.cn-north-1.amazonaws.com.cn"),
    ("google", "storage.googleapis.com"),
];

/// Look up the virtual-host suffix for a region.
///
/// # Examples
///
/// ```
/// use ruststack_s3_sigv2::endpoint::host_suffix_for_region;
///
/// assert_eq!(host_suffix_for_region("us-east-1"), Some("s3.amazonaws.com"));
/// assert_eq!(host_suffix_for_region("mars-north-1"), None);
/// ```
#[must_use]
pub fn host_suffix_for_region(region: &str) -> Option<&'static str> {
    REGION_HOST_SUFFIXES
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, suffix)| *suffix)
}

/// Resolve the region served by a host.
///
/// Matches either the bare suffix (`s3.amazonaws.com`) or a virtual host
/// under it (`bucket.s3.amazonaws.com`). A trailing `:port` is ignored.
#[must_use]
pub fn region_for_host(host: &str) -> Option<&'static str> {
    let host = strip_port(host);
    REGION_HOST_SUFFIXES
        .iter()
        .find(|(_, suffix)| {
            host == *suffix
                || host
                    .strip_suffix(suffix)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
        .map(|(region, _)| *region)
}

/// Whether the host is a known endpoint that serves virtual-hosted-style requests.
#[must_use]
pub fn is_virtual_host_supported(host: &str) -> bool {
    region_for_host(host).is_some()
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

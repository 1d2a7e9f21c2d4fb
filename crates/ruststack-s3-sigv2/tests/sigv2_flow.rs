//! End-to-end signing flows: build, sign, and hand off to a transport.

use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use ruststack_s3_sigv2::{
    Operation, ReadSeek, RequestBody, SigV2Config, SignError, SignResult, SigningRequest,
    Transport,
};
use tracing_subscriber::EnvFilter;

const GOLDEN_DATE: &str = "Tue, 27 Mar 2007 19:36:42 +0000";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2007, 3, 27, 19, 36, 42).unwrap()
}

/// A transport that records what it was given and answers `200 OK`.
#[derive(Debug, Default)]
struct RecordingTransport {
    seen: Mutex<Vec<(String, Option<String>, Vec<u8>)>>,
}

impl Transport for RecordingTransport {
    fn round_trip(
        &self,
        request: http::Request<RequestBody>,
    ) -> SignResult<http::Response<Bytes>> {
        let (parts, mut body) = request.into_parts();
        let mut payload = Vec::new();
        body.read_to_end(&mut payload)
            .map_err(|e| SignError::Transport(Box::new(e)))?;
        let authorization = parts
            .headers
            .get("authorization")
            .map(|v| v.to_str().unwrap().to_owned());
        self.seen
            .lock()
            .unwrap()
            .push((parts.uri.to_string(), authorization, payload));
        Ok(http::Response::new(Bytes::from_static(b"ok")))
    }
}

#[derive(Debug)]
struct FailingTransport;

impl Transport for FailingTransport {
    fn round_trip(
        &self,
        _request: http::Request<RequestBody>,
    ) -> SignResult<http::Response<Bytes>> {
        Err(SignError::Transport("connection refused".into()))
    }
}

#[test]
fn test_should_match_golden_authorization_header() {
    init_tracing();
    let config = SigV2Config::builder()
        .access_key_id("AKID".to_owned())
        .secret_access_key("secret".to_owned())
        .build();
    let op = Operation::new("http://s3.example.com", "GET", "/mybucket/mykey");
    let mut request = SigningRequest::authenticated(&op, &config, None).unwrap();
    request.set_header("Date", GOLDEN_DATE).unwrap();

    request.sign_v2_at(fixed_now()).unwrap();

    assert_eq!(
        request.header("Authorization"),
        Some("AWS AKID:HQNVGKB+oA7luBF1+xjIdPP7R1o=")
    );
}

#[test]
fn test_should_sign_and_send_when_credentials_present() {
    init_tracing();
    let transport = Arc::new(RecordingTransport::default());
    let config = SigV2Config::builder()
        .access_key_id("AKID".to_owned())
        .secret_access_key("secret".to_owned())
        .transport(transport.clone())
        .build();
    let op = Operation::new("http://s3.example.com", "PUT", "/mybucket/notes/día 1.txt");
    let body: Box<dyn ReadSeek> = Box::new(Cursor::new(b"hello world".to_vec()));
    let mut request = SigningRequest::authenticated(&op, &config, Some(body)).unwrap();
    request.set_header("Date", GOLDEN_DATE).unwrap();
    request.set_header("Content-Type", "text/plain").unwrap();

    let response = request.send().unwrap();
    assert_eq!(response.body().as_ref(), b"ok");

    let seen = transport.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (uri, authorization, payload) = &seen[0];
    assert_eq!(uri, "http://s3.example.com/mybucket/notes/d%C3%ADa%201.txt");
    let expected = ruststack_s3_sigv2::compute_signature(
        "secret",
        &format!("PUT\n\ntext/plain\n{GOLDEN_DATE}\n/mybucket/notes/d%C3%ADa%201.txt"),
    );
    assert_eq!(authorization.as_deref(), Some(format!("AWS AKID:{expected}").as_str()));
    assert_eq!(payload, b"hello world");
}

#[test]
fn test_should_send_unsigned_without_credentials() {
    init_tracing();
    let transport = RecordingTransport::default();
    let config = SigV2Config::default();
    let op = Operation::new("http://s3.example.com", "GET", "/public/readme.md");
    let request = SigningRequest::unauthenticated(&op, &config, None).unwrap();

    request.send_with(&transport).unwrap();

    let seen = transport.seen.lock().unwrap();
    assert_eq!(seen[0].1, None);
}

#[test]
fn test_should_propagate_transport_error() {
    let config = SigV2Config::builder()
        .transport(Arc::new(FailingTransport) as Arc<dyn Transport>)
        .build();
    let op = Operation::new("http://s3.example.com", "GET", "/b");
    let request = SigningRequest::unauthenticated(&op, &config, None).unwrap();

    let err = request.send().unwrap_err();
    assert!(matches!(err, SignError::Transport(_)));
    assert_eq!(err.to_string(), "transport error: connection refused");
}

#[test]
fn test_should_share_config_across_concurrent_signers() {
    let config = SigV2Config::builder()
        .access_key_id("AKID".to_owned())
        .secret_access_key("secret".to_owned())
        .build();

    let headers: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let op = Operation::new("http://s3.example.com", "GET", "/mybucket/mykey");
                    let mut request = SigningRequest::authenticated(&op, &config, None).unwrap();
                    request.set_header("Date", GOLDEN_DATE).unwrap();
                    request.sign_v2_at(fixed_now()).unwrap();
                    request.header("authorization").unwrap().to_owned()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(headers.iter().all(|h| h == "AWS AKID:HQNVGKB+oA7luBF1+xjIdPP7R1o="));
}

#[test]
fn test_should_presign_virtual_host_url() {
    let config = SigV2Config::for_endpoint("https://s3.amazonaws.com", "AKID", "secret").unwrap();
    let op = Operation::new("https://photos.s3.amazonaws.com", "GET", "/photos/cat.jpg");
    let mut request = SigningRequest::presigned(&op, &config, 60).unwrap();

    let url = request.presign_v2_at(fixed_now()).unwrap();

    let expected = ruststack_s3_sigv2::compute_signature("secret", "GET\n\n\n1175024262\n/cat.jpg");
    assert_eq!(
        url,
        format!(
            "https://photos.s3.amazonaws.com/cat.jpg?AWSAccessKeyId=AKID&Expires=1175024262&Signature={}",
            ruststack_s3_sigv2::path::query_escape(&expected)
        )
    );
}

//! HTTP/1.1 wire-size accounting.
//!
//! Hyper does not expose the exact number of bytes written or read, so byte counts are
//! estimated from the framing: start line, `name: value\r\n` headers, the blank line and
//! the body.

use super::util::{has_header, host_header_value};
use super::{Error, Result};

const CRLF: u64 = 2;

pub(super) fn request_bytes(
    method: &http::Method,
    url: &str,
    headers: &[(String, String)],
    body_len: u64,
) -> Result<u64> {
    let parsed = url::Url::parse(url).map_err(|_| Error::InvalidUrl(url.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::UnsupportedScheme(url.to_string()));
    }

    // "METHOD SP path SP HTTP/1.1 CRLF"
    let target_len = parsed.path().len() + parsed.query().map_or(0, |q| q.len() + 1);
    let mut total = (method.as_str().len() + 1 + target_len + 1 + 8) as u64 + CRLF;

    total += headers
        .iter()
        .map(|(k, v)| header_bytes(k.len(), v.len()))
        .sum::<u64>();

    // Implicit headers the client adds on our behalf.
    if !has_header(headers, "host")
        && let Some(host) = host_header_value(&parsed)
    {
        total += header_bytes("host".len(), host.len());
    }
    if body_len != 0 && !has_header(headers, "content-length") {
        total += header_bytes("content-length".len(), body_len.to_string().len());
    }

    Ok(total + CRLF + body_len)
}

pub(super) fn response_head_bytes(
    version: http::Version,
    status: http::StatusCode,
    headers: &http::HeaderMap,
) -> u64 {
    let version_len = match version {
        http::Version::HTTP_2 | http::Version::HTTP_3 => 6,
        _ => 8,
    };

    // "HTTP/1.1 SP 200 CRLF", reason phrase ignored.
    let status_line = version_len + 1 + status.as_str().len() as u64 + CRLF;
    let header_total: u64 = headers
        .iter()
        .map(|(name, value)| header_bytes(name.as_str().len(), value.as_bytes().len()))
        .sum();

    status_line + header_total + CRLF
}

fn header_bytes(name_len: usize, value_len: usize) -> u64 {
    // "name: value\r\n"
    (name_len + 2 + value_len) as u64 + CRLF
}

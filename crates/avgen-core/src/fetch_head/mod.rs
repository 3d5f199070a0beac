//! HTTP HEAD / metadata probing.
//!
//! Uses the curl crate (libcurl) to fetch response headers, following
//! redirects, and read `Content-Length` so the downloader can decide between
//! ranged chunks and a single stream.

mod parse;

use std::str;
use std::time::Duration;

pub(crate) use parse::parse_headers;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const TOTAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResult {
    /// HTTP status of the final response (after redirects).
    pub status: u32,
    /// Total size in bytes, if the final response carried `Content-Length`.
    pub content_length: Option<u64>,
    /// True if the final response sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

impl HeadResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Size usable for chunking: known, non-zero, from a 2xx response.
    pub fn known_size(&self) -> Option<u64> {
        if !self.is_success() {
            return None;
        }
        self.content_length.filter(|&n| n > 0)
    }
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects. Non-2xx statuses are returned, not raised; only
/// transport failures are errors.
pub fn probe(url: &str) -> Result<HeadResult, curl::Error> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    easy.timeout(TOTAL_TIMEOUT)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(parse_headers(status, &headers))
}

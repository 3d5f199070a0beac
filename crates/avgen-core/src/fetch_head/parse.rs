//! Parse HTTP response header lines into HeadResult.

use super::HeadResult;

/// Parse collected header lines. With redirects curl reports every hop, so
/// fields reset at each status line and only the final response counts.
pub(crate) fn parse_headers(status: u32, lines: &[String]) -> HeadResult {
    let mut content_length = None;
    let mut accept_ranges = false;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            content_length = None;
            accept_ranges = false;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse::<u64>().ok();
            }
            if name.eq_ignore_ascii_case("accept-ranges") {
                accept_ranges = value.eq_ignore_ascii_case("bytes");
            }
        }
    }

    HeadResult {
        status,
        content_length,
        accept_ranges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_headers_content_length_and_ranges() {
        let r = parse_headers(
            200,
            &lines(&["HTTP/1.1 200 OK", "Content-Length: 12345", "Accept-Ranges: bytes"]),
        );
        assert_eq!(r.content_length, Some(12345));
        assert!(r.accept_ranges);
        assert_eq!(r.known_size(), Some(12345));
    }

    #[test]
    fn parse_headers_no_ranges() {
        let r = parse_headers(
            200,
            &lines(&["Content-Length: 999", "Accept-Ranges: none"]),
        );
        assert_eq!(r.content_length, Some(999));
        assert!(!r.accept_ranges);
    }

    #[test]
    fn redirect_hop_headers_are_discarded() {
        let r = parse_headers(
            200,
            &lines(&[
                "HTTP/1.1 302 Found",
                "Content-Length: 154",
                "Location: https://cdn.example.com/v.mp4",
                "",
                "HTTP/2 200",
                "content-type: video/mp4",
            ]),
        );
        assert_eq!(r.content_length, None);
        assert_eq!(r.known_size(), None);
    }

    #[test]
    fn zero_length_is_unknown_size() {
        let r = parse_headers(200, &lines(&["HTTP/1.1 200 OK", "Content-Length: 0"]));
        assert_eq!(r.content_length, Some(0));
        assert_eq!(r.known_size(), None);
    }

    #[test]
    fn error_status_has_no_known_size() {
        let r = parse_headers(403, &lines(&["HTTP/1.1 403 Forbidden", "Content-Length: 243"]));
        assert!(!r.is_success());
        assert_eq!(r.known_size(), None);
    }
}

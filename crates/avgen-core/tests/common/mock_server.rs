//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes are keyed by method and path (query ignored). JSON routes answer a
//! scripted sequence of bodies, repeating the last one. File routes answer
//! HEAD and Range GET like a CDN, with switches to misbehave. Every request is
//! recorded. Routes may be added after start, so a result URL can point back
//! at the server itself.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct FileOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// Overrides the Content-Length sent on HEAD (e.g. 0).
    pub head_length: Option<u64>,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            head_length: None,
            support_ranges: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

enum Route {
    Json(VecDeque<String>),
    File(Arc<Vec<u8>>, FileOptions),
}

#[derive(Default)]
struct State {
    routes: HashMap<(String, String), Route>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone)]
pub struct MockServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl MockServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Absolute URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Answers `method path` with each body in turn, then keeps repeating the last.
    pub fn json(&self, method: &str, path: &str, bodies: &[serde_json::Value]) {
        let bodies = bodies.iter().map(|b| b.to_string()).collect();
        self.route(method, path, Route::Json(bodies));
    }

    pub fn file(&self, path: &str, body: Vec<u8>, opts: FileOptions) {
        let body = Arc::new(body);
        self.route("HEAD", path, Route::File(Arc::clone(&body), opts));
        self.route("GET", path, Route::File(body, opts));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    fn route(&self, method: &str, path: &str, route: Route) {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert((method.to_string(), path.to_string()), route);
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };

    let response = {
        let mut state = state.lock().unwrap();
        state.requests.push(request.clone());
        let key = (request.method.clone(), request.path.clone());
        match state.routes.get_mut(&key) {
            Some(Route::Json(bodies)) => {
                let body = if bodies.len() > 1 {
                    bodies.pop_front().unwrap_or_default()
                } else {
                    bodies.front().cloned().unwrap_or_default()
                };
                Response::json(body)
            }
            Some(Route::File(body, opts)) => file_response(&request, body, *opts),
            None => Response::status("404 Not Found"),
        }
    };
    let _ = stream.write_all(&response.head);
    let _ = stream.write_all(&response.body);
}

struct Response {
    head: Vec<u8>,
    body: Vec<u8>,
}

impl Response {
    fn status(status: &str) -> Self {
        Self {
            head: format!(
                "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            )
            .into_bytes(),
            body: Vec::new(),
        }
    }

    fn json(body: String) -> Self {
        Self {
            head: format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .into_bytes(),
            body: body.into_bytes(),
        }
    }
}

fn file_response(request: &RecordedRequest, body: &[u8], opts: FileOptions) -> Response {
    let total = body.len() as u64;
    if request.method == "HEAD" {
        if !opts.head_allowed {
            return Response::status("405 Method Not Allowed");
        }
        let length = opts.head_length.unwrap_or(total);
        let accept_ranges = if opts.support_ranges {
            "Accept-Ranges: bytes\r\n"
        } else {
            ""
        };
        return Response {
            head: format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
                length, accept_ranges
            )
            .into_bytes(),
            body: Vec::new(),
        };
    }

    let range = request.header("range").and_then(parse_range);
    let (status, slice, content_range) = match range {
        Some((start, end_incl)) if opts.support_ranges => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start > end_incl {
                return Response::status("416 Range Not Satisfiable");
            }
            let slice = &body[start as usize..=end_incl as usize];
            (
                "206 Partial Content",
                slice,
                format!("Content-Range: bytes {}-{}/{}\r\n", start, end_incl, total),
            )
        }
        _ => ("200 OK", body, String::new()),
    };
    Response {
        head: format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            status,
            slice.len(),
            content_range
        )
        .into_bytes(),
        body: slice.to_vec(),
    }
}

/// `bytes=X-Y` → (X, Y inclusive). An open end means "to the last byte".
fn parse_range(value: &str) -> Option<(u64, u64)> {
    let value = value.trim();
    let part = value
        .strip_prefix("bytes=")
        .or_else(|| value.strip_prefix("Bytes="))?;
    let (a, b) = part.split_once('-')?;
    let start = a.trim().parse::<u64>().ok()?;
    let end = b.trim();
    let end_incl = if end.is_empty() {
        u64::MAX
    } else {
        end.parse::<u64>().ok()?
    };
    Some((start, end_incl))
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = std::str::from_utf8(&data[..header_end]).ok()?.to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?;
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (target.to_string(), None),
    };
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = data[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        query,
        headers,
        body,
    })
}

//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body for every GET and counts requests. The body can
//! be swapped while the server runs to simulate a changed remote image.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

pub struct ImageServer {
    pub base_url: String,
    body: Arc<Mutex<Vec<u8>>>,
    status: Arc<Mutex<u16>>,
    hits: Arc<AtomicUsize>,
}

impl ImageServer {
    /// URL for `path` on this server (e.g. `"img/cat.jpg"`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn set_body(&self, body: Vec<u8>) {
        *self.body.lock().unwrap() = body;
    }

    pub fn set_status(&self, status: u16) {
        *self.status.lock().unwrap() = status;
    }
}

/// Starts a server in a background thread serving `body`. Runs until the process exits.
pub fn start(body: Vec<u8>) -> ImageServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(Mutex::new(body));
    let status = Arc::new(Mutex::new(200u16));
    let hits = Arc::new(AtomicUsize::new(0));
    {
        let body = Arc::clone(&body);
        let status = Arc::clone(&status);
        let hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = body.lock().unwrap().clone();
                let status = *status.lock().unwrap();
                let hits = Arc::clone(&hits);
                thread::spawn(move || handle(stream, &body, status, &hits));
            }
        });
    }
    ImageServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        body,
        status,
        hits,
    }
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], status: u16, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let method = request.split_whitespace().next().unwrap_or("");
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    hits.fetch_add(1, Ordering::SeqCst);

    let (reason, payload): (&str, &[u8]) = match status {
        200 => ("OK", body),
        404 => ("Not Found", b""),
        _ => ("Error", b""),
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        payload.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(payload);
}

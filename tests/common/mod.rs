//! Shared helpers for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

pub const TEAMS_JSON: &str = r#"{"data": [
    {"classlabel": "Men", "teams": [
        {"r": 1, "lc": "Finish", "t": "0:06:30"},
        {"r": 2, "lc": "CP2", "t": "0:04:00"}
    ]},
    {"classlabel": "Mixed", "teams": [
        {"r": 3, "lc": "Start", "t": ""},
        {"r": 4, "lc": "Finish", "t": "0:09:00"}
    ]}
]}"#;

pub const REPLAY_JSON: &str = r#"{"data": {"locations": [
    [{"id": 1, "lo": 114.0, "la": 22.0}, {"id": 3, "lo": 0.0, "la": 0.0}],
    [{"id": 2, "lo": 114.5, "la": 22.5}],
    [{"id": 1, "lo": 114.1, "la": 22.1}, {"id": 4, "lo": 1.0, "la": 1.0}],
    [],
    [{"id": 2, "lo": 114.6, "la": 22.6}]
]}}"#;

/// Minimal HTTP responder that counts the requests it serves
pub struct TestServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Serves `routes` (request target to body) with status 200; anything
    /// else gets a 404 with a plain-text body
    pub fn start(routes: &[(&str, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let routes: HashMap<String, String> = routes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let counter = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                counter.fetch_add(1, Ordering::SeqCst);
                respond(stream, &routes);
            }
        });

        Self { base_url, hits }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn respond(mut stream: TcpStream, routes: &HashMap<String, String>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let target = request.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = match routes.get(target) {
        Some(body) => ("200 OK", body.as_str()),
        None => ("404 Not Found", "not found"),
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

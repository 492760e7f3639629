//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use gg_export::auth::AuthProvider;
use gg_export::transport::{HttpTransport, PostOutcome};

/// One call seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl RecordedPost {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Transport that replays scripted outcomes and records every call.
///
/// Once the script runs out, every call gets `fallback`.
pub struct MockTransport {
    script: Mutex<VecDeque<PostOutcome>>,
    fallback: PostOutcome,
    calls: Mutex<Vec<RecordedPost>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn always(outcome: PostOutcome) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: outcome,
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn accepting() -> Self {
        Self::always(accepted(""))
    }

    pub fn unreachable() -> Self {
        Self::always(PostOutcome::failed())
    }

    pub fn scripted(outcomes: Vec<PostOutcome>) -> Self {
        let mock = Self::unreachable();
        *mock.script.lock() = outcomes.into();
        mock
    }

    /// Sleep this long inside every call before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedPost> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post(&self, url: &str, headers: &[(String, String)], body: Bytes) -> PostOutcome {
        self.calls.lock().push(RecordedPost {
            url: url.to_string(),
            headers: headers.to_vec(),
            body,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

pub fn accepted(body: &str) -> PostOutcome {
    PostOutcome::from_response(200, body.to_string())
}

pub fn rejected(status: u16) -> PostOutcome {
    PostOutcome::from_response(status, String::new())
}

/// 200 response carrying a token document.
pub fn token_response(token: &str, expires_in: Option<i64>) -> PostOutcome {
    let body = match expires_in {
        Some(seconds) => serde_json::json!({"access_token": token, "expires_in": seconds}),
        None => serde_json::json!({"access_token": token, "token_type": "bearer"}),
    };
    accepted(&body.to_string())
}

/// Provider that hands out `Bearer token-1`, `Bearer token-2`, ...
#[derive(Default)]
pub struct CountingAuth {
    calls: AtomicUsize,
}

impl CountingAuth {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for CountingAuth {
    async fn auth_string(&self) -> String {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        format!("Bearer token-{}", n)
    }
}

/// Minimal HTTP/1.1 server answering every request with one canned response.
pub struct HttpStub {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl HttpStub {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Raw request heads and bodies received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

/// Start a stub that replies `status` with `body`.
///
/// 204 responses are sent without a body or `Content-Length`.
pub async fn spawn_http_stub(status: u16, reason: &'static str, body: &'static str) -> HttpStub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                seen.lock().push(request);
                let response = if status == 204 {
                    format!("HTTP/1.1 204 {}\r\nConnection: close\r\n\r\n", reason)
                } else {
                    format!(
                        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason,
                        body.len(),
                        body
                    )
                };
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    HttpStub { addr, requests }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(head_end) = find(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v1/metrics", addr)
}

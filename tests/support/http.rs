//! Minimal canned-response HTTP server for provider client tests.
//!
//! Each accepted connection reads one request, records it, and answers with
//! the next queued reply (or 404 once the queue is empty). A stalled reply
//! keeps the connection open without ever answering.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names lower-cased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

enum Canned {
    Respond { status: u16, body: String },
    Stall,
}

/// Fake provider API bound to an ephemeral local port.
#[derive(Clone)]
pub struct FakeProvider {
    addr: SocketAddr,
    responses: Arc<Mutex<VecDeque<Canned>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeProvider {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Self {
            addr,
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let worker = server.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let worker = worker.clone();
                tokio::spawn(async move {
                    if let Some(request) = read_request(&mut socket).await {
                        worker.requests.lock().unwrap().push(request);
                        let canned = worker
                            .responses
                            .lock()
                            .unwrap()
                            .pop_front()
                            .unwrap_or(Canned::Respond {
                                status: 404,
                                body: r#"{"message":"no canned response"}"#.to_string(),
                            });
                        let (status, body) = match canned {
                            Canned::Respond { status, body } => (status, body),
                            Canned::Stall => {
                                std::future::pending::<()>().await;
                                return;
                            }
                        };
                        let response = format!(
                            "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                });
            }
        });

        server
    }

    /// Base URL, e.g. `http://127.0.0.1:4321/api`.
    pub fn url(&self, prefix: &str) -> String {
        format!("http://{}{}", self.addr, prefix)
    }

    pub fn respond(&self, status: u16, body: serde_json::Value) {
        self.responses.lock().unwrap().push_back(Canned::Respond {
            status,
            body: body.to_string(),
        });
    }

    /// Accept the next request but never answer it.
    pub fn stall(&self) {
        self.responses.lock().unwrap().push_back(Canned::Stall);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = (header_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

//! One-shot HTTP responder for exercising the reqwest code paths in tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct CannedResponse {
    pub status: &'static str,
    pub content_type: &'static str,
    pub chunks: Vec<Vec<u8>>,
    /// Send a Content-Length header; otherwise the body ends when the socket closes
    pub sized: bool,
}

impl CannedResponse {
    pub fn stream(chunks: Vec<&str>) -> Self {
        Self {
            status: "200 OK",
            content_type: "text/event-stream",
            chunks: chunks.into_iter().map(|c| c.as_bytes().to_vec()).collect(),
            sized: false,
        }
    }

    pub fn json(status: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            chunks: vec![body.as_bytes().to_vec()],
            sized: true,
        }
    }
}

/// Serve exactly one request; the handle resolves to the raw request text.
pub async fn serve_once(response: CannedResponse) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let mut head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nConnection: close\r\n",
            response.status, response.content_type
        );
        if response.sized {
            let length: usize = response.chunks.iter().map(Vec::len).sum();
            head.push_str(&format!("Content-Length: {}\r\n", length));
        }
        head.push_str("\r\n");

        socket.write_all(head.as_bytes()).await.unwrap();
        for chunk in &response.chunks {
            socket.write_all(chunk).await.unwrap();
            socket.flush().await.unwrap();
        }
        let _ = socket.shutdown().await;
        request
    });

    (base_url, handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        if let Some(header_end) = find_header_end(&data) {
            let head = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= header_end + 4 + length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&data).to_string()
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|window| window == b"\r\n\r\n")
}

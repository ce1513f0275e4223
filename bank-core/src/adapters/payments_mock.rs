//! Mock payments service for testing
//!
//! Serves the same routes as the real service:
//! - POST /v1/api/payments accepts a payment instruction, returns a receipt
//! - GET /v1/api/payments/{id} returns the receipt for a known payment id

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::ports::{PaymentInstruction, PaymentReceipt, PaymentStatus};

const BASE_PATH: &str = "/v1/api/payments";

/// Mock payments server for testing
pub struct MockPaymentsServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Answer every request with this HTTP status
    pub fail_with: Option<u16>,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

type Payments = Arc<Mutex<HashMap<String, PaymentReceipt>>>;

impl MockPaymentsServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let payments: Payments = Arc::new(Mutex::new(HashMap::new()));

        // Set listener to non-blocking for graceful shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let payments = payments.clone();
                        thread::spawn(move || handle_connection(stream, &cfg, &payments));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}{}", self.port, BASE_PATH)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockPaymentsServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read one request: headers, then as many body bytes as Content-Length says
fn read_request(stream: &mut TcpStream) -> Option<(String, String, String)> {
    stream.set_nonblocking(false).ok()?;
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let mut request_line = head.lines().next().unwrap_or("").split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let body = String::from_utf8_lossy(&data[header_end..]).to_string();
    Some((method, path, body))
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, payments: &Payments) {
    let Some((method, path, body)) = read_request(&mut stream) else {
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(Duration::from_millis(config.delay_ms));
    }

    if let Some(status) = config.fail_with {
        send_response(&mut stream, status, r#"{"message": "simulated failure"}"#);
        return;
    }

    let path = path.split('?').next().unwrap_or("");
    match method.as_str() {
        "POST" if path == BASE_PATH => {
            let instruction: PaymentInstruction = match serde_json::from_str(&body) {
                Ok(instruction) => instruction,
                Err(_) => {
                    send_response(&mut stream, 400, r#"{"message": "malformed instruction"}"#);
                    return;
                }
            };
            let receipt = PaymentReceipt {
                payment_id: format!("pay_{}", instruction.reference),
                reference: instruction.reference,
                status: PaymentStatus::Accepted,
            };
            if let Ok(mut map) = payments.lock() {
                map.insert(
                    receipt.payment_id.clone(),
                    PaymentReceipt {
                        status: PaymentStatus::Settled,
                        ..receipt.clone()
                    },
                );
            }
            let json = serde_json::to_string(&receipt).unwrap_or_default();
            send_response(&mut stream, 201, &json);
        }
        "GET" if path.starts_with(BASE_PATH) => {
            let id = path[BASE_PATH.len()..].trim_start_matches('/');
            let found = payments.lock().ok().and_then(|map| map.get(id).cloned());
            match found {
                Some(receipt) => {
                    let json = serde_json::to_string(&receipt).unwrap_or_default();
                    send_response(&mut stream, 200, &json);
                }
                None => send_response(&mut stream, 404, r#"{"message": "unknown payment"}"#),
            }
        }
        _ => send_response(&mut stream, 405, r#"{"message": "method not allowed"}"#),
    }
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        422 => "Unprocessable Entity",
        503 => "Service Unavailable",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_nanos();
    std::env::temp_dir().join(format!("{}_{}_{}", prefix, std::process::id(), ts))
}

/// Serves exactly one HTTP response and then closes the connection.
pub struct OneShotServer {
    pub url: String,
    handle: JoinHandle<()>,
}

impl OneShotServer {
    pub fn start(raw_response: Vec<u8>) -> Self {
        Self::start_chunks(vec![(raw_response, Duration::ZERO)])
    }

    /// Writes each chunk after sleeping for its delay.
    pub fn start_chunks(chunks: Vec<(Vec<u8>, Duration)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local test server");
        let addr = listener.local_addr().expect("local test server address");

        let handle = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            for (chunk, delay) in chunks {
                thread::sleep(delay);
                if stream.write_all(&chunk).and_then(|_| stream.flush()).is_err() {
                    return;
                }
            }
        });

        Self {
            url: format!("http://{}/asset", addr),
            handle,
        }
    }

    pub fn ok(content_type: &str, body: &[u8]) -> Self {
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            content_type,
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        Self::start(response)
    }

    pub fn status(code: u16, reason: &str) -> Self {
        Self::start(
            format!("HTTP/1.1 {code} {reason}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .into_bytes(),
        )
    }

    /// Announces `declared_len` bytes but hangs up after `body`.
    pub fn truncated(body: &[u8], declared_len: usize) -> Self {
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            declared_len
        )
        .into_bytes();
        response.extend_from_slice(body);
        Self::start(response)
    }

    /// Sends half of `body`, stalls for `pause`, then sends the rest.
    pub fn stalled(body: &[u8], pause: Duration) -> Self {
        let mut head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        let (first, rest) = body.split_at(body.len() / 2);
        head.extend_from_slice(first);
        Self::start_chunks(vec![(head, Duration::ZERO), (rest.to_vec(), pause)])
    }

    pub fn join(self) {
        let _ = self.handle.join();
    }
}

/// An address nothing listens on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway listener address");
    drop(listener);
    format!("http://{}/latest", addr)
}

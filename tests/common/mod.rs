//! Shared mock upstreams and server bootstrap for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use paper_relay::config::RelayConfig;
use paper_relay::http::RelayServer;
use paper_relay::lifecycle::Shutdown;

/// A canned HTTP/1.1 response served by a mock upstream.
#[derive(Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl UpstreamReply {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[allow(dead_code)]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[allow(dead_code)]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Start a programmable mock upstream on an ephemeral port.
/// The handler is invoked once per accepted connection.
#[allow(dead_code)]
pub async fn start_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = UpstreamReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // Drain the request head before replying.
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let reply = f().await;
                        let mut head =
                            format!("HTTP/1.1 {} {}\r\n", reply.status, reason(reply.status));
                        head.push_str(&format!("Content-Length: {}\r\n", reply.body.len()));
                        for (name, value) in &reply.headers {
                            head.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        head.push_str("Connection: close\r\n\r\n");

                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&reply.body).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start an upstream that accepts connections but never responds.
#[allow(dead_code)]
pub async fn start_black_hole() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Hold the connection open without ever writing.
                        let mut buf = [0u8; 4096];
                        while let Ok(n) = socket.read(&mut buf).await {
                            if n == 0 {
                                break;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start an upstream that sends the response head and `first`, then waits
/// for `release` before sending `rest`. Serves a single connection.
#[allow(dead_code)]
pub async fn start_two_phase_upstream(
    first: Vec<u8>,
    rest: Vec<u8>,
    release: oneshot::Receiver<()>,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                first.len() + rest.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&first).await;
            let _ = socket.flush().await;

            let _ = release.await;

            let _ = socket.write_all(&rest).await;
            let _ = socket.shutdown().await;
        }
    });

    addr
}

/// Boot a relay server on an ephemeral port.
/// Returns its base URL and the shutdown handle.
pub async fn start_relay(mut config: RelayConfig) -> (String, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = RelayServer::new(config).unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (format!("http://{}", addr), shutdown)
}

/// A reqwest client suitable for the test environment.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

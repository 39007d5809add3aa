//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use legacy_gate::config::GateConfig;
use legacy_gate::http::HttpServer;
use legacy_gate::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Start a simple mock upstream that returns a fixed response.
pub async fn start_mock_upstream(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A gate running in the background.
pub struct TestGate {
    pub addr: SocketAddr,
    pub updates: mpsc::UnboundedSender<GateConfig>,
    pub shutdown: Shutdown,
}

/// Start the gate on an ephemeral port.
pub async fn start_gate(config: GateConfig) -> TestGate {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    TestGate {
        addr,
        updates,
        shutdown,
    }
}

/// Client used against the gate; proxies from the environment are ignored.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Send an HTTP/1.0 GET with the given `Host` header.
pub async fn get_http10(addr: SocketAddr, host: &str, path: &str) -> reqwest::Response {
    client()
        .get(format!("http://{addr}{path}"))
        .version(reqwest::Version::HTTP_10)
        .header(reqwest::header::HOST, host)
        .send()
        .await
        .expect("gate unreachable")
}

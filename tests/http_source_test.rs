use std::net::SocketAddr;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::timeout;

use data_waster::config::EndpointConfig;
use data_waster::source::{ByteSource, HttpByteSource};

/// Answer one request with headers and a few body bytes, then go silent
/// while keeping the connection open.
async fn start_stalling_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;

        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\n0123456789")
            .await
            .unwrap();
        socket.flush().await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });

    addr
}

fn endpoints(addr: SocketAddr) -> EndpointConfig {
    EndpointConfig {
        download_url: format!("http://{}/__down", addr),
        download_bytes: 100_000,
        ping_url: format!("http://{}/__down?bytes=1", addr),
        ip_lookup_url: format!("http://{}/json", addr),
        connect_timeout_secs: 2,
        read_timeout_secs: 1,
    }
}

#[tokio::test]
async fn test_stalled_body_becomes_transient_error() {
    let addr = start_stalling_server().await;
    let source = HttpByteSource::new(&endpoints(addr)).unwrap();

    let mut stream = source.open(1).await.unwrap();

    let outcome = timeout(Duration::from_secs(10), async {
        let mut received = 0usize;
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => received += bytes.len(),
                Err(e) => return (received, Some(e)),
            }
        }
        (received, None)
    })
    .await
    .expect("stalled read should time out");

    let (received, error) = outcome;
    assert!(received <= 10);
    let error = error.expect("stall should end in an error");
    assert!(error.is_transient());
}

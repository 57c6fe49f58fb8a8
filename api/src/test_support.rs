//! One-shot HTTP stub for exercising the client against canned responses.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Bind an ephemeral port, serve exactly one request with `response`, and
/// return the base URL to aim the client at.
///
/// Reads until the request headers (plus the small JSON body the login flow
/// sends) have fully arrived, so the response is never written mid-request.
pub(crate) async fn stub_server(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener addr");

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut chunk = [0u8; 4096];
            let mut request = Vec::new();
            loop {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        request.extend_from_slice(&chunk[..n]);
                        let headers_done = request.windows(4).any(|w| w == b"\r\n\r\n");
                        let bodyless =
                            request.starts_with(b"GET") || request.starts_with(b"DELETE");
                        if headers_done && (bodyless || request.ends_with(b"}")) {
                            break;
                        }
                    }
                }
            }
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}")
}

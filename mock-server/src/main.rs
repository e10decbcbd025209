use tokio::net::TcpListener;

/// Serves the echo/status/fixture endpoints used by the httputil tests.
/// `PORT` picks the port, 3000 by default.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    println!("mock server listening on {}", listener.local_addr()?);
    mock_server::run(listener).await
}

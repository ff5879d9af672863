use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let key = std::env::var("LIGHT_GATEWAY_KEY").ok().filter(|k| !k.is_empty());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, key_required = key.is_some(), "mock bridge listening");

    let bridge = mock_bridge::Bridge::new(mock_bridge::default_lights(), key);
    mock_bridge::serve(listener, mock_bridge::router(bridge)).await
}

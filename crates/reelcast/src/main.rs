//! Reelcast server binary.
//!
//! Listens on `PORT` (default 3000) and relays room state, chat, and
//! fish-catch events between fishing clients.

use reelcast::RelayServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(3000);

    let server = RelayServerBuilder::new()
        .bind(&format!("0.0.0.0:{port}"))
        .build()
        .await?;

    tracing::info!(port, "fishing relay listening");
    server.run().await?;
    Ok(())
}

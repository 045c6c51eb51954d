//! Example to run the GAMBIT server standalone
//!
//! Run with: cargo run -p gambit-server --example run_server

use gambit_server::{run_server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig {
        ai_move_delay_ms: 250,
        ..ServerConfig::default()
    };

    println!("Starting GAMBIT server on port {}", config.port);
    println!("Static files from: {}", config.static_dir);
    println!("Create a game: curl -X POST -H 'content-type: application/json' -d '{{\"mode\":\"ai\"}}' http://localhost:{}/api/games", config.port);

    run_server(config).await
}

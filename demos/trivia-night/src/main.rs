//! A runnable quiz server.
//!
//! Hosts connect with `host:create`, read the code to the room, players
//! join with it. Point the host and player web apps at this address.
//!
//! ```text
//! QUIZCAST_ADDR=0.0.0.0:3001 RUST_LOG=quizcast=debug cargo run -p trivia-night
//! ```

use quizcast::QuizcastServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("QUIZCAST_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3001".to_string());

    let server = QuizcastServer::builder().bind(&addr).build().await?;
    tracing::info!(addr = %server.local_addr()?, "trivia night is on");

    server.run().await?;
    Ok(())
}

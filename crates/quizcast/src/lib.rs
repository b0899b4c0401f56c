//! # Quizcast
//!
//! Real-time multiplayer quiz session coordinator.
//!
//! One server process owns every active quiz in memory: each quiz is an
//! isolated room driven through a fixed phase sequence, with synchronized
//! broadcasts to the host and all players, and session-token reconnection
//! that survives transient network drops.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizcast::QuizcastServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), quizcast::QuizcastError> {
//!     let server = QuizcastServer::builder()
//!         .bind("0.0.0.0:3001")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```
//!
//! ## Layering
//!
//! ```text
//! quizcast            ← router + server loop (this crate)
//!   quizcast-room     ← per-quiz state machine actors
//!   quizcast-session  ← token + connection indices
//!   quizcast-timer    ← countdown primitive
//!   quizcast-protocol ← wire messages
//!   quizcast-transport← WebSocket framing
//! ```

mod error;
mod handler;
mod router;
mod server;

pub use error::QuizcastError;
pub use router::Router;
pub use server::{QuizcastServer, QuizcastServerBuilder};

//! Per-connection handler: frame loop and outbound pump.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Spawn the outbound pump: an unbounded channel whose sending half
//!      is what rooms and the router hold for this connection.
//!   2. Loop: receive frames → decode → dispatch through the router.
//!   3. On close (clean or not), run the router's close path exactly once
//!      so grace periods and pausing kick in.
//!
//! A frame that fails to decode gets an `error` reply and the connection
//! lives on — malformed input is the sender's problem, not grounds for a
//! disconnect.

use std::sync::Arc;

use quizcast_protocol::{ClientMessage, Codec, JsonCodec, ServerMessage};
use quizcast_transport::{Connection, WebSocketConnection};

use crate::server::ServerState;
use crate::QuizcastError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), QuizcastError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let conn = Arc::new(conn);

    // The outbound pump. Everything addressed to this connection — router
    // replies, room broadcasts — lands on `out_tx` and is serialized here.
    // The pump ends by itself once every sender is gone: the rooms drop
    // theirs on disconnect, the router path below drops the last one.
    let (out_tx, mut out_rx) =
        tokio::sync::mpsc::unbounded_channel::<ServerMessage>();
    {
        let conn = Arc::clone(&conn);
        let codec = state.codec;
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if let Err(e) = forward(&conn, &codec, &msg).await {
                    // Socket gone; the close path below does the cleanup.
                    tracing::debug!(error = %e, "outbound pump stopped");
                    break;
                }
            }
        });
    }

    // The frame loop.
    let result = loop {
        match conn.recv().await {
            Ok(Some(frame)) => {
                match state.codec.decode::<ClientMessage>(&frame) {
                    Ok(msg) => {
                        state
                            .router
                            .lock()
                            .await
                            .dispatch(conn_id, msg, &out_tx)
                            .await;
                    }
                    Err(e) => {
                        tracing::debug!(
                            %conn_id,
                            error = %e,
                            "undecodable frame"
                        );
                        let _ = out_tx.send(ServerMessage::Error {
                            message: "invalid or unknown message".into(),
                        });
                    }
                }
            }
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break Ok(());
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break Err(QuizcastError::Transport(e));
            }
        }
    };

    // Disconnect ≠ removal: players get their grace period, a host pauses
    // the quiz. Index entries for this connection go away immediately.
    state.router.lock().await.on_close(conn_id).await;

    result
}

/// Encodes one message and writes it to the socket.
async fn forward(
    conn: &WebSocketConnection,
    codec: &JsonCodec,
    msg: &ServerMessage,
) -> Result<(), QuizcastError> {
    let frame = codec.encode(msg)?;
    conn.send(&frame).await?;
    Ok(())
}

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use docent_core::{ChatHistory, ChatTurn};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;

use super::server::AppState;

pub(crate) async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_turns(socket, state.history))
}

/// Send the existing history, then every newly published turn, as JSON text frames.
///
/// A client that falls behind the broadcast buffer is caught up from the history itself.
async fn stream_turns(mut socket: WebSocket, history: Arc<ChatHistory>) {
    let (backlog, mut rx) = history.subscribe_with_snapshot();
    let mut delivered = 0;
    if send_all(&mut socket, &backlog, &mut delivered).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(turn) => {
                    if send_turn(&mut socket, &turn).await.is_err() {
                        break;
                    }
                    delivered += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "websocket subscriber lagged, resending from history");
                    let (missed, fresh) = resync(&history, delivered);
                    rx = fresh;
                    if send_all(&mut socket, &missed, &mut delivered).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("websocket client disconnected");
}

/// Turns published after the first `delivered`, plus a receiver for everything after them.
fn resync(history: &ChatHistory, delivered: usize) -> (Vec<ChatTurn>, Receiver<ChatTurn>) {
    let (mut turns, rx) = history.subscribe_with_snapshot();
    let missed = turns.split_off(delivered.min(turns.len()));
    (missed, rx)
}

async fn send_all(
    socket: &mut WebSocket,
    turns: &[ChatTurn],
    delivered: &mut usize,
) -> Result<(), axum::Error> {
    for turn in turns {
        send_turn(socket, turn).await?;
        *delivered += 1;
    }
    Ok(())
}

async fn send_turn(socket: &mut WebSocket, turn: &ChatTurn) -> Result<(), axum::Error> {
    let json = serde_json::to_string(turn).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

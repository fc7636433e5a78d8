use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use chrono::{DateTime, Utc};
use docent_core::{ChatTurn, Readiness};

use super::error::GatewayError;
use super::render::render_answer;
use super::server::AppState;

const CHAT_PAGE: &str = include_str!("../assets/index.html");
pub(crate) const ACCEPTED: &str = "Message received and broadcasted.";

#[derive(serde::Deserialize)]
pub(crate) struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    ready: bool,
    readiness: Readiness,
    uptime_secs: u64,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct FileEntry {
    pub name: String,
    pub extension: String,
    pub created: Option<DateTime<Utc>>,
}

pub(crate) async fn index_handler() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

pub(crate) async fn get_chat(State(state): State<AppState>) -> Json<Vec<ChatTurn>> {
    Json(state.history.snapshot())
}

/// Publish the question, acknowledge, and answer in the background.
pub(crate) async fn post_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), GatewayError> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge
        } else {
            GatewayError::BadRequest(rejection.body_text())
        }
    })?;
    let question = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| GatewayError::BadRequest("message must not be empty".into()))?
        .to_owned();

    if state.answerer.readiness() != Readiness::Ready {
        return Err(GatewayError::NotReady);
    }

    state.history.publish(ChatTurn::user(question.clone()));

    let answerer = Arc::clone(&state.answerer);
    let history = Arc::clone(&state.history);
    tokio::spawn(async move {
        let turn = match answerer.ask(&question).await {
            Ok(answer) => ChatTurn::assistant(render_answer(&answer)),
            Err(e) => {
                tracing::warn!("question failed: {e}");
                ChatTurn::failure(e.to_string())
            }
        };
        history.publish(turn);
    });

    Ok((StatusCode::OK, ACCEPTED))
}

pub(crate) async fn files_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<FileEntry>>, GatewayError> {
    list_files(&state.corpus_root)
        .await
        .map(Json)
        .map_err(GatewayError::Listing)
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let readiness = state.answerer.readiness();
    Json(HealthResponse {
        status: "ok",
        ready: readiness == Readiness::Ready,
        readiness,
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Top-level entries of `root`, sorted by name. Creation time is absent where the platform
/// does not record it.
async fn list_files(root: &Path) -> std::io::Result<Vec<FileEntry>> {
    let mut dir = tokio::fs::read_dir(root).await?;
    let mut entries = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        let created = entry
            .metadata()
            .await
            .and_then(|m| m.created())
            .ok()
            .map(DateTime::<Utc>::from);
        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            extension: path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
            created,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_deserializes() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hello"}"#).unwrap();
        assert_eq!(req.message.as_deref(), Some("hello"));
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_none());
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok",
            ready: true,
            readiness: Readiness::Ready,
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"readiness\":\"ready\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[tokio::test]
    async fn list_files_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(dir.path()).await.unwrap().is_empty());
    }
}

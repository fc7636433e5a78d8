use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use docent_core::{ChatHistory, QuestionAnswerer};
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::router::build_router;

#[derive(Clone)]
pub(crate) struct AppState {
    pub answerer: Arc<dyn QuestionAnswerer>,
    pub history: Arc<ChatHistory>,
    pub corpus_root: PathBuf,
    pub started_at: Instant,
}

pub struct GatewayServer {
    addr: SocketAddr,
    max_body_size: usize,
    answerer: Arc<dyn QuestionAnswerer>,
    history: Arc<ChatHistory>,
    corpus_root: PathBuf,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        answerer: Arc<dyn QuestionAnswerer>,
        history: Arc<ChatHistory>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("gateway binding to 0.0.0.0, the chat is reachable from other hosts");
        }

        Self {
            addr,
            max_body_size: 1_048_576,
            answerer,
            history,
            corpus_root: PathBuf::from("data"),
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Directory listed by `GET /files`.
    #[must_use]
    pub fn with_corpus_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.corpus_root = root.into();
        self
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Router with all routes and layers, without binding a socket.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = AppState {
            answerer: Arc::clone(&self.answerer),
            history: Arc::clone(&self.history),
            corpus_root: self.corpus_root.clone(),
            started_at: Instant::now(),
        };
        build_router(state, self.max_body_size)
    }

    /// Start the HTTP gateway server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("gateway listening on http://{}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}

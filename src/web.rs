use crate::app::{CheckError, TitleChecker};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::signal;

#[derive(Clone)]
struct SharedState {
    checker: Arc<TitleChecker>,
}

pub fn router(checker: Arc<TitleChecker>) -> Router {
    let shared_state = Arc::new(SharedState { checker });

    Router::new()
        .route("/api/title/check", get(check))
        .route("/api/health", get(health))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down");
}

async fn start_app(checker: Arc<TitleChecker>, listen: &str) -> anyhow::Result<()> {
    let app = router(checker);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("listening on {listen}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn start_daemon(checker: TitleChecker, listen: &str) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { start_app(Arc::new(checker), listen).await })
}

#[derive(Debug)]
enum HttpError {
    MissingTitle,
    Check(CheckError),
    Join(tokio::task::JoinError),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HttpError::MissingTitle => (
                axum::http::StatusCode::BAD_REQUEST,
                Json(json!({"error": "Title is required"})),
            ),
            HttpError::Check(CheckError::EmptyTitle) => (
                axum::http::StatusCode::BAD_REQUEST,
                Json(json!({"error": "Title is required"})),
            ),
            HttpError::Check(_) | HttpError::Join(_) => {
                log::error!("error processing title: {self:?}");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "An error occurred while processing the title"})),
                )
            }
        }
        .into_response()
    }
}

impl From<CheckError> for HttpError {
    fn from(err: CheckError) -> Self {
        Self::Check(err)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckRequest {
    pub title: Option<String>,
}

async fn check(
    State(state): State<Arc<SharedState>>,
    Query(params): Query<CheckRequest>,
) -> Result<Json<Value>, HttpError> {
    let title = params
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(HttpError::MissingTitle)?;

    log::debug!("check request: {title:?}");

    let checker = state.checker.clone();
    let analysis = tokio::task::spawn_blocking(move || checker.check(&title))
        .await
        .map_err(HttpError::Join)??;

    Ok(Json(json!({ "feedback": analysis })))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

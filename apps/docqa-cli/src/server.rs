//! `POST /query` and `GET /health` over a shared [`QaService`].

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use docqa_rag::{QaService, QueryError, Readiness};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: Readiness,
    pub rag_bot_initialized: bool,
    pub chunks: usize,
}

pub fn router(service: Arc<QaService>) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn health(State(service): State<Arc<QaService>>) -> Json<HealthResponse> {
    let status = service.readiness();
    Json(HealthResponse { status, rag_bot_initialized: status.is_serving(), chunks: service.chunk_count() })
}

async fn query(State(service): State<Arc<QaService>>, Json(req): Json<QueryRequest>) -> Response {
    let worker = Arc::clone(&service);
    let result = tokio::task::spawn_blocking(move || worker.query(&req.question)).await;
    match result {
        Ok(Ok(answer)) => Json(QueryResponse { answer: answer.trim().to_string() }).into_response(),
        Ok(Err(e)) => query_error_response(&e),
        Err(e) => {
            error!(error = %e, "query task failed");
            detail(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_DETAIL)
        }
    }
}

/// Body detail for any failure inside the pipeline. The cause is only logged.
pub const PROCESSING_DETAIL: &str = "Internal error during question processing.";

fn query_error_response(e: &QueryError) -> Response {
    match e {
        QueryError::NotReady => detail(StatusCode::SERVICE_UNAVAILABLE, &e.to_string()),
        QueryError::EmptyQuestion => detail(StatusCode::BAD_REQUEST, &e.to_string()),
        QueryError::Processing(_) => detail(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_DETAIL),
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "detail": message }))).into_response()
}

/// Bind, ingest in the background, and serve until Ctrl-C.
pub async fn serve(service: Arc<QaService>, addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    spawn_ingestion(Arc::clone(&service), None);

    let app = router(Arc::clone(&service));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(service))
        .await?;
    Ok(())
}

/// Ingest `folder` (or `data.pdf_folder`) on the blocking pool, then mark the
/// service ready. A panic during ingestion is logged and leaves the service
/// `INITIALIZING`. The returned handle resolves once ingestion has ended.
pub fn spawn_ingestion(service: Arc<QaService>, folder: Option<PathBuf>) -> JoinHandle<()> {
    let ingestion = tokio::task::spawn_blocking(move || {
        service.ingest_folder(folder.as_deref(), &ProgressBar::hidden());
        service.mark_ready();
    });
    tokio::spawn(async move {
        if let Err(e) = ingestion.await {
            error!(error = %e, "background ingestion failed; service stays INITIALIZING");
        }
    })
}

async fn shutdown_signal(service: Arc<QaService>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    service.shutdown();
}

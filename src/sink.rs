//! Local sink server: accepts multipart/mixed POSTs on any path and
//! answers with the number of parts it received. A convenient target for
//! `stream` runs and for the integration tests.

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use tracing::info;

use crate::error::Result;
use crate::multipart;

/// Router accepting POSTs on any path and counting the parts received.
pub fn router() -> Router {
    Router::new()
        .route("/", post(upload))
        .route("/{*path}", post(upload))
        .layer(DefaultBodyLimit::disable())
}

async fn upload(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match multipart::count_parts(content_type, &body) {
        Some(parts) => {
            info!(parts, bytes = body.len(), "accepted upload");
            (StatusCode::OK, format!("accepted {parts} parts"))
        }
        None => (
            StatusCode::BAD_REQUEST,
            format!("expected {} body", multipart::MULTIPART_MIXED),
        ),
    }
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "sink listening");
    axum::serve(listener, router()).await?;
    Ok(())
}

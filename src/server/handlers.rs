//! HTTP request handlers
//!
//! Axum handlers for metric ingestion and the live feed.

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{self, StreamExt};

use crate::feed::{event_stream_block, Envelope};
use crate::server::{AppState, HealthResponse, IngestRequest, Result};
use crate::store::Category;

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        runs_count: state.store.run_count(),
        records_count: state.store.record_count(),
    })
}

/// Accept one metric record from a producer.
///
/// Responds `{"success": <bool>}`: false for a category outside
/// batch/epoch/train or a write refused by a capacity limit, true
/// otherwise. Never an error status; the producer callback fires inside
/// a training loop and a failed write must stay a soft signal.
pub async fn ingest(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(request): Json<IngestRequest>,
) -> Json<Envelope> {
    let Ok(category) = category.parse::<Category>() else {
        tracing::warn!(%category, "write rejected: unknown category");
        return Json(Envelope::ack(false));
    };

    let run_id = request.id.unwrap_or_default();
    let record = request.metrics.unwrap_or(serde_json::Value::Null);

    match state.store.save(category, &run_id, record) {
        Ok(()) => {
            tracing::debug!(%category, %run_id, "record stored");
            Json(Envelope::ack(true))
        }
        Err(e) => {
            tracing::warn!(%category, %run_id, error = %e, "write refused");
            Json(Envelope::ack(false))
        }
    }
}

/// Open a live feed subscription for one run log.
///
/// Sends the full current history as a single event block, then holds
/// the connection open without further events; observers reconnect for
/// fresher data. Dropping the connection releases the stream and nothing
/// else. An unknown category fails closed with 404.
pub async fn subscribe(
    State(state): State<AppState>,
    Path((category, run_id)): Path<(String, String)>,
) -> Result<Response> {
    let category: Category = category.parse()?;

    let records = state.store.load(category, &run_id);
    tracing::debug!(%category, %run_id, records = records.len(), "feed subscription opened");
    let block = event_stream_block(&Envelope::snapshot(records))?;

    // One snapshot event, then idle until the observer disconnects.
    let body = stream::once(async move { Ok::<_, Infallible>(Bytes::from(block)) })
        .chain(stream::pending());

    let headers = [
        (header::CONNECTION, "keep-alive"),
        (header::CONTENT_TYPE, "text/event-stream"),
        (header::CACHE_CONTROL, "no-cache"),
    ];
    Ok((headers, Body::from_stream(body)).into_response())
}

// =============================================================================
// Tests
// =============================================================================

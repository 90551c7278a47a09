//! Read-only HTTP admin surface.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use sketchnet_core::{Shape, ShapeId, encode_shape};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::RelayState;

/// Snapshot of the canonical sketch.
#[derive(Debug, Serialize)]
pub struct SketchView {
    pub peers: usize,
    pub next_id: ShapeId,
    pub shapes: Vec<ShapeView>,
}

#[derive(Debug, Serialize)]
pub struct ShapeView {
    pub id: ShapeId,
    /// The shape as a protocol line.
    pub line: String,
    pub shape: Shape,
}

pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/sketch", get(sketch))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Index page
async fn index() -> &'static str {
    "Sketchnet Relay Server - connect over TCP and speak the line protocol"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

async fn sketch(State(state): State<Arc<RelayState>>) -> Response {
    // Both reads take the store lock separately; fine for a diagnostic view
    let (snapshot, next_id) = match (state.snapshot(), state.next_id()) {
        (Ok(snapshot), Ok(next_id)) => (snapshot, next_id),
        (Err(e), _) | (_, Err(e)) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };
    let shapes = snapshot
        .into_iter()
        .map(|(id, shape)| ShapeView {
            id,
            line: encode_shape(&shape, Some(id)),
            shape,
        })
        .collect();
    Json(SketchView {
        peers: state.peer_count(),
        next_id,
        shapes,
    })
    .into_response()
}

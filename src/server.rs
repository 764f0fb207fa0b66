//! JSON HTTP API.
//!
//! Serves the catalog lookups to the browser front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Health check (version, last catalog load) |
//! | `GET` | `/api/photos/all` | The whole catalog |
//! | `GET` | `/api/photos/search?query=` | People whose key matches `query` |
//! | `GET` | `/api/photos/person/{person}` | Events a person appears in |
//! | `GET` | `/api/photos/event/{event}/person/{person}` | A person's photos in one event |
//! | `GET` | `/api/photos/stats` | Catalog size summary |
//! | `GET` | `/api/photos/resolve?ref=` | Direct image URLs for a Drive link |
//!
//! Successful responses are wrapped as
//!
//! ```json
//! { "status": "success", "data": ... }
//! ```
//!
//! with a few endpoint-specific siblings of `data` (`count`, `eventCount`, ...).
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "transport", "message": "Request timeout - please try again" } }
//! ```
//!
//! Error codes: `bad_request` (400), `transport` (502). A lookup that
//! matches nothing is a success with empty data, never a 404.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the front end can be
//! hosted separately.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::QueryError;
use crate::facade::{QueryFacade, SearchOutcome};
use crate::models::EventPhotos;
use crate::resolver::ResolvedPhoto;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    facade: QueryFacade,
}

/// Starts the HTTP server on `[server].bind` and runs until the process ends.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let facade = QueryFacade::from_config(config)?;
    serve(facade, &config.server.bind).await
}

/// Serve an already-built façade. Used by [`run_server`] and by embedders
/// that bring their own [`CatalogSource`](crate::source::CatalogSource).
pub async fn serve(facade: QueryFacade, bind_addr: &str) -> anyhow::Result<()> {
    let app = router(facade);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    println!("PixelTrace API listening on http://{}", listener.local_addr()?);
    tracing::info!(bind = %bind_addr, "server started");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router without binding a socket.
pub fn router(facade: QueryFacade) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/photos/all", get(handle_all))
        .route("/api/photos/search", get(handle_search))
        .route("/api/photos/person/{person}", get(handle_person_events))
        .route(
            "/api/photos/event/{event}/person/{person}",
            get(handle_event_photos),
        )
        .route("/api/photos/stats", get(handle_stats))
        .route("/api/photos/resolve", get(handle_resolve))
        .layer(cors)
        .with_state(AppState { facade })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Transport { message } => AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "transport".to_string(),
                message,
            },
        }
    }
}

fn success(data: impl Serialize) -> Json<Value> {
    Json(json!({ "status": "success", "data": data }))
}

// ============ GET /health ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    version: String,
    last_loaded: Option<String>,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        last_loaded: state
            .facade
            .last_loaded()
            .await
            .map(|ts| ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
    })
}

// ============ GET /api/photos/all ============

async fn handle_all(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let catalog = state.facade.catalog().await?;
    Ok(success(catalog.as_ref()))
}

// ============ GET /api/photos/search ============

#[derive(Deserialize)]
struct SearchParams {
    query: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, AppError> {
    let query = params
        .query
        .ok_or_else(|| bad_request("missing query parameter: query"))?;

    let outcome = state.facade.search(&query).await?;
    let searching = outcome.is_searching();
    let people = match outcome {
        SearchOutcome::Found(people) => people,
        SearchOutcome::NotSearching => Vec::new(),
    };
    tracing::debug!(%query, matches = people.len(), "search");

    Ok(Json(json!({
        "status": "success",
        "count": people.len(),
        "searching": searching,
        "data": people,
    })))
}

// ============ GET /api/photos/person/{person} ============

async fn handle_person_events(
    State(state): State<AppState>,
    Path(person): Path<String>,
) -> Result<Json<Value>, AppError> {
    let events = state.facade.events_for_person(&person).await?;
    Ok(Json(json!({
        "status": "success",
        "personName": person,
        "eventCount": events.len(),
        "data": events,
    })))
}

// ============ GET /api/photos/event/{event}/person/{person} ============

async fn handle_event_photos(
    State(state): State<AppState>,
    Path((event, person)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let found = state.facade.event_photos(&event, &person).await?;
    let data = found.unwrap_or(EventPhotos {
        event_name: event,
        person_name: person,
        photo_count: 0,
        photos: Vec::new(),
    });
    Ok(success(data))
}

// ============ GET /api/photos/stats ============

async fn handle_stats(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(success(state.facade.stats().await?))
}

// ============ GET /api/photos/resolve ============

#[derive(Deserialize)]
struct ResolveParams {
    #[serde(rename = "ref")]
    photo_ref: Option<String>,
}

async fn handle_resolve(Query(params): Query<ResolveParams>) -> Result<Json<Value>, AppError> {
    let photo = params
        .photo_ref
        .ok_or_else(|| bad_request("missing query parameter: ref"))?;
    Ok(success(ResolvedPhoto::new(&photo)))
}

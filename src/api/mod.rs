// Events API - JSON over HTTP in front of the event repository

use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    http::{header, HeaderName, Method},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::any::Any as PanicPayload;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    infrastructure::Served,
    models::{EventList, EventUpdate, LikeRequest, NewComment, NewEvent},
};

/// Response header naming the store that served the request.
pub const DATA_SOURCE_HEADER: &str = "x-data-source";

fn served<T: Serialize>(served: Served<T>) -> Response {
    (
        [(DATA_SOURCE_HEADER, served.source.as_str())],
        Json(served.value),
    )
        .into_response()
}

fn found<T: Serialize>(
    result: Served<Option<T>>,
    missing: impl FnOnce() -> String,
) -> AppResult<Response> {
    let Served { value, source } = result;
    match value {
        Some(value) => Ok(served(Served { value, source })),
        None => Err(AppError::NotFound(missing())),
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

// HTTP Handlers

pub async fn root_handler() -> Json<Value> {
    Json(json!([]))
}

pub async fn version_handler() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = if state.repository.relational_available().await {
        "available"
    } else {
        "unavailable"
    };
    Json(json!({ "status": "ok", "database": database }))
}

pub async fn list_events_handler(State(state): State<AppState>) -> Response {
    let result = state.repository.list_events().await;
    served(Served {
        value: EventList {
            events: result.value,
        },
        source: result.source,
    })
}

pub async fn get_event_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> AppResult<Response> {
    found(state.repository.get_event(id).await, || {
        format!("Event {} not found", id)
    })
}

pub async fn get_comments_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Response {
    served(state.repository.get_comments(id).await)
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> AppResult<Response> {
    let event = body(payload)?;
    Ok(served(state.repository.add_event(&event).await))
}

pub async fn update_event_handler(
    State(state): State<AppState>,
    payload: Result<Json<EventUpdate>, JsonRejection>,
) -> AppResult<Response> {
    let update = body(payload)?;
    Ok(served(state.repository.update_event(&update).await))
}

pub async fn delete_event_handler(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> Response {
    served(state.repository.delete_event(id).await)
}

pub async fn create_comment_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> AppResult<Response> {
    let comment = body(payload)?;
    let event_id = comment.event_id;
    found(
        state
            .repository
            .add_comment(event_id, &comment.comment)
            .await,
        || format!("Event {} not found", event_id),
    )
}

pub async fn delete_comment_handler(
    State(state): State<AppState>,
    AxumPath((event_id, id)): AxumPath<(i64, i64)>,
) -> Response {
    served(state.repository.delete_comment(event_id, id).await)
}

pub async fn add_like_handler(
    State(state): State<AppState>,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> AppResult<Response> {
    let LikeRequest { id } = body(payload)?;
    found(state.repository.add_like(id).await, || {
        format!("Event {} not found", id)
    })
}

pub async fn remove_like_handler(
    State(state): State<AppState>,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> AppResult<Response> {
    let LikeRequest { id } = body(payload)?;
    found(state.repository.remove_like(id).await, || {
        format!("Event {} not found", id)
    })
}

/// A panicking handler answers 500 with the usual `{ "message" }` body.
fn handle_panic(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unexpected failure");
    AppError::Internal(detail.to_string()).into_response()
}

/// Any origin, with the methods and headers browsers need for the JSON endpoints.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::PUT,
            Method::POST,
            Method::PATCH,
            Method::GET,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Probes
        .route("/", get(root_handler))
        .route("/version", get(version_handler))
        .route("/health", get(health_handler))

        // Events
        .route("/events", get(list_events_handler))
        .route("/event", post(create_event_handler).put(update_event_handler))
        .route("/event/{id}", get(get_event_handler).delete(delete_event_handler))
        .route("/event/{id}/comments", get(get_comments_handler))

        // Comments
        .route("/comment", post(create_comment_handler))
        .route("/comment/{event_id}/{id}", delete(delete_comment_handler))

        // Likes
        .route("/like/event", put(add_like_handler).delete(remove_like_handler))

        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer())
        .with_state(state)
}

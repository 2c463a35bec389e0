// Events website - server-rendered pages backed by the events API

pub mod client;
pub mod templates;

use axum::{
    extract::{rejection::FormRejection, Path as AxumPath, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde_json::json;
use thiserror::Error;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info};

use crate::config::WebsiteConfig;
use crate::models::{EventList, EventUpdate, LikeRequest, NewComment, NewEvent};

pub use client::EventsApiClient;
pub use templates::SiteTemplates;

pub const CACHE_CONTROL_VALUE: &str = "no-store, no-cache, must-revalidate, private";

#[derive(Debug, Error)]
pub enum WebsiteError {
    /// The API could not be reached or its body could not be read.
    #[error("Events API request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Events API returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid form submission: {0}")]
    Form(String),

    #[error("Template rendering error: {0}")]
    Template(String),
}

pub type WebsiteResult<T> = Result<T, WebsiteError>;

#[derive(Clone)]
pub struct WebsiteState {
    pub client: EventsApiClient,
    pub templates: SiteTemplates,
}

impl WebsiteState {
    pub fn new(config: &WebsiteConfig) -> WebsiteResult<Self> {
        Ok(Self {
            client: EventsApiClient::new(config.api_url.clone()),
            templates: SiteTemplates::new()?,
        })
    }
}

/// Upstream failures become the error page, still answered with 200.
fn error_page(state: &WebsiteState, err: WebsiteError) -> Response {
    error!(error = %err, "website request failed");
    match state.templates.render_error(&err.to_string()) {
        Ok(html) => Html(html).into_response(),
        Err(render_err) => {
            error!(error = %render_err, "error page could not be rendered");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
            )
                .into_response()
        }
    }
}

fn respond(state: &WebsiteState, result: WebsiteResult<Response>) -> Response {
    result.unwrap_or_else(|err| error_page(state, err))
}

fn form<T>(payload: Result<Form<T>, FormRejection>) -> WebsiteResult<T> {
    payload
        .map(|Form(value)| value)
        .map_err(|rejection| WebsiteError::Form(rejection.body_text()))
}

// Page handlers

pub async fn home_handler(State(state): State<WebsiteState>) -> Response {
    let result: WebsiteResult<Response> = async {
        let events = state.client.list_events().await?;
        let html = state
            .templates
            .render_page(templates::HOME, "Events", &EventList { events })?;
        Ok(Html(html).into_response())
    }
    .await;
    respond(&state, result)
}

pub async fn event_handler(
    State(state): State<WebsiteState>,
    AxumPath(id): AxumPath<i64>,
) -> Response {
    let result: WebsiteResult<Response> = async {
        let event = state.client.get_event(id).await?;
        let html = state
            .templates
            .render_page(templates::EVENT, &event.title, &event)?;
        Ok(Html(html).into_response())
    }
    .await;
    respond(&state, result)
}

pub async fn about_handler(State(state): State<WebsiteState>) -> Response {
    let result = state
        .templates
        .render_page(
            templates::ABOUT,
            "About",
            &json!({ "version": env!("CARGO_PKG_VERSION") }),
        )
        .map(|html| Html(html).into_response());
    respond(&state, result)
}

// Form handlers: forward to the API, then redirect

pub async fn create_event_handler(
    State(state): State<WebsiteState>,
    payload: Result<Form<NewEvent>, FormRejection>,
) -> Response {
    let result: WebsiteResult<Response> = async {
        let event = form(payload)?;
        let id = state.client.create_event(&event).await?;
        info!(event_id = id, "event created");
        Ok(Redirect::to("/").into_response())
    }
    .await;
    respond(&state, result)
}

pub async fn update_event_handler(
    State(state): State<WebsiteState>,
    payload: Result<Form<EventUpdate>, FormRejection>,
) -> Response {
    let result: WebsiteResult<Response> = async {
        let update = form(payload)?;
        let outcome = state.client.update_event(&update).await?;
        info!(event_id = update.id, success = outcome.is_success(), "event updated");
        Ok(Redirect::to(&format!("/event/{}", update.id)).into_response())
    }
    .await;
    respond(&state, result)
}

pub async fn like_handler(
    State(state): State<WebsiteState>,
    payload: Result<Form<LikeRequest>, FormRejection>,
) -> Response {
    let result: WebsiteResult<Response> = async {
        let LikeRequest { id } = form(payload)?;
        state.client.like_event(id).await?;
        Ok(Redirect::to("/").into_response())
    }
    .await;
    respond(&state, result)
}

pub async fn unlike_handler(
    State(state): State<WebsiteState>,
    payload: Result<Form<LikeRequest>, FormRejection>,
) -> Response {
    let result: WebsiteResult<Response> = async {
        let LikeRequest { id } = form(payload)?;
        state.client.unlike_event(id).await?;
        Ok(Redirect::to("/").into_response())
    }
    .await;
    respond(&state, result)
}

pub async fn delete_event_handler(
    State(state): State<WebsiteState>,
    AxumPath(id): AxumPath<i64>,
) -> Response {
    let result: WebsiteResult<Response> = async {
        state.client.delete_event(id).await?;
        Ok(Redirect::to("/").into_response())
    }
    .await;
    respond(&state, result)
}

pub async fn create_comment_handler(
    State(state): State<WebsiteState>,
    payload: Result<Form<NewComment>, FormRejection>,
) -> Response {
    let result: WebsiteResult<Response> = async {
        let comment = form(payload)?;
        state.client.add_comment(&comment).await?;
        Ok(Redirect::to(&format!("/event/{}", comment.event_id)).into_response())
    }
    .await;
    respond(&state, result)
}

pub async fn delete_comment_handler(
    State(state): State<WebsiteState>,
    AxumPath((event_id, id)): AxumPath<(i64, i64)>,
) -> Response {
    let result: WebsiteResult<Response> = async {
        state.client.delete_comment(event_id, id).await?;
        Ok(Redirect::to(&format!("/event/{}", event_id)).into_response())
    }
    .await;
    respond(&state, result)
}

pub fn create_router(state: WebsiteState) -> Router {
    Router::new()
        // Pages
        .route("/", get(home_handler))
        .route("/about", get(about_handler))
        .route("/event/{id}", get(event_handler))

        // Event forms
        .route("/event", post(create_event_handler))
        .route("/event/update", post(update_event_handler))
        .route("/event/delete/{id}", get(delete_event_handler))
        .route("/like/event", post(like_handler))
        .route("/event/unlike", post(unlike_handler))

        // Comment forms
        .route("/comment", post(create_comment_handler))
        .route("/comment/delete/{event_id}/{id}", get(delete_comment_handler))

        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_VALUE),
        ))
        .with_state(state)
}

//! Web chat surface
//!
//! A single page: the sidebar takes a spreadsheet link, the main panel shows
//! the conversation and takes questions. Every form posts and redirects back
//! to `/`, which brings the session up to date and replays its history.

pub mod page;
pub mod sessions;

pub use sessions::{SessionRegistry, SESSION_COOKIE};

use crate::session::{Message, SessionController, SessionPhase};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub sessions: Arc<SessionRegistry>,
    pub cache_dir: PathBuf,
}

impl AppState {
    pub fn new(controller: Arc<SessionController>, cache_dir: PathBuf) -> Self {
        Self {
            controller,
            sessions: Arc::new(SessionRegistry::default()),
            cache_dir,
        }
    }

    /// Replace the session registry
    pub fn with_sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = Arc::new(sessions);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct LoadForm {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    pub prompt: String,
}

#[derive(Serialize)]
struct HistoryResponse<'a> {
    phase: SessionPhase,
    warning: Option<&'a str>,
    messages: &'a [Message],
}

/// Build the application router
///
/// `/cache` serves the files in the cache directory, such as the rendered
/// diagram.
pub fn router(state: AppState) -> Router {
    let cache = ServeDir::new(&state.cache_dir);
    Router::new()
        .route("/", get(index))
        .route("/load", post(load))
        .route("/ask", post(ask))
        .route("/suggestions/:key", post(select_suggestion))
        .route("/api/messages", get(api_messages))
        .route("/health", get(health))
        .nest_service("/cache", cache)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, session) = state.sessions.resolve(jar);
    let mut session = session.lock().await;

    state.controller.refresh(&mut session).await;

    match page::render_page(&session, &state.cache_dir) {
        Ok(html) => (jar, Html(html)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn load(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoadForm>,
) -> impl IntoResponse {
    let (jar, session) = state.sessions.resolve(jar);
    {
        let mut session = session.lock().await;
        state.controller.submit_url(&mut session, form.url.trim()).await;
    }
    (jar, Redirect::to("/"))
}

async fn ask(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AskForm>,
) -> impl IntoResponse {
    let (jar, session) = state.sessions.resolve(jar);
    {
        let mut session = session.lock().await;
        state.controller.dispatch(&mut session, &form.prompt).await;
    }
    (jar, Redirect::to("/"))
}

async fn select_suggestion(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let (jar, session) = state.sessions.resolve(jar);
    {
        let mut session = session.lock().await;
        if state.controller.select_suggestion(&mut session, &key) {
            state.controller.dispatch_pending(&mut session).await;
        }
    }
    (jar, Redirect::to("/"))
}

/// Message history as JSON; a request without a live session gets an empty one
async fn api_messages(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(session) = state.sessions.lookup(&jar) else {
        return Json(HistoryResponse {
            phase: SessionPhase::Empty,
            warning: None,
            messages: &[],
        })
        .into_response();
    };

    let session = session.lock().await;
    Json(HistoryResponse {
        phase: session.phase(),
        warning: session.warning(),
        messages: session.messages().all(),
    })
    .into_response()
}

async fn health() -> &'static str {
    "ok"
}

fn internal_error(e: anyhow::Error) -> Response {
    tracing::error!("Failed to render page: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
}

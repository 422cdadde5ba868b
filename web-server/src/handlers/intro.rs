//! Landing page and its per-session dismissal

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, Html, IntoResponse, Redirect},
};
use empleo_core::RawResponse;

use crate::render;
use crate::session::{session_cookie, session_id};
use crate::AppState;

/// Intro until dismissed in this session, then the form
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let (id, session) = state.sessions.touch(session_id(&headers));
    let cookie = session_cookie(id, state.sessions.ttl());

    let html = if session.intro_dismissed {
        render::form_page(&RawResponse::default())
    } else {
        render::intro_page()
    };

    (AppendHeaders([(SET_COOKIE, cookie)]), Html(html))
}

pub async fn dismiss(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let id = state.sessions.dismiss_intro(session_id(&headers));
    tracing::debug!("Intro dismissed for session {}", id);

    (
        AppendHeaders([(SET_COOKIE, session_cookie(id, state.sessions.ttl()))]),
        Redirect::to("/"),
    )
}

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    api::{AppState, CurrentSession},
    views::{self, Page},
};

pub(super) fn page(session: &CurrentSession) -> Page<'_> {
    Page {
        language: session.language(),
        user: session.user(),
    }
}

pub async fn index(session: CurrentSession) -> Html<String> {
    Html(views::index(&page(&session)))
}

pub async fn why_register(session: CurrentSession) -> Html<String> {
    Html(views::why_register(&page(&session)))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPageQuery {
    /// Slug of the provider whose sign-in just failed
    pub fail: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    session: CurrentSession,
    query: Result<Query<LoginPageQuery>, QueryRejection>,
) -> Html<String> {
    // a mangled query just renders the plain page
    let failed = query
        .ok()
        .and_then(|Query(q)| q.fail)
        .and_then(|slug| slug.parse().ok());
    Html(views::login(
        &page(&session),
        &state.providers.enabled(),
        failed,
    ))
}

pub async fn register(State(state): State<AppState>, session: CurrentSession) -> Html<String> {
    Html(views::register(
        &page(&session),
        &state.providers.enabled(),
        session.data.registration_info.as_ref(),
    ))
}

pub async fn profile(session: CurrentSession) -> Response {
    match session.user() {
        Some(user) => Html(views::profile(&page(&session), user)).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

pub async fn not_found(session: CurrentSession) -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(views::not_found(&page(&session))))
}

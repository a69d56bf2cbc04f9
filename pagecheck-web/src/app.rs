//! Routing and request handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Form, Router};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tracing::{error, warn};

use pagecheck_core::checker::Checker;
use pagecheck_core::error::{PagecheckError, StoreError};
use pagecheck_core::normalize::normalize;
use pagecheck_core::store::UrlStore;
use pagecheck_core::types::UrlId;

use crate::flash::{Flash, FlashStore};
use crate::pages;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UrlStore>,
    pub checker: Arc<Checker>,
    pub flash: FlashStore,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/urls", get(list_urls).post(create_url))
        .route("/urls/{id}", get(show_url))
        .route("/urls/{id}/checks", post(run_check))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateUrlForm {
    url: String,
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let flash = state.flash.take(&headers);
    Html(pages::landing(flash.as_ref()))
}

async fn list_urls(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.store.list_urls().await {
        Ok(summaries) => {
            let flash = state.flash.take(&headers);
            Html(pages::urls_index(&summaries, flash.as_ref())).into_response()
        }
        Err(e) => internal_error(&e),
    }
}

async fn show_url(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let url = match state.store.get_url(UrlId(id)).await {
        Ok(Some(url)) => url,
        Ok(None) => return not_found(),
        Err(e) => return internal_error(&e),
    };
    match state.store.checks_for_url(url.id).await {
        Ok(checks) => {
            let flash = state.flash.take(&headers);
            Html(pages::url_show(&url, &checks, flash.as_ref())).into_response()
        }
        Err(e) => internal_error(&e),
    }
}

async fn create_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateUrlForm>,
) -> Response {
    let Ok(canonical) = normalize(&form.url) else {
        warn!(input = %form.url, "rejected invalid URL");
        return state
            .flash
            .redirect_with_flash(&headers, "/", Flash::danger("Invalid URL"));
    };

    // Advisory pre-check; the UNIQUE constraint below remains authoritative
    // when two requests race past it with the same canonical name.
    match state.store.url_exists(&canonical).await {
        Ok(true) => {
            return state.flash.redirect_with_flash(
                &headers,
                "/urls",
                Flash::info("Page already exists"),
            );
        }
        Ok(false) => {}
        Err(e) => return internal_error(&e),
    }

    match state.store.create_url(&canonical).await {
        Ok(_) => {
            state
                .flash
                .redirect_with_flash(&headers, "/urls", Flash::success("Page added"))
        }
        Err(PagecheckError::Store(StoreError::DuplicateUrl(_))) => state.flash.redirect_with_flash(
            &headers,
            "/urls",
            Flash::info("Page already exists"),
        ),
        Err(e) => internal_error(&e),
    }
}

async fn run_check(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let url = match state.store.get_url(UrlId(id)).await {
        Ok(Some(url)) => url,
        Ok(None) => return not_found(),
        Err(e) => return internal_error(&e),
    };

    let location = format!("/urls/{id}");
    match state.checker.check(state.store.as_ref(), &url).await {
        Ok(_) => state
            .flash
            .redirect_with_flash(&headers, &location, Flash::success("Page checked")),
        Err(PagecheckError::Fetch(e)) => {
            warn!(url = %url.name, error = %e, "check failed");
            state.flash.redirect_with_flash(
                &headers,
                &location,
                Flash::danger(format!("Check failed: {e}")),
            )
        }
        Err(e) => internal_error(&e),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(pages::not_found())).into_response()
}

fn internal_error(error: &PagecheckError) -> Response {
    error!(%error, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(pages::internal_error()),
    )
        .into_response()
}

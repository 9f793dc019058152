//! Route table and request handlers.
//!
//! Each handler performs at most one store operation, then renders a view,
//! serializes JSON or redirects back to the log.

use crate::error::{ApiError, PageError};
use crate::state::AppState;
use crate::views::View;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use replog_core::{Entry, EntryForm, EntryId, Error, SortSpec};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the router for every route, with static assets as the fallback
pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(state.static_dir());

    Router::new()
        .route("/", get(index))
        .route("/entries", post(create))
        .route("/entries/new", get(new_form))
        .route("/entries/{id}/edit", get(edit_form))
        .route("/entries/{id}", put(update).patch(update).delete(destroy))
        .route("/api/entries", get(api_entries))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Path ids that do not parse name no entry
fn parse_id(raw: &str) -> Option<EntryId> {
    raw.parse().ok()
}

fn render(state: &AppState, view: View<'_>) -> Result<Html<String>, Error> {
    state
        .renderer()
        .render(&view)
        .map(Html)
        .map_err(|_| Error::Store(format!("failed to render view {:?}", view.name())))
}

/// GET / - the log, newest first
async fn index(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let entries = state
        .with_store(|store| store.list_all(&SortSpec::newest_first()))
        .await
        .map_err(PageError::context("Server error"))?;

    render(&state, View::Index { entries: &entries }).map_err(PageError::context("Server error"))
}

/// GET /entries/new - blank form
async fn new_form(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    render(&state, View::New).map_err(PageError::context("Server error"))
}

/// POST /entries
async fn create(
    State(state): State<AppState>,
    Form(form): Form<EntryForm>,
) -> Result<Redirect, PageError> {
    let context = "Error creating entry";
    let fields = form
        .validate()
        .map_err(|e| PageError::new(context, e.into()))?;

    let entry = state
        .with_store(move |store| store.create(fields))
        .await
        .map_err(PageError::context(context))?;

    tracing::info!(id = %entry.id, exercise = %entry.exercise, "Entry created");
    Ok(Redirect::to("/"))
}

/// GET /entries/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let context = "Error loading entry";
    let entry: Option<Entry> = match parse_id(&id) {
        Some(id) => state
            .with_store(move |store| store.find_by_id(&id))
            .await
            .map_err(PageError::context(context))?,
        None => None,
    };

    let entry = entry.ok_or_else(|| PageError::new(context, Error::NotFound(id)))?;
    render(&state, View::Edit { entry: &entry }).map_err(PageError::context(context))
}

/// PUT /entries/{id} - full replace of the editable fields
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<EntryForm>,
) -> Result<Redirect, PageError> {
    let context = "Error updating entry";
    let id = parse_id(&id).ok_or_else(|| PageError::new(context, Error::NotFound(id)))?;
    let fields = form
        .validate()
        .map_err(|e| PageError::new(context, e.into()))?;

    state
        .with_store(move |store| store.update(&id, fields))
        .await
        .map_err(PageError::context(context))?;

    tracing::info!(%id, "Entry updated");
    Ok(Redirect::to("/"))
}

/// DELETE /entries/{id} - succeeds whether or not the entry existed
async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let Some(id) = parse_id(&id) else {
        tracing::debug!(id = %id, "Delete of unparseable id ignored");
        return Ok(Redirect::to("/"));
    };

    state
        .with_store(move |store| store.delete(&id))
        .await
        .map_err(PageError::context("Error deleting entry"))?;

    tracing::info!(%id, "Entry deleted");
    Ok(Redirect::to("/"))
}

/// GET /api/entries - JSON feed ordered by date
async fn api_entries(State(state): State<AppState>) -> Result<Json<Vec<Entry>>, ApiError> {
    state
        .with_store(|store| store.list_all(&SortSpec::by_date()))
        .await
        .map(Json)
        .map_err(ApiError)
}

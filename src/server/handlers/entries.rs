//! Entry listing, display and owner-gated mutation routes

use axum::{
    Form,
    extract::{Path, Query, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use super::{EntryForm, action_path, refusal, validation_message};
use crate::core::auth::{Action, DenialReason};
use crate::core::controller::LoadOutcome;
use crate::core::entry::{Entry, EntryId};
use crate::core::error::{AccessError, BlogError, RequestError};
use crate::core::extractors::RequestIdentity;
use crate::core::query::ListQuery;
use crate::server::AppState;
use crate::server::flash::{FlashLevel, FlashRedirect, IncomingFlashes, View, login_redirect};

/// GET / - first page of entries
pub async fn list_entries(
    State(state): State<AppState>,
    identity: RequestIdentity,
    flashes: IncomingFlashes,
    Query(query): Query<ListQuery>,
) -> Result<View, BlogError> {
    render_page(&state, identity, flashes, 1, query).await
}

/// GET /page/{page} - any page of entries
pub async fn list_entries_page(
    State(state): State<AppState>,
    identity: RequestIdentity,
    flashes: IncomingFlashes,
    page: Result<Path<i64>, PathRejection>,
    Query(query): Query<ListQuery>,
) -> Result<View, BlogError> {
    let page = path_param("page", page)?;
    render_page(&state, identity, flashes, page, query).await
}

async fn render_page(
    state: &AppState,
    identity: RequestIdentity,
    flashes: IncomingFlashes,
    page: i64,
    query: ListQuery,
) -> Result<View, BlogError> {
    let listing = state.controller.list(page, query.limit.as_deref()).await?;
    Ok(View::new(
        "entries",
        json!({
            "entries": listing.data,
            "pagination": listing.pagination,
        }),
        &identity,
        flashes,
    ))
}

/// GET /entry/{id}
pub async fn show_entry(
    State(state): State<AppState>,
    identity: RequestIdentity,
    flashes: IncomingFlashes,
    id: Result<Path<EntryId>, PathRejection>,
) -> Result<View, BlogError> {
    let entry = state.controller.get_one(path_param("id", id)?).await?;
    let owned = identity
        .identity
        .user_id()
        .is_some_and(|user_id| entry.is_owned_by(&user_id));

    Ok(View::new(
        "entry",
        json!({ "entry": entry, "owned": owned }),
        &identity,
        flashes,
    ))
}

/// GET /entry/add
pub async fn add_entry_form(identity: RequestIdentity, flashes: IncomingFlashes) -> Response {
    if !identity.is_authenticated() {
        return login_redirect("/entry/add").into_response();
    }
    View::new("add_entry", json!({}), &identity, flashes).into_response()
}

/// POST /entry/add
pub async fn add_entry(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Form(form): Form<EntryForm>,
) -> Result<Response, BlogError> {
    if !identity.is_authenticated() {
        return Ok(login_redirect("/entry/add").into_response());
    }
    if let Err(errors) = form.validate() {
        return Ok(FlashRedirect::to("/entry/add")
            .with_flash(FlashLevel::Danger, validation_message(&errors))
            .into_response());
    }

    match state
        .controller
        .add(&identity.identity, form.title, form.content)
        .await
    {
        Ok(_) => Ok(FlashRedirect::to("/")
            .with_flash(FlashLevel::Success, "Entry added")
            .into_response()),
        Err(BlogError::Access(AccessError::Denied { .. })) => {
            Ok(login_redirect("/entry/add").into_response())
        }
        Err(e) => Err(e),
    }
}

/// GET /entry/{id}/edit
pub async fn edit_entry_form(
    State(state): State<AppState>,
    identity: RequestIdentity,
    flashes: IncomingFlashes,
    id: Result<Path<EntryId>, PathRejection>,
) -> Result<Response, BlogError> {
    let id = path_param("id", id)?;
    guarded_view(&state, identity, flashes, id, Action::Edit, "edit_entry").await
}

/// POST /entry/{id}/edit
///
/// A refusal outranks a form error, so an invalid form is only reported to
/// a caller who may edit the entry.
pub async fn edit_entry(
    State(state): State<AppState>,
    identity: RequestIdentity,
    id: Result<Path<EntryId>, PathRejection>,
    Form(form): Form<EntryForm>,
) -> Result<Response, BlogError> {
    let id = path_param("id", id)?;
    if let Some(redirect) = require_login(&identity, id, Action::Edit) {
        return Ok(redirect.into_response());
    }
    if let Err(errors) = form.validate() {
        if let Err(redirect) = authorize(&state, &identity, id, Action::Edit).await? {
            return Ok(redirect.into_response());
        }
        return Ok(FlashRedirect::to(action_path(id, Action::Edit))
            .with_flash(FlashLevel::Danger, validation_message(&errors))
            .into_response());
    }

    match state
        .controller
        .edit(&identity.identity, id, form.title, form.content)
        .await
    {
        Ok(_) => Ok(FlashRedirect::to("/")
            .with_flash(FlashLevel::Success, "Entry updated")
            .into_response()),
        Err(e) => refused(e, id, Action::Edit),
    }
}

/// GET /entry/{id}/delete - confirmation page
pub async fn delete_entry_form(
    State(state): State<AppState>,
    identity: RequestIdentity,
    flashes: IncomingFlashes,
    id: Result<Path<EntryId>, PathRejection>,
) -> Result<Response, BlogError> {
    let id = path_param("id", id)?;
    guarded_view(&state, identity, flashes, id, Action::Delete, "delete_entry").await
}

/// POST /entry/{id}/delete
pub async fn delete_entry(
    State(state): State<AppState>,
    identity: RequestIdentity,
    id: Result<Path<EntryId>, PathRejection>,
) -> Result<Response, BlogError> {
    let id = path_param("id", id)?;
    if let Some(redirect) = require_login(&identity, id, Action::Delete) {
        return Ok(redirect.into_response());
    }

    match state.controller.remove(&identity.identity, id).await {
        Ok(()) => Ok(FlashRedirect::to("/")
            .with_flash(FlashLevel::Success, "Entry deleted")
            .into_response()),
        Err(e) => refused(e, id, Action::Delete),
    }
}

/// Render `view` for an entry the caller may act on, or redirect away
async fn guarded_view(
    state: &AppState,
    identity: RequestIdentity,
    flashes: IncomingFlashes,
    id: EntryId,
    action: Action,
    view: &'static str,
) -> Result<Response, BlogError> {
    Ok(match authorize(state, &identity, id, action).await? {
        Ok(entry) => View::new(view, json!({ "entry": entry }), &identity, flashes).into_response(),
        Err(redirect) => redirect.into_response(),
    })
}

/// The entry if the caller may perform `action` on it, else where to send them
async fn authorize(
    state: &AppState,
    identity: &RequestIdentity,
    id: EntryId,
    action: Action,
) -> Result<Result<Entry, FlashRedirect>, BlogError> {
    if let Some(redirect) = require_login(identity, id, action) {
        return Ok(Err(redirect));
    }

    match state
        .controller
        .load_authorized(id, &identity.identity, action)
        .await?
    {
        LoadOutcome::Permitted(entry) => Ok(Ok(entry)),
        LoadOutcome::Denied(_, reason) => Ok(Err(refusal(id, action, reason))),
        LoadOutcome::NotFound => Err(BlogError::entry_not_found(id)),
    }
}

/// Login redirect for anonymous callers of an owner-gated route
fn require_login(identity: &RequestIdentity, id: EntryId, action: Action) -> Option<FlashRedirect> {
    if identity.is_authenticated() {
        return None;
    }
    tracing::warn!(entry_id = id, %action, "anonymous request for gated route");
    Some(refusal(id, action, DenialReason::NotAuthenticated))
}

/// Path segment `field`, or an `INVALID_REQUEST` naming it
fn path_param<T>(field: &str, param: Result<Path<T>, PathRejection>) -> Result<T, BlogError> {
    let Path(value) = param.map_err(|e| RequestError::InvalidField {
        field: field.to_string(),
        message: e.body_text(),
    })?;
    Ok(value)
}

/// Denials raised by the controller end in a redirect
fn refused(err: BlogError, id: EntryId, action: Action) -> Result<Response, BlogError> {
    match err {
        BlogError::Access(AccessError::Denied { reason, .. }) => {
            Ok(refusal(id, action, reason).into_response())
        }
        other => Err(other),
    }
}

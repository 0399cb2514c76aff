//! HTTP handlers for the browser-facing routes
//!
//! Handlers translate form posts and path parameters into core calls. Refusals
//! become redirects with a flash message; only a missing entry or a storage
//! fault surfaces as a JSON error body.

pub mod auth;
pub mod entries;

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::core::auth::{Action, DenialReason, denial_message};
use crate::core::entry::EntryId;
use crate::server::flash::{FlashLevel, FlashRedirect, login_redirect};

/// Submitted title and body of an entry
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EntryForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    pub content: String,
}

/// Submitted credentials
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
}

/// `?next=` target carried through the login page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NextQuery {
    pub next: Option<String>,
}

pub(crate) fn entry_path(id: EntryId) -> String {
    format!("/entry/{}", id)
}

pub(crate) fn action_path(id: EntryId, action: Action) -> String {
    format!("/entry/{}/{}", id, action)
}

/// Redirect for a refused action on entry `id`
///
/// Anonymous callers go to the login page and come back to the action;
/// non-owners are sent to the read-only entry view.
pub(crate) fn refusal(id: EntryId, action: Action, reason: DenialReason) -> FlashRedirect {
    match reason {
        DenialReason::NotAuthenticated => login_redirect(&action_path(id, action)),
        DenialReason::NotOwner => FlashRedirect::to(entry_path(id))
            .with_flash(FlashLevel::Danger, denial_message(action, reason)),
    }
}

/// First human-readable message among validation failures
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));
    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("Invalid {}", field),
            })
        })
        .next()
        .unwrap_or_else(|| "Invalid form".to_string())
}

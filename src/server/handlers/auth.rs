//! Login and logout routes

use axum::{
    Form,
    extract::{Query, State},
};
use serde_json::json;
use validator::Validate;

use super::{LoginForm, NextQuery};
use crate::core::error::{AuthError, BlogError, INVALID_CREDENTIALS_MESSAGE};
use crate::core::extractors::RequestIdentity;
use crate::server::AppState;
use crate::server::flash::{FlashLevel, FlashRedirect, IncomingFlashes, View, safe_next};

/// GET /login
pub async fn login_form(
    identity: RequestIdentity,
    flashes: IncomingFlashes,
    Query(query): Query<NextQuery>,
) -> View {
    View::new("login", json!({ "next": query.next }), &identity, flashes)
}

/// POST /login
///
/// Any previous session of this browser is dropped first, so a failed
/// attempt always leaves the caller anonymous.
pub async fn login(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<FlashRedirect, BlogError> {
    state.authenticator.logout(identity.token.as_ref()).await?;

    let outcome = match form.validate() {
        Ok(()) => state.authenticator.login(&form.email, &form.password).await,
        Err(_) => Err(AuthError::InvalidCredentials.into()),
    };

    match outcome {
        Ok(session) => Ok(FlashRedirect::to(safe_next(query.next.as_deref()))
            .with_cookie(state.session_cookie(&session.token))),
        Err(BlogError::Auth(AuthError::InvalidCredentials)) => {
            let back = match query.next.as_deref() {
                Some(next) => format!("/login?next={}", urlencoding::encode(next)),
                None => "/login".to_string(),
            };
            Ok(FlashRedirect::to(back)
                .with_cookie(state.clear_session_cookie())
                .with_flash(FlashLevel::Danger, INVALID_CREDENTIALS_MESSAGE))
        }
        Err(e) => Err(e),
    }
}

/// GET /logout
pub async fn logout(
    State(state): State<AppState>,
    identity: RequestIdentity,
) -> Result<FlashRedirect, BlogError> {
    let was_authenticated = identity.is_authenticated();
    state.authenticator.logout(identity.token.as_ref()).await?;

    let redirect = FlashRedirect::to("/").with_cookie(state.clear_session_cookie());
    Ok(if was_authenticated {
        redirect.with_flash(FlashLevel::Info, "You have been logged out")
    } else {
        redirect
    })
}

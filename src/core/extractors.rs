//! Axum extractors and cookie helpers
//!
//! [`RequestIdentity`] resolves the session cookie of every request into an
//! [`Identity`]. A missing, malformed, unknown or expired token is simply
//! anonymous; only a storage failure rejects the request.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};

use crate::core::auth::Identity;
use crate::core::entry::User;
use crate::core::error::BlogError;
use crate::core::session::SessionToken;
use crate::server::AppState;

/// Value of cookie `name` in the request's `Cookie` headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
        .next()
}

/// `Set-Cookie` header value for a path-wide, HTTP-only cookie
///
/// `max_age_secs` of `Some(0)` deletes the cookie; `None` makes it last for
/// the browser session.
pub fn set_cookie(name: &str, value: &str, max_age_secs: Option<i64>, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", name, value);
    if let Some(max_age) = max_age_secs {
        cookie.push_str(&format!("; Max-Age={}", max_age));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Identity of the caller, resolved from the session cookie
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    pub identity: Identity,

    /// The authenticated user, for display
    pub user: Option<User>,

    /// Token presented by the caller, valid or not
    pub token: Option<SessionToken>,
}

impl RequestIdentity {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated()
    }
}

impl FromRequestParts<AppState> for RequestIdentity {
    type Rejection = BlogError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, &state.config.session.cookie_name)
            .and_then(|raw| raw.parse::<SessionToken>().ok());

        let user = state.authenticator.current_user(token.as_ref()).await?;
        let identity = user
            .as_ref()
            .map(|user| Identity::authenticated(user.id))
            .unwrap_or_default();

        Ok(Self {
            identity,
            user,
            token,
        })
    }
}

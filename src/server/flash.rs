//! Flash messages, redirects and view responses
//!
//! Failures on the browser-facing routes are not errors to the caller: they
//! redirect with a one-shot flash message. The message travels in a cookie
//! and is returned (then cleared) by the next rendered [`View`].

use axum::extract::FromRequestParts;
use axum::http::{HeaderValue, header, request::Parts};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::fmt;

use crate::core::auth::LOGIN_REQUIRED_MESSAGE;
use crate::core::extractors::{RequestIdentity, cookie_value, set_cookie};

/// Cookie carrying the pending flash message
pub const FLASH_COOKIE: &str = "blogful_flash";

/// Severity of a flash message, mirrored in the client's alert styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Danger,
    Success,
    Info,
}

impl FlashLevel {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "danger" => Some(FlashLevel::Danger),
            "success" => Some(FlashLevel::Success),
            "info" => Some(FlashLevel::Info),
            _ => None,
        }
    }
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlashLevel::Danger => "danger",
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
        })
    }
}

/// A one-shot user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Cookie value: `level|percent-encoded message`
    pub fn encode(&self) -> String {
        format!("{}|{}", self.level, urlencoding::encode(&self.message))
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (level, message) = raw.split_once('|')?;
        Some(Self {
            level: FlashLevel::parse(level)?,
            message: urlencoding::decode(message).ok()?.into_owned(),
        })
    }
}

/// Flash messages delivered with the current request
#[derive(Debug, Clone, Default)]
pub struct IncomingFlashes(pub Vec<Flash>);

impl<S: Send + Sync> FromRequestParts<S> for IncomingFlashes {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            cookie_value(&parts.headers, FLASH_COOKIE)
                .and_then(Flash::decode)
                .into_iter()
                .collect(),
        ))
    }
}

/// `303 See Other` redirect, optionally setting a flash and other cookies
#[derive(Debug, Clone)]
pub struct FlashRedirect {
    location: String,
    flash: Option<Flash>,
    cookies: Vec<String>,
}

impl FlashRedirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            flash: None,
            cookies: Vec::new(),
        }
    }

    pub fn with_flash(mut self, level: FlashLevel, message: impl Into<String>) -> Self {
        self.flash = Some(Flash::new(level, message));
        self
    }

    /// Attach a raw `Set-Cookie` value
    pub fn with_cookie(mut self, cookie: String) -> Self {
        self.cookies.push(cookie);
        self
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.location).into_response();

        let flash_cookie = self
            .flash
            .map(|flash| set_cookie(FLASH_COOKIE, &flash.encode(), None, false));

        for cookie in self.cookies.into_iter().chain(flash_cookie) {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::error!(error = %e, "dropping unencodable cookie"),
            }
        }
        response
    }
}

/// Redirect to the login page, remembering where the caller was headed
pub fn login_redirect(next: &str) -> FlashRedirect {
    FlashRedirect::to(format!("/login?next={}", urlencoding::encode(next)))
        .with_flash(FlashLevel::Danger, LOGIN_REQUIRED_MESSAGE)
}

/// Keep `next` only when it is a same-site absolute path
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// JSON rendering of a page, including session and flash context
///
/// Markup is left to the client; the body carries the view name, the data,
/// the logged-in user (if any) and pending flashes.
#[derive(Debug)]
pub struct View {
    name: &'static str,
    data: Value,
    current_user: Option<Value>,
    flashes: Vec<Flash>,
}

impl View {
    pub fn new(
        name: &'static str,
        data: Value,
        identity: &RequestIdentity,
        flashes: IncomingFlashes,
    ) -> Self {
        Self {
            name,
            data,
            current_user: identity
                .user
                .as_ref()
                .map(|user| json!({ "id": user.id, "name": user.name })),
            flashes: flashes.0,
        }
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        let mut body = match self.data {
            Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        body.insert("view".to_string(), Value::from(self.name));
        body.insert(
            "current_user".to_string(),
            self.current_user.unwrap_or(Value::Null),
        );
        body.insert("flashes".to_string(), json!(self.flashes));

        let mut response = Json(Value::Object(body)).into_response();
        if !self.flashes.is_empty() {
            let clear = set_cookie(FLASH_COOKIE, "", Some(0), false);
            if let Ok(value) = HeaderValue::from_str(&clear) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

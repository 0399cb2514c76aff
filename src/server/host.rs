//! Shared application state for the HTTP layer
//!
//! `AppState` is cloned into every handler. It owns nothing transport
//! specific beyond the cookie formatting derived from the session settings.

use crate::config::BlogConfig;
use crate::core::controller::EntryLifecycleController;
use crate::core::extractors::set_cookie;
use crate::core::session::{SessionAuthenticator, SessionToken};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<EntryLifecycleController>,
    pub authenticator: Arc<SessionAuthenticator>,
    pub config: Arc<BlogConfig>,
}

impl AppState {
    pub fn new(
        controller: EntryLifecycleController,
        authenticator: SessionAuthenticator,
        config: BlogConfig,
    ) -> Self {
        Self {
            controller: Arc::new(controller),
            authenticator: Arc::new(authenticator),
            config: Arc::new(config),
        }
    }

    /// `Set-Cookie` value binding the browser to `token`
    pub fn session_cookie(&self, token: &SessionToken) -> String {
        let session = &self.config.session;
        set_cookie(
            &session.cookie_name,
            &token.to_string(),
            Some(session.ttl_secs),
            session.secure_cookie,
        )
    }

    /// `Set-Cookie` value deleting the session cookie
    pub fn clear_session_cookie(&self) -> String {
        let session = &self.config.session;
        set_cookie(&session.cookie_name, "", Some(0), session.secure_cookie)
    }
}

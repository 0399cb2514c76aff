//! ServerBuilder for fluent API to build the blog server

use super::host::AppState;
use super::router::{build_blog_routes, health_routes};
use crate::config::BlogConfig;
use crate::core::controller::EntryLifecycleController;
use crate::core::service::{EntryRepository, PasswordVerifier, SessionStore, UserRepository};
use crate::core::session::SessionAuthenticator;
use crate::storage::{
    Argon2Verifier, InMemoryEntryRepository, InMemorySessionStore, InMemoryUserRepository,
};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder wiring collaborators, configuration and routes into a server
///
/// Any collaborator left unset falls back to its in-memory implementation
/// (and [`Argon2Verifier`] for passwords).
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_config(BlogConfig::load()?)
///     .with_user_repository(users)
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: BlogConfig,
    entries: Option<Arc<dyn EntryRepository>>,
    users: Option<Arc<dyn UserRepository>>,
    sessions: Option<Arc<dyn SessionStore>>,
    verifier: Option<Arc<dyn PasswordVerifier>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: BlogConfig::default(),
            entries: None,
            users: None,
            sessions: None,
            verifier: None,
        }
    }

    pub fn with_config(mut self, config: BlogConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_entry_repository(mut self, repo: impl EntryRepository + 'static) -> Self {
        self.entries = Some(Arc::new(repo));
        self
    }

    pub fn with_user_repository(mut self, repo: impl UserRepository + 'static) -> Self {
        self.users = Some(Arc::new(repo));
        self
    }

    pub fn with_session_store(mut self, store: impl SessionStore + 'static) -> Self {
        self.sessions = Some(Arc::new(store));
        self
    }

    pub fn with_password_verifier(mut self, verifier: impl PasswordVerifier + 'static) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Validate the configuration and assemble the shared state
    pub fn build_state(self) -> Result<AppState> {
        self.config.validate()?;

        let entries = self
            .entries
            .unwrap_or_else(|| Arc::new(InMemoryEntryRepository::new()));
        let users = self
            .users
            .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new()));
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(InMemorySessionStore::new()));
        let verifier = self
            .verifier
            .unwrap_or_else(|| Arc::new(Argon2Verifier::new()));

        let controller =
            EntryLifecycleController::new(entries, self.config.pagination.paginator())
                .with_consistent_snapshot(self.config.pagination.consistent_snapshot);
        let authenticator =
            SessionAuthenticator::new(users, sessions, verifier, self.config.session.ttl());

        Ok(AppState::new(controller, authenticator, self.config))
    }

    /// Build the final router: health and blog routes, traced
    pub fn build(self) -> Result<Router> {
        let state = self.build_state()?;

        Ok(health_routes()
            .merge(build_blog_routes(state))
            .layer(TraceLayer::new_for_http()))
    }

    /// Serve on the configured bind address with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.bind.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

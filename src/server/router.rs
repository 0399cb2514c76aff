//! Route table for the blog

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use super::AppState;
use super::handlers::{auth, entries};

/// Build the blog routes
///
/// - GET /, /page/{page} - paginated listing (`?limit=`)
/// - GET /entry/{id} - single entry
/// - GET|POST /entry/add - add form / create
/// - GET|POST /entry/{id}/edit - edit form / update (owner only)
/// - GET|POST /entry/{id}/delete - confirmation / delete (owner only)
/// - GET|POST /login, GET /logout - session lifecycle
pub fn build_blog_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(entries::list_entries))
        .route("/page/{page}", get(entries::list_entries_page))
        .route(
            "/entry/add",
            get(entries::add_entry_form).post(entries::add_entry),
        )
        .route("/entry/{id}", get(entries::show_entry))
        .route(
            "/entry/{id}/edit",
            get(entries::edit_entry_form).post(entries::edit_entry),
        )
        .route(
            "/entry/{id}/delete",
            get(entries::delete_entry_form).post(entries::delete_entry),
        )
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .with_state(state)
}

/// Liveness probes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "blogful"
    }))
}

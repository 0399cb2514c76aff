//! HTTP server for the blog
//!
//! `ServerBuilder` wires the collaborators into an [`AppState`] and registers:
//! - the listing, entry and session routes
//! - health check routes

pub mod builder;
pub mod flash;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use flash::{Flash, FlashLevel, FlashRedirect, View};
pub use host::AppState;

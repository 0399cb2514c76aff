//! # Blogful
//!
//! A small authenticated blog service: a public, paginated listing of entries
//! with add, edit and delete gated by login and ownership.
//!
//! ## Features
//!
//! - **Pagination**: newest-first listing with a validated `limit` (1 to 100)
//! - **Sessions**: cookie-bound server-side sessions with expiry
//! - **Ownership**: only an entry's author may edit or delete it
//! - **Flash messages**: refusals redirect with a one-shot message
//! - **Configuration**: YAML with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use blogful::prelude::*;
//!
//! let users = InMemoryUserRepository::new();
//! seed_users(&users, &config.users, &Argon2Verifier::new()).await?;
//!
//! ServerBuilder::new()
//!     .with_config(config)
//!     .with_user_repository(users)
//!     .serve()
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{Action, Decision, DenialReason, Identity, OwnershipGuard},
        controller::{EntryLifecycleController, LoadOutcome},
        entry::{Entry, EntryId, NewEntry, User, UserId},
        error::BlogError,
        query::{ListQuery, PaginatedResponse, PaginationMeta, Paginator},
        service::{EntryRepository, PasswordVerifier, SessionStore, UserRepository},
        session::{Session, SessionAuthenticator, SessionToken},
    };

    // === Storage ===
    pub use crate::storage::{
        Argon2Verifier, InMemoryEntryRepository, InMemorySessionStore, InMemoryUserRepository,
        seed_users,
    };

    // === Config ===
    pub use crate::config::{BlogConfig, PaginationSettings, SeedUser, SessionSettings};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
}

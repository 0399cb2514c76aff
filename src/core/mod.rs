//! Core module: domain records, pagination, authentication and authorization

pub mod auth;
pub mod controller;
pub mod entry;
pub mod error;
pub mod extractors;
pub mod query;
pub mod service;
pub mod session;

pub use auth::{AccessPolicy, Action, Decision, DenialReason, Identity, OwnershipGuard};
pub use controller::{EntryLifecycleController, LoadOutcome};
pub use entry::{Entry, EntryId, NewEntry, User, UserId};
pub use error::BlogError;
pub use query::{ListQuery, PageWindow, PaginatedResponse, PaginationMeta, Paginator};
pub use service::{EntryRepository, PasswordVerifier, SessionStore, UserRepository};
pub use session::{Session, SessionAuthenticator, SessionToken};

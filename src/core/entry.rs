//! Domain records: users and the entries they author

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to an entry by its repository
pub type EntryId = u64;

/// Identifier of a registered user
pub type UserId = Uuid;

/// A registered author.
///
/// Users are seeded at startup and never deleted. The password hash is an
/// opaque verifier string and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// An authored content item.
///
/// The owner is fixed at creation; only the title and content can change
/// afterwards, through [`Entry::revise`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    owner_id: UserId,
}

impl Entry {
    /// Assemble a stored entry. Only repositories should call this.
    pub fn from_parts(new: NewEntry, id: EntryId) -> Self {
        Self {
            id,
            title: new.title,
            content: new.content,
            created_at: new.created_at,
            owner_id: new.owner_id,
        }
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Replace the mutable fields, keeping id, timestamp and owner
    pub fn revise(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.title = title.into();
        self.content = content.into();
    }
}

/// An entry that has not been assigned an id yet
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: UserId,
}

impl NewEntry {
    pub fn new(owner_id: UserId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            created_at: Utc::now(),
            owner_id,
        }
    }

    /// Override the creation timestamp (seeding and ordering tests)
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

//! Entry lifecycle: list, view, add, edit and remove
//!
//! The controller is the only writer to the [`EntryRepository`]. Mutations
//! go through [`EntryLifecycleController::load_authorized`], which fetches the
//! entry and runs the [`OwnershipGuard`] in one place.

use crate::core::auth::{Action, Decision, DenialReason, Identity, OwnershipGuard};
use crate::core::entry::{Entry, EntryId, NewEntry};
use crate::core::error::BlogError;
use crate::core::query::{PaginatedResponse, Paginator};
use crate::core::service::EntryRepository;
use std::sync::Arc;

/// Result of fetching an entry for a guarded action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Entry exists and the action is allowed
    Permitted(Entry),

    /// Entry exists but the action is refused
    Denied(Entry, DenialReason),

    /// No entry with that id
    NotFound,
}

impl LoadOutcome {
    /// Collapse into the permitted entry or the matching error
    pub fn into_permitted(self, id: EntryId, action: Action) -> Result<Entry, BlogError> {
        match self {
            LoadOutcome::Permitted(entry) => Ok(entry),
            LoadOutcome::Denied(_, reason) => Err(BlogError::denied(action, reason)),
            LoadOutcome::NotFound => Err(BlogError::entry_not_found(id)),
        }
    }
}

/// Orchestrates entry reads and owner-gated writes
pub struct EntryLifecycleController {
    entries: Arc<dyn EntryRepository>,
    paginator: Paginator,
    guard: OwnershipGuard,
    consistent_snapshot: bool,
}

impl EntryLifecycleController {
    pub fn new(entries: Arc<dyn EntryRepository>, paginator: Paginator) -> Self {
        Self {
            entries,
            paginator,
            guard: OwnershipGuard,
            consistent_snapshot: true,
        }
    }

    /// Choose how listing reads the count and the page
    ///
    /// With `true`, both come from one repository snapshot. With `false`
    /// they are separate reads and a concurrent insert may duplicate or skip
    /// a row at a page boundary.
    pub fn with_consistent_snapshot(mut self, enabled: bool) -> Self {
        self.consistent_snapshot = enabled;
        self
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// One page of entries, newest first. Always permitted.
    pub async fn list(
        &self,
        page: i64,
        limit: Option<&str>,
    ) -> Result<PaginatedResponse<Entry>, BlogError> {
        let effective_limit = self.paginator.effective_limit(limit);
        let start = Paginator::page_index(page).saturating_mul(effective_limit);
        let end = start.saturating_add(effective_limit);

        let (total, data) = if self.consistent_snapshot {
            self.entries.snapshot_page(start, end).await?
        } else {
            let total = self.entries.count().await?;
            let data = self.entries.ordered_slice(start, end).await?;
            (total, data)
        };

        let window = self.paginator.compute_window(page, limit, total);

        Ok(PaginatedResponse {
            data,
            pagination: window.meta(),
        })
    }

    /// Single entry for display, regardless of identity
    pub async fn get_one(&self, id: EntryId) -> Result<Entry, BlogError> {
        self.entries
            .get_by_id(id)
            .await?
            .ok_or_else(|| BlogError::entry_not_found(id))
    }

    /// Fetch an entry and authorize `action` on it in one step
    pub async fn load_authorized(
        &self,
        id: EntryId,
        identity: &Identity,
        action: Action,
    ) -> Result<LoadOutcome, BlogError> {
        let Some(entry) = self.entries.get_by_id(id).await? else {
            return Ok(LoadOutcome::NotFound);
        };

        Ok(match self.guard.authorize(identity, Some(&entry), action) {
            Decision::Permitted => LoadOutcome::Permitted(entry),
            Decision::Denied(reason) => {
                tracing::warn!(entry_id = id, %action, ?reason, "entry access denied");
                LoadOutcome::Denied(entry, reason)
            }
        })
    }

    /// Create an entry owned by the caller
    pub async fn add(
        &self,
        identity: &Identity,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Entry, BlogError> {
        if let Decision::Denied(reason) = self.guard.authorize(identity, None, Action::Add) {
            tracing::warn!(action = %Action::Add, ?reason, "entry access denied");
            return Err(BlogError::denied(Action::Add, reason));
        }
        let Some(owner_id) = identity.user_id() else {
            return Err(BlogError::denied(Action::Add, DenialReason::NotAuthenticated));
        };

        let entry = self
            .entries
            .insert(NewEntry::new(owner_id, title, content))
            .await?;

        tracing::info!(entry_id = entry.id, user_id = %owner_id, "entry added");
        Ok(entry)
    }

    /// Replace title and content of an entry the caller owns
    pub async fn edit(
        &self,
        identity: &Identity,
        id: EntryId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Entry, BlogError> {
        let mut entry = self
            .load_authorized(id, identity, Action::Edit)
            .await?
            .into_permitted(id, Action::Edit)?;

        entry.revise(title, content);
        let entry = self.entries.update(entry).await?;

        tracing::info!(entry_id = id, "entry updated");
        Ok(entry)
    }

    /// Delete an entry the caller owns
    pub async fn remove(&self, identity: &Identity, id: EntryId) -> Result<(), BlogError> {
        self.load_authorized(id, identity, Action::Delete)
            .await?
            .into_permitted(id, Action::Delete)?;

        if !self.entries.delete_by_id(id).await? {
            // Removed concurrently between the load and the delete
            return Err(BlogError::entry_not_found(id));
        }

        tracing::info!(entry_id = id, "entry deleted");
        Ok(())
    }
}

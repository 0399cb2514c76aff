//! Request identity and ownership-based authorization
//!
//! Every core call receives the caller's [`Identity`] explicitly. Reads are
//! public; `add` needs any authenticated user; `edit` and `delete` need the
//! authenticated user to own the entry.

use crate::core::entry::{Entry, UserId};
use serde::Serialize;
use std::fmt;

/// Flash text shown when an anonymous caller hits a gated route
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

/// Identity resolved for the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    /// No session, or an expired one
    #[default]
    Anonymous,

    /// A session bound to a registered user
    Authenticated { user_id: UserId },
}

impl Identity {
    pub fn authenticated(user_id: UserId) -> Self {
        Identity::Authenticated { user_id }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::Authenticated { user_id } => Some(*user_id),
            Identity::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated { .. })
    }
}

/// Operation a caller wants to perform on entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    List,
    Add,
    Edit,
    Delete,
}

impl Action {
    /// Policy guarding this action
    pub fn policy(&self) -> AccessPolicy {
        match self {
            Action::View | Action::List => AccessPolicy::Public,
            Action::Add => AccessPolicy::Authenticated,
            Action::Edit | Action::Delete => AccessPolicy::Owner,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::View => "view",
            Action::List => "list",
            Action::Add => "add",
            Action::Edit => "edit",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Authorization policy for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anyone, including anonymous callers
    Public,

    /// Any authenticated user
    Authenticated,

    /// The authenticated owner of the target entry
    Owner,
}

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The action needs a session and there is none
    NotAuthenticated,

    /// The caller is authenticated but does not own the entry
    NotOwner,
}

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permitted,
    Denied(DenialReason),
}

impl Decision {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Decision::Permitted)
    }
}

/// User-facing text for a refused action
pub fn denial_message(action: Action, reason: DenialReason) -> &'static str {
    match (reason, action) {
        (DenialReason::NotAuthenticated, _) => LOGIN_REQUIRED_MESSAGE,
        (DenialReason::NotOwner, Action::Delete) => "You can only delete your own posts",
        (DenialReason::NotOwner, _) => "You can only edit your own posts",
    }
}

/// Decides whether an identity may perform an action on an entry
///
/// Stateless: the decision depends only on its arguments. Entry owners never
/// change, so no locking is involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipGuard;

impl OwnershipGuard {
    /// Check `action` for `identity` against `entry`
    ///
    /// `entry` may be `None` for actions that do not target an existing entry
    /// (`add`, `list`). An owner-gated action without an entry is denied.
    pub fn authorize(&self, identity: &Identity, entry: Option<&Entry>, action: Action) -> Decision {
        match action.policy() {
            AccessPolicy::Public => Decision::Permitted,

            AccessPolicy::Authenticated => match identity {
                Identity::Authenticated { .. } => Decision::Permitted,
                Identity::Anonymous => Decision::Denied(DenialReason::NotAuthenticated),
            },

            AccessPolicy::Owner => match (identity, entry) {
                (Identity::Anonymous, _) => Decision::Denied(DenialReason::NotAuthenticated),
                (Identity::Authenticated { user_id }, Some(entry)) if entry.is_owned_by(user_id) => {
                    Decision::Permitted
                }
                (Identity::Authenticated { .. }, _) => Decision::Denied(DenialReason::NotOwner),
            },
        }
    }
}

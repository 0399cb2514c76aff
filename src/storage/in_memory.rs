//! In-memory repositories and session store for testing and development

use crate::core::entry::{Entry, EntryId, NewEntry, User, UserId};
use crate::core::service::{EntryRepository, SessionStore, UserRepository};
use crate::core::session::{Session, SessionToken};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

/// Sort key giving newest-first order with descending-id tie-break
type OrderKey = (Reverse<DateTime<Utc>>, Reverse<EntryId>);

fn order_key(entry: &Entry) -> OrderKey {
    (Reverse(entry.created_at), Reverse(entry.id))
}

#[derive(Default)]
struct EntryTable {
    entries: HashMap<EntryId, Entry>,
    order: BTreeSet<OrderKey>,
    last_id: EntryId,
}

impl EntryTable {
    fn slice(&self, start: usize, end: usize) -> Vec<Entry> {
        self.order
            .iter()
            .skip(start)
            .take(end.saturating_sub(start))
            .filter_map(|(_, Reverse(id))| self.entries.get(id).cloned())
            .collect()
    }
}

/// In-memory entry repository
///
/// Ids start at 1 and are never reused. Uses RwLock for thread-safe access;
/// [`EntryRepository::snapshot_page`] reads count and slice under one lock.
#[derive(Clone, Default)]
pub struct InMemoryEntryRepository {
    table: Arc<RwLock<EntryTable>>,
}

impl InMemoryEntryRepository {
    /// Create a new in-memory entry repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryRepository for InMemoryEntryRepository {
    async fn count(&self) -> Result<usize> {
        let table = self
            .table
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(table.entries.len())
    }

    async fn ordered_slice(&self, start: usize, end: usize) -> Result<Vec<Entry>> {
        let table = self
            .table
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(table.slice(start, end))
    }

    async fn get_by_id(&self, id: EntryId) -> Result<Option<Entry>> {
        let table = self
            .table
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(table.entries.get(&id).cloned())
    }

    async fn insert(&self, entry: NewEntry) -> Result<Entry> {
        let mut table = self
            .table
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        table.last_id += 1;
        let entry = Entry::from_parts(entry, table.last_id);
        table.order.insert(order_key(&entry));
        table.entries.insert(entry.id, entry.clone());

        Ok(entry)
    }

    async fn update(&self, entry: Entry) -> Result<Entry> {
        let mut table = self
            .table
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let stored = table
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| anyhow!("Entry {} not found", entry.id))?;

        if stored.owner_id() != entry.owner_id() {
            bail!("Entry {} cannot change owner", entry.id);
        }

        // The ordering index stays valid: only title and content change
        stored.revise(entry.title.clone(), entry.content.clone());

        Ok(stored.clone())
    }

    async fn delete_by_id(&self, id: EntryId) -> Result<bool> {
        let mut table = self
            .table
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        match table.entries.remove(&id) {
            Some(entry) => {
                table.order.remove(&order_key(&entry));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn snapshot_page(&self, start: usize, end: usize) -> Result<(usize, Vec<Entry>)> {
        let table = self
            .table
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok((table.entries.len(), table.slice(start, end)))
    }
}

/// In-memory user repository keyed by id
///
/// Email uniqueness is checked by scanning on insert.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Create a new in-memory user repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn get(&self, id: &UserId) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(users.get(id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User> {
        let mut users = self
            .users
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if users.values().any(|existing| existing.email == user.email) {
            bail!("A user with email '{}' already exists", user.email);
        }
        users.insert(user.id, user.clone());

        Ok(user)
    }
}

/// In-memory session store
///
/// Expired sessions are evicted when they are resolved, and swept whenever a
/// new session is created.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, Session>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held, expired ones included
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user_id: UserId, ttl: Duration) -> Result<Session> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let now = Utc::now();
        sessions.retain(|_, session| !session.is_expired_at(now));

        let session = Session::new(user_id, ttl)?;
        sessions.insert(session.token, session.clone());

        Ok(session)
    }

    async fn resolve(&self, token: &SessionToken) -> Result<Option<Session>> {
        let now = Utc::now();
        {
            let sessions = self
                .sessions
                .read()
                .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

            match sessions.get(token) {
                None => return Ok(None),
                Some(session) if !session.is_expired_at(now) => return Ok(Some(session.clone())),
                Some(_) => {}
            }
        }

        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        sessions.remove(token);

        Ok(None)
    }

    async fn destroy(&self, token: &SessionToken) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        sessions.remove(token);

        Ok(())
    }
}

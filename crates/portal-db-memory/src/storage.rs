use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use papaya::HashMap as PapayaHashMap;
use portal_auth::User;
use portal_storage::{ActivityEntry, Client, Milestone, Notification, Project, Resource};
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// A record plus its insertion sequence number.
///
/// The sequence gives a stable creation order even when two records share a
/// timestamp.
#[derive(Debug, Clone)]
pub(crate) struct Stored<T> {
    pub(crate) seq: u64,
    pub(crate) record: T,
}

pub(crate) type Table<T> = PapayaHashMap<String, Stored<T>>;

/// Activity entries kept by [`InMemoryStorage::new`]. Older entries are
/// dropped first.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 10_000;

/// In-memory portal storage backend using papaya lock-free HashMaps.
///
/// Reads are lock-free. Writes are serialized through a single mutex so that
/// reference checks and cascading deletes see a consistent view.
pub struct InMemoryStorage {
    pub(crate) clients: Table<Client>,
    pub(crate) projects: Table<Project>,
    pub(crate) milestones: Table<Milestone>,
    pub(crate) resources: Table<Resource>,
    pub(crate) notifications: Table<Notification>,
    pub(crate) users: Table<User>,
    /// Activity log, oldest first, at most `activity_capacity` entries
    pub(crate) activity: RwLock<VecDeque<ActivityEntry>>,
    pub(crate) activity_capacity: usize,
    sequence: AtomicU64,
    writes: Mutex<()>,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::with_activity_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }

    /// Creates an empty storage whose activity log keeps at most `capacity`
    /// entries (minimum one).
    pub fn with_activity_capacity(capacity: usize) -> Self {
        Self {
            clients: PapayaHashMap::new(),
            projects: PapayaHashMap::new(),
            milestones: PapayaHashMap::new(),
            resources: PapayaHashMap::new(),
            notifications: PapayaHashMap::new(),
            users: PapayaHashMap::new(),
            activity: RwLock::new(VecDeque::new()),
            activity_capacity: capacity.max(1),
            sequence: AtomicU64::new(1),
            writes: Mutex::new(()),
        }
    }

    /// Generates the next insertion sequence number.
    pub(crate) fn next_seq(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    /// Acquires the write lock.
    pub(crate) async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("clients", &self.clients.len())
            .field("projects", &self.projects.len())
            .field("milestones", &self.milestones.len())
            .field("resources", &self.resources.len())
            .field("notifications", &self.notifications.len())
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}

/// Reads a record by ID.
pub(crate) fn get<T: Clone>(table: &Table<T>, id: &str) -> Option<T> {
    table.pin().get(id).map(|stored| stored.record.clone())
}

/// Returns `true` if a record with this ID exists.
pub(crate) fn contains<T>(table: &Table<T>, id: &str) -> bool {
    table.pin().get(id).is_some()
}

/// Collects the records matching `filter`, in creation order.
pub(crate) fn rows<T, F>(table: &Table<T>, filter: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let guard = table.pin();
    let mut rows: Vec<&Stored<T>> = guard
        .iter()
        .map(|(_, stored)| stored)
        .filter(|stored| filter(&stored.record))
        .collect();
    rows.sort_by_key(|stored| stored.seq);
    rows.into_iter().map(|stored| stored.record.clone()).collect()
}

/// Removes every record matching `filter` and returns their IDs.
pub(crate) fn remove_where<T, F>(table: &Table<T>, filter: F) -> Vec<String>
where
    F: Fn(&T) -> bool,
{
    let guard = table.pin();
    let ids: Vec<String> = guard
        .iter()
        .filter(|(_, stored)| filter(&stored.record))
        .map(|(id, _)| id.clone())
        .collect();
    for id in &ids {
        guard.remove(id);
    }
    ids
}

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use super::ObjectDataEntry;
use crate::properties::ObjectKey;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one registry (and so one binding scope) for logging and lifecycle events.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

type EntryMap = BTreeMap<ObjectKey, Arc<ObjectDataEntry>>;

/// Keyed object data snapshots of one scope.
///
/// Cloning a registry clones the handle, not the storage. A registry made with
/// [`child`](Self::child) reads through to its parent for keys it does not hold itself, but all
/// writes stay local: a child shadows a parent entry, it never modifies it. Registries made with
/// [`new`](Self::new) share nothing.
#[derive(Clone, Debug)]
pub struct ObjectDataRegistry {
    id: ScopeId,
    entries: Arc<RwLock<EntryMap>>,
    parent: Option<Box<ObjectDataRegistry>>,
}

impl Default for ObjectDataRegistry {
    fn default() -> Self {
        ObjectDataRegistry::new()
    }
}

impl ObjectDataRegistry {
    pub fn new() -> Self {
        ObjectDataRegistry {
            id: ScopeId::next(),
            entries: Arc::new(RwLock::new(BTreeMap::new())),
            parent: None,
        }
    }

    pub fn child(&self) -> Self {
        ObjectDataRegistry {
            id: ScopeId::next(),
            entries: Arc::new(RwLock::new(BTreeMap::new())),
            parent: Some(Box::new(self.clone())),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn parent(&self) -> Option<&ObjectDataRegistry> {
        self.parent.as_deref()
    }

    /// Number of ancestors above this registry.
    pub fn depth(&self) -> usize {
        self.parent.as_ref().map(|p| p.depth() + 1).unwrap_or(0)
    }

    /// The entry for `key` from this registry, else from the nearest ancestor holding it.
    pub fn get(&self, key: &str) -> Option<Arc<ObjectDataEntry>> {
        self.get_local(key)
            .or_else(|| self.parent.as_ref().and_then(|p| p.get(key)))
    }

    pub fn get_local(&self, key: &str) -> Option<Arc<ObjectDataEntry>> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains_local(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Store a new snapshot for `key`, replacing the previous one.
    pub fn insert(&self, key: ObjectKey, entry: ObjectDataEntry) -> Arc<ObjectDataEntry> {
        let entry = Arc::new(entry);
        self.entries.write().insert(key, entry.clone());
        entry
    }

    pub fn remove(&self, key: &str) -> Option<Arc<ObjectDataEntry>> {
        self.entries.write().remove(key)
    }

    /// Destroy every local entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut writer = self.entries.write();
        let count = writer.len();
        writer.clear();
        count
    }

    /// Keys visible from this registry, local keys first, then inherited ones.
    pub fn keys(&self) -> Vec<ObjectKey> {
        let mut keys: Vec<ObjectKey> = self.entries.read().keys().cloned().collect();
        if let Some(parent) = &self.parent {
            for key in parent.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

//! Session-scoped key-value memory shared by tools and the bootstrap.
//!
//! [`SessionStateService`] maps a [`SessionId`] to a [`StateRecord`]. Both
//! levels are `DashMap`s, so calls for different sessions never contend and
//! concurrent writes to one session are last-write-wins per key. Reads return
//! cloned values; no map guard escapes this module.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};

pub mod keys;
pub mod value;

pub use value::StateValue;

/// Opaque session identifier issued by the [`crate::runner::Runner`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The key-value memory of one session.
#[derive(Debug, Default)]
pub struct StateRecord {
    entries: DashMap<String, StateValue>,
    bootstrap: Mutex<()>,
}

impl StateRecord {
    pub fn get(&self, key: &str) -> Option<StateValue> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<StateValue>) -> Option<StateValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Insert only when `key` is absent. Returns whether the value was stored.
    pub fn insert_if_absent(&self, key: impl Into<String>, value: impl Into<StateValue>) -> bool {
        match self.entries.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(value.into());
                true
            }
        }
    }

    pub fn remove(&self, key: &str) -> Option<StateValue> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    /// Atomically read-modify-write one key.
    ///
    /// `f` sees the current value (`None` when absent). Leaving `None` in the
    /// slot removes the key. The shard holding `key` stays locked while `f`
    /// runs; `f` must not touch this record.
    pub fn modify<R>(&self, key: &str, f: impl FnOnce(&mut Option<StateValue>) -> R) -> R {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let mut slot = Some(std::mem::replace(occupied.get_mut(), StateValue::Null));
                let out = f(&mut slot);
                match slot {
                    Some(value) => *occupied.get_mut() = value,
                    None => {
                        occupied.remove();
                    }
                }
                out
            }
            Entry::Vacant(vacant) => {
                let mut slot = None;
                let out = f(&mut slot);
                if let Some(value) = slot {
                    vacant.insert(value);
                }
                out
            }
        }
    }

    /// Whether `key` holds `true`.
    pub fn is_true(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|r| r.value().is_true())
    }

    /// Point-in-time copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, StateValue> {
        self.entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes bootstraps of this record.
    pub(crate) fn lock_bootstrap(&self) -> MutexGuard<'_, ()> {
        self.bootstrap.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Process-wide session state, constructed once at startup and shared by `Arc`.
#[derive(Debug, Default)]
pub struct SessionStateService {
    store: DashMap<SessionId, Arc<StateRecord>>,
}

impl SessionStateService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing record for `session_id`, or a new empty one.
    pub fn get_or_init(&self, session_id: &SessionId) -> Arc<StateRecord> {
        if let Some(record) = self.store.get(session_id.as_str()) {
            return Arc::clone(record.value());
        }
        Arc::clone(
            self.store
                .entry(session_id.clone())
                .or_insert_with(|| Arc::new(StateRecord::default()))
                .value(),
        )
    }

    pub fn put(&self, session_id: &SessionId, key: impl Into<String>, value: impl Into<StateValue>) {
        self.get_or_init(session_id).insert(key, value);
    }

    /// Cloned value at `key`. The caller decides which variant it expects.
    pub fn get(&self, session_id: &SessionId, key: &str) -> Option<StateValue> {
        self.store
            .get(session_id.as_str())
            .and_then(|record| record.value().get(key))
    }

    /// Drop the session's record. A later `get_or_init` starts empty.
    pub fn clear(&self, session_id: &SessionId) {
        self.store.remove(session_id.as_str());
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.store.contains_key(session_id.as_str())
    }
}

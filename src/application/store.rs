//! Versioned attribute store.
//!
//! Holds the block configuration as an immutable snapshot. Every write clones
//! the current snapshot into a [`Draft`], mutates the draft and swaps it in
//! under a new version, so readers never observe a partial write.

use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::entities::{BlockConfiguration, CategoryOption, EntryKey, StaticPostEntry};
use crate::domain::selection::normalize_selection;
use crate::domain::types::BlockType;
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "application::store";

/// Monotonic version stamp of a committed snapshot.
pub type Version = u64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("attribute store changed since version {expected} (now {actual})")]
    VersionConflict { expected: Version, actual: Version },
}

/// Committed state: configuration plus the session keys of its static entries.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: Version,
    pub config: Arc<BlockConfiguration>,
    entry_keys: Arc<Vec<EntryKey>>,
}

impl Snapshot {
    fn initial(mut config: BlockConfiguration) -> Self {
        let stored = config.posts_cat.len();
        config.posts_cat = normalize_selection(config.posts_cat);
        if config.posts_cat.len() != stored {
            warn!(
                stored,
                kept = config.posts_cat.len(),
                "loaded category selection mixed \"all\" with real categories; dropped \"all\""
            );
        }
        let entry_keys = config.static_posts.iter().map(|_| EntryKey::new()).collect();
        Self {
            version: 0,
            config: Arc::new(config),
            entry_keys: Arc::new(entry_keys),
        }
    }

    pub fn entry_keys(&self) -> &[EntryKey] {
        &self.entry_keys
    }
}

/// Mutable copy of a snapshot. Static entries and their keys move together.
#[derive(Debug)]
pub struct Draft {
    base: Version,
    config: BlockConfiguration,
    entry_keys: Vec<EntryKey>,
}

impl Draft {
    fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            base: snapshot.version,
            config: BlockConfiguration::clone(&snapshot.config),
            entry_keys: Vec::clone(&snapshot.entry_keys),
        }
    }

    fn commit(self, version: Version) -> Snapshot {
        Snapshot {
            version,
            config: Arc::new(self.config),
            entry_keys: Arc::new(self.entry_keys),
        }
    }

    /// Version of the snapshot this draft was copied from.
    pub fn base_version(&self) -> Version {
        self.base
    }

    pub fn config(&self) -> &BlockConfiguration {
        &self.config
    }

    pub fn set_block_type(&mut self, block_type: BlockType) {
        self.config.block_type = block_type;
    }

    pub fn set_posts_cat(&mut self, selection: Vec<CategoryOption>) {
        self.config.posts_cat = selection;
    }

    pub fn entry_count(&self) -> usize {
        self.config.static_posts.len()
    }

    pub fn push_entry(&mut self, entry: StaticPostEntry) -> EntryKey {
        let key = EntryKey::new();
        self.config.static_posts.push(entry);
        self.entry_keys.push(key);
        key
    }

    pub fn remove_entry(&mut self, index: usize) -> Option<(EntryKey, StaticPostEntry)> {
        if index >= self.entry_count() {
            return None;
        }
        let entry = self.config.static_posts.remove(index);
        let key = self.entry_keys.remove(index);
        Some((key, entry))
    }

    pub fn entry_mut(&mut self, index: usize) -> Option<&mut StaticPostEntry> {
        self.config.static_posts.get_mut(index)
    }

    pub fn position_of(&self, key: EntryKey) -> Option<usize> {
        self.entry_keys.iter().position(|candidate| *candidate == key)
    }
}

/// Single source of truth for one block instance.
#[derive(Debug)]
pub struct AttributeStore {
    state: RwLock<Snapshot>,
}

impl AttributeStore {
    pub fn new(config: BlockConfiguration) -> Self {
        Self {
            state: RwLock::new(Snapshot::initial(config)),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        rw_read(&self.state, SOURCE, "snapshot").clone()
    }

    pub fn config(&self) -> Arc<BlockConfiguration> {
        Arc::clone(&rw_read(&self.state, SOURCE, "config").config)
    }

    pub fn version(&self) -> Version {
        rw_read(&self.state, SOURCE, "version").version
    }

    /// Apply `f` to a draft of the current snapshot and commit it.
    pub fn update<R>(&self, op: &'static str, f: impl FnOnce(&mut Draft) -> R) -> R {
        let Ok(value) = self.try_update::<R, Infallible>(op, |draft| Ok(f(draft)));
        value
    }

    /// Apply `f` to a draft and commit only if it returns `Ok`.
    pub fn try_update<R, E>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Draft) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut guard = rw_write(&self.state, SOURCE, op);
        let mut draft = Draft::from_snapshot(&guard);
        let value = f(&mut draft)?;
        let version = draft.base + 1;
        *guard = draft.commit(version);
        debug!(op, version, "attribute store committed");
        Ok(value)
    }

    /// Like [`AttributeStore::update`], but fails when the store moved past
    /// `expected` since the caller read it.
    pub fn update_if<R>(
        &self,
        expected: Version,
        op: &'static str,
        f: impl FnOnce(&mut Draft) -> R,
    ) -> Result<R, StoreError> {
        self.try_update(op, |draft| {
            let actual = draft.base_version();
            if actual != expected {
                return Err(StoreError::VersionConflict { expected, actual });
            }
            Ok(f(draft))
        })
    }

    /// Replace the whole configuration, re-keying its static entries.
    pub fn replace(&self, config: BlockConfiguration) -> Version {
        let mut guard = rw_write(&self.state, SOURCE, "replace");
        let mut snapshot = Snapshot::initial(config);
        snapshot.version = guard.version + 1;
        *guard = snapshot;
        guard.version
    }
}

//! Ordered list of curated entries for the static branch.
//!
//! Positional operations reject out-of-range indices. Media selection is
//! asynchronous, so it goes through a [`MediaTicket`] that remembers which
//! entry it was opened for and follows that entry if its index shifts.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::application::store::AttributeStore;
use crate::domain::entities::{EntryKey, MediaAttachment, StaticPostEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StaticListError {
    #[error("static entry index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("static entry {key} was removed before media selection completed")]
    EntryRemoved { key: EntryKey },
}

/// Handle for a pending media selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaTicket {
    key: EntryKey,
    opened_at: usize,
}

impl MediaTicket {
    /// Index of the entry when the selection was opened.
    pub fn opened_at(&self) -> usize {
        self.opened_at
    }
}

#[derive(Debug, Clone)]
pub struct StaticListManager {
    store: Arc<AttributeStore>,
}

impl StaticListManager {
    pub fn new(store: Arc<AttributeStore>) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> Vec<StaticPostEntry> {
        self.store.config().static_posts.clone()
    }

    pub fn len(&self) -> usize {
        self.store.config().static_posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the entry at `index` still needs an image.
    pub fn needs_media(&self, index: usize) -> Result<bool, StaticListError> {
        let config = self.store.config();
        config
            .static_posts
            .get(index)
            .map(|entry| !entry.has_media())
            .ok_or(StaticListError::IndexOutOfRange {
                index,
                len: config.static_posts.len(),
            })
    }

    /// Append an empty entry and return its new index.
    pub fn add_entry(&self) -> usize {
        let index = self.store.update("add_entry", |draft| {
            draft.push_entry(StaticPostEntry::empty());
            draft.entry_count() - 1
        });
        info!(index, "static entry added");
        index
    }

    /// Overwrite the entry at `index` with the attachment's fields.
    pub fn bind_media(&self, index: usize, attachment: &MediaAttachment) -> Result<(), StaticListError> {
        self.store.try_update("bind_media", |draft| {
            let len = draft.entry_count();
            let entry = draft
                .entry_mut(index)
                .ok_or(StaticListError::IndexOutOfRange { index, len })?;
            entry.bind(attachment);
            Ok(())
        })?;
        info!(index, media_id = attachment.id, "media bound to static entry");
        Ok(())
    }

    /// Delete the entry at `index`; later entries shift down by one.
    pub fn remove_entry(&self, index: usize) -> Result<StaticPostEntry, StaticListError> {
        let (key, entry) = self.store.try_update("remove_entry", |draft| {
            let len = draft.entry_count();
            draft
                .remove_entry(index)
                .ok_or(StaticListError::IndexOutOfRange { index, len })
        })?;
        info!(index, %key, "static entry removed");
        Ok(entry)
    }

    /// Open a media selection for the entry currently at `index`.
    pub fn begin_media_selection(&self, index: usize) -> Result<MediaTicket, StaticListError> {
        let snapshot = self.store.snapshot();
        let key = snapshot
            .entry_keys()
            .get(index)
            .copied()
            .ok_or(StaticListError::IndexOutOfRange {
                index,
                len: snapshot.entry_keys().len(),
            })?;
        Ok(MediaTicket {
            key,
            opened_at: index,
        })
    }

    /// Apply the collaborator's attachment to the entry the ticket was opened
    /// for, wherever it sits now. Returns the index that was written.
    pub fn complete_media_selection(
        &self,
        ticket: MediaTicket,
        attachment: &MediaAttachment,
    ) -> Result<usize, StaticListError> {
        let result = self.store.try_update("complete_media_selection", |draft| {
            let index = draft
                .position_of(ticket.key)
                .ok_or(StaticListError::EntryRemoved { key: ticket.key })?;
            if let Some(entry) = draft.entry_mut(index) {
                entry.bind(attachment);
            }
            Ok(index)
        });

        match &result {
            Ok(index) if *index != ticket.opened_at => info!(
                opened_at = ticket.opened_at,
                index,
                media_id = attachment.id,
                "media bound to shifted static entry"
            ),
            Ok(index) => info!(index, media_id = attachment.id, "media bound to static entry"),
            Err(err) => warn!(error = %err, media_id = attachment.id, "discarding media selection"),
        }
        result
    }
}

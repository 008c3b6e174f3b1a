//! Selection change events.
//!
//! The category selector publishes one event per reduced selection; the
//! session drains the queue and hands the newest selection to the preview
//! fetcher.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::CategoryOption;
use crate::util::lock::mutex_lock;

const SOURCE: &str = "application::events";

/// Monotonic sequence number of a published event.
pub type Epoch = u64;

#[derive(Debug, Clone)]
pub struct SelectionChanged {
    pub id: Uuid,
    pub epoch: Epoch,
    pub selection: Vec<CategoryOption>,
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct SelectionEvents {
    queue: Mutex<VecDeque<SelectionChanged>>,
    epoch_counter: AtomicU64,
}

impl SelectionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub fn publish(&self, selection: Vec<CategoryOption>) -> Epoch {
        let event = SelectionChanged {
            id: Uuid::new_v4(),
            epoch: self.next_epoch(),
            selection,
            timestamp: OffsetDateTime::now_utc(),
        };

        info!(
            event_id = %event.id,
            event_epoch = event.epoch,
            selected = event.selection.len(),
            "Selection change enqueued"
        );

        let epoch = event.epoch;
        mutex_lock(&self.queue, SOURCE, "publish").push_back(event);
        epoch
    }

    /// Drain every pending event, oldest first.
    pub fn drain(&self) -> Vec<SelectionChanged> {
        mutex_lock(&self.queue, SOURCE, "drain").drain(..).collect()
    }

    /// Drain the queue and keep only the newest event.
    pub fn drain_latest(&self) -> Option<SelectionChanged> {
        let mut drained = self.drain();
        let latest = drained.pop()?;
        if !drained.is_empty() {
            info!(
                event_epoch = latest.epoch,
                superseded = drained.len(),
                "Coalesced selection changes"
            );
        }
        Some(latest)
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CategoryValue;

    #[test]
    fn epochs_increase_per_publish() {
        let events = SelectionEvents::new();
        let first = events.publish(Vec::new());
        let second = events.publish(vec![CategoryOption::all()]);
        assert!(second > first);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn drain_latest_keeps_newest_selection() {
        let events = SelectionEvents::new();
        events.publish(vec![CategoryOption::all()]);
        events.publish(vec![CategoryOption::new(CategoryValue::Id(3), "Three")]);

        let latest = events.drain_latest().expect("event");
        assert_eq!(latest.selection[0].value, CategoryValue::Id(3));
        assert!(events.is_empty());
        assert!(events.drain_latest().is_none());
    }
}

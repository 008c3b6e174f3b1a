//! Editing session for one block instance.
//!
//! Wires the store, the two branch managers and the fetcher together, and
//! turns published selection changes into preview fetches.

use std::sync::Arc;

use postblock_api_types::CategoryRecord;
use tracing::{debug, info};

use crate::application::categories::CategorySelector;
use crate::application::error::AppError;
use crate::application::events::SelectionEvents;
use crate::application::fetcher::{FetchOutcome, PreviewState, RemoteDataFetcher};
use crate::application::mode::ModeController;
use crate::application::repos::ContentSource;
use crate::application::static_list::{MediaTicket, StaticListError, StaticListManager};
use crate::application::store::AttributeStore;
use crate::domain::entities::{
    BlockConfiguration, CategoryOption, CategoryValue, PreviewPost, StaticPostEntry,
};
use crate::domain::selection::relabel;
use crate::domain::types::BlockType;

/// What the editor shows for the current mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivePanel {
    Static {
        entries: Vec<StaticPostEntry>,
    },
    Dynamic {
        options: Vec<CategoryOption>,
        selection: Vec<CategoryOption>,
        preview: Vec<PreviewPost>,
    },
}

pub struct EditorSession {
    store: Arc<AttributeStore>,
    events: Arc<SelectionEvents>,
    mode: ModeController,
    static_list: StaticListManager,
    categories: CategorySelector,
    fetcher: RemoteDataFetcher,
}

impl EditorSession {
    pub fn new(source: Arc<dyn ContentSource>, config: BlockConfiguration) -> Self {
        let store = Arc::new(AttributeStore::new(config));
        let events = Arc::new(SelectionEvents::new());
        Self {
            mode: ModeController::new(Arc::clone(&store)),
            static_list: StaticListManager::new(Arc::clone(&store)),
            categories: CategorySelector::new(Arc::clone(&store), Arc::clone(&events)),
            fetcher: RemoteDataFetcher::new(source),
            store,
            events,
        }
    }

    /// Load the category catalog and the preview for the stored selection.
    /// Neither failure aborts the session.
    pub async fn initialize(&self) -> FetchOutcome {
        self.load_catalog().await;
        info!(
            mode = %self.mode.mode(),
            entries = self.static_list.len(),
            "editor session initialized"
        );
        self.fetcher.fetch_posts(&self.categories.selection()).await
    }

    /// Build the category options from the catalog, which is requested from
    /// the source at most once per session, and take the stored selection's
    /// labels from it.
    pub async fn load_catalog(&self) -> Vec<CategoryOption> {
        let catalog = self.fetcher.fetch_categories().await;
        self.categories.set_catalog(&catalog);

        let options = self.categories.options();
        let stored = self.categories.selection();
        let labelled = relabel(&stored, &options);
        if labelled != stored {
            self.store
                .update("relabel_categories", |draft| draft.set_posts_cat(labelled));
        }
        options
    }

    pub fn configuration(&self) -> BlockConfiguration {
        BlockConfiguration::clone(&self.store.config())
    }

    pub fn mode(&self) -> BlockType {
        self.mode.mode()
    }

    pub fn set_mode(&self, mode: BlockType) {
        self.mode.set_mode(mode);
    }

    pub fn set_mode_tag(&self, tag: &str) -> BlockType {
        self.mode.set_mode_tag(tag)
    }

    pub fn active_panel(&self) -> ActivePanel {
        match self.mode.mode() {
            BlockType::Static => ActivePanel::Static {
                entries: self.static_list.entries(),
            },
            BlockType::Dynamic => ActivePanel::Dynamic {
                options: self.categories.options(),
                selection: self.categories.selection(),
                preview: self.fetcher.preview().posts,
            },
        }
    }

    pub fn add_entry(&self) -> usize {
        self.static_list.add_entry()
    }

    pub fn remove_entry(&self, index: usize) -> Result<StaticPostEntry, StaticListError> {
        self.static_list.remove_entry(index)
    }

    pub fn begin_media_selection(&self, index: usize) -> Result<MediaTicket, StaticListError> {
        self.static_list.begin_media_selection(index)
    }

    pub fn categories(&self) -> &CategorySelector {
        &self.categories
    }

    pub fn catalog(&self) -> Vec<CategoryRecord> {
        self.fetcher.catalog()
    }

    pub fn select_category(&self, value: CategoryValue) -> Vec<CategoryOption> {
        self.categories.select(value)
    }

    pub fn deselect_category(&self, value: CategoryValue) -> Vec<CategoryOption> {
        self.categories.deselect(value)
    }

    pub fn clear_categories(&self) -> Vec<CategoryOption> {
        self.categories.clear()
    }

    /// Handle pending selection changes. Only the newest selection is
    /// fetched; `None` when nothing changed.
    pub async fn dispatch_selection_changes(&self) -> Option<FetchOutcome> {
        let event = self.events.drain_latest()?;
        debug!(event_epoch = event.epoch, "dispatching selection change");
        Some(self.fetcher.fetch_posts(&event.selection).await)
    }

    pub fn preview(&self) -> PreviewState {
        self.fetcher.preview()
    }

    /// Resolve an attachment and bind it to the entry the ticket was opened for.
    pub async fn select_media(&self, ticket: MediaTicket, media_id: u64) -> Result<usize, AppError> {
        let attachment = self.fetcher.fetch_media(media_id).await?;
        Ok(self.static_list.complete_media_selection(ticket, &attachment)?)
    }
}

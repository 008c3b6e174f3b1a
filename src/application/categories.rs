//! Category multi-select for the dynamic branch.

use std::sync::{Arc, RwLock};

use postblock_api_types::CategoryRecord;
use tracing::info;

use crate::application::events::SelectionEvents;
use crate::application::store::AttributeStore;
use crate::domain::entities::{CategoryOption, CategoryValue};
use crate::domain::selection::{SelectionAction, option_for, reduce_selection};
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "application::categories";

#[derive(Debug)]
pub struct CategorySelector {
    store: Arc<AttributeStore>,
    events: Arc<SelectionEvents>,
    options: RwLock<Vec<CategoryOption>>,
}

impl CategorySelector {
    pub fn new(store: Arc<AttributeStore>, events: Arc<SelectionEvents>) -> Self {
        Self {
            store,
            events,
            options: RwLock::new(vec![CategoryOption::all()]),
        }
    }

    /// Rebuild the option list: "all" first, then the catalog in its order.
    pub fn set_catalog(&self, catalog: &[CategoryRecord]) {
        let options: Vec<CategoryOption> = std::iter::once(CategoryOption::all())
            .chain(catalog.iter().map(CategoryOption::from))
            .collect();
        info!(count = options.len(), "category options rebuilt");
        *rw_write(&self.options, SOURCE, "set_catalog") = options;
    }

    pub fn options(&self) -> Vec<CategoryOption> {
        rw_read(&self.options, SOURCE, "options").clone()
    }

    pub fn option(&self, value: CategoryValue) -> CategoryOption {
        option_for(value, &rw_read(&self.options, SOURCE, "option"))
    }

    pub fn selection(&self) -> Vec<CategoryOption> {
        self.store.config().posts_cat.clone()
    }

    /// Reduce the widget's change event, store the result in `posts_cat`,
    /// and publish it for the preview fetcher.
    pub fn apply(&self, candidate: Vec<CategoryOption>, action: &SelectionAction) -> Vec<CategoryOption> {
        let selection = reduce_selection(candidate, action);
        self.store.update("select_categories", |draft| {
            draft.set_posts_cat(selection.clone());
        });
        let epoch = self.events.publish(selection.clone());
        info!(epoch, selected = selection.len(), "category selection applied");
        selection
    }

    /// Select `value` on top of the stored selection, as the widget would.
    pub fn select(&self, value: CategoryValue) -> Vec<CategoryOption> {
        let option = self.option(value);
        let mut candidate = self.selection();
        if !candidate.iter().any(|selected| selected.value == value) {
            candidate.push(option.clone());
        }
        self.apply(candidate, &SelectionAction::Select(option))
    }

    /// Deselect `value` from the stored selection, as the widget would.
    pub fn deselect(&self, value: CategoryValue) -> Vec<CategoryOption> {
        let option = self.option(value);
        let candidate = self
            .selection()
            .into_iter()
            .filter(|selected| selected.value != value)
            .collect();
        self.apply(candidate, &SelectionAction::Deselect(option))
    }

    pub fn clear(&self) -> Vec<CategoryOption> {
        self.apply(Vec::new(), &SelectionAction::Clear)
    }
}

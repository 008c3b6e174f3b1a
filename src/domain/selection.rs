//! Category selection reducer with "all categories" exclusivity.
//!
//! A reduced selection is either exactly the "all" option or a list of real
//! categories; the two never coexist.

use crate::domain::entities::{CategoryOption, CategoryValue};

/// Event emitted by the multi-select alongside its candidate selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    Select(CategoryOption),
    Deselect(CategoryOption),
    /// "Clear all" affordance of the multi-select.
    Clear,
}

impl SelectionAction {
    fn selects_all(&self) -> bool {
        matches!(self, SelectionAction::Select(option) if option.is_all())
    }
}

/// Reduce the widget's candidate selection according to the triggering action.
///
/// Selecting "all" discards every other value. Any other action drops "all"
/// from the candidate. Deselecting the last real category yields an empty
/// selection rather than falling back to "all".
pub fn reduce_selection(
    candidate: Vec<CategoryOption>,
    action: &SelectionAction,
) -> Vec<CategoryOption> {
    if action.selects_all() {
        let all = candidate
            .into_iter()
            .find(CategoryOption::is_all)
            .unwrap_or_else(CategoryOption::all);
        return vec![all];
    }

    candidate
        .into_iter()
        .filter(|option| !option.is_all())
        .collect()
}

/// Comma-joined category ids used to filter the post listing, or `None` when
/// the listing is unfiltered (empty selection or "all").
pub fn category_filter(selection: &[CategoryOption]) -> Option<String> {
    let ids: Vec<String> = selection
        .iter()
        .filter_map(|option| option.value.id())
        .map(|id| id.to_string())
        .collect();

    if ids.is_empty() || selection.iter().any(CategoryOption::is_all) {
        return None;
    }
    Some(ids.join(","))
}

/// Bring a stored selection back under the exclusivity invariant. Real
/// categories win over "all", as when the widget selects a category while
/// "all" is active.
pub fn normalize_selection(selection: Vec<CategoryOption>) -> Vec<CategoryOption> {
    if is_well_formed(&selection) {
        return selection;
    }
    selection.into_iter().filter(|option| !option.is_all()).collect()
}

/// Whether `selection` respects the exclusivity invariant.
pub fn is_well_formed(selection: &[CategoryOption]) -> bool {
    let has_all = selection.iter().any(CategoryOption::is_all);
    !has_all || selection.len() == 1
}

/// Replace each selected value's label with the catalog label when known.
pub fn relabel(selection: &[CategoryOption], options: &[CategoryOption]) -> Vec<CategoryOption> {
    selection
        .iter()
        .map(|selected| {
            options
                .iter()
                .find(|option| option.value == selected.value)
                .cloned()
                .unwrap_or_else(|| selected.clone())
        })
        .collect()
}

/// Look up an option by value, synthesizing one when the catalog lacks it.
pub fn option_for(value: CategoryValue, options: &[CategoryOption]) -> CategoryOption {
    options
        .iter()
        .find(|option| option.value == value)
        .cloned()
        .unwrap_or_else(|| match value {
            CategoryValue::All => CategoryOption::all(),
            CategoryValue::Id(id) => CategoryOption::new(value, id.to_string()),
        })
}

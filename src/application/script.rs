//! Textual editor actions, as accepted by the `edit` command.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::application::error::AppError;
use crate::application::fetcher::FetchOutcome;
use crate::application::session::EditorSession;
use crate::domain::entities::CategoryValue;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Mode button; the raw tag goes through the static fallback.
    Mode(String),
    Add,
    Remove(usize),
    Bind { index: usize, media_id: u64 },
    Select(CategoryValue),
    Deselect(CategoryValue),
    Clear,
}

impl FromStr for EditAction {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.trim().splitn(3, ':');
        let verb = parts.next().unwrap_or_default();
        let first = parts.next();
        let second = parts.next();

        let action = match (verb, first, second) {
            ("mode", Some(tag), None) => EditAction::Mode(tag.to_string()),
            ("add", None, None) => EditAction::Add,
            ("remove", Some(index), None) => EditAction::Remove(parse_index(index)?),
            ("bind", Some(index), Some(media_id)) => EditAction::Bind {
                index: parse_index(index)?,
                media_id: media_id.parse().map_err(|_| {
                    DomainError::validation(format!("invalid media id `{media_id}`"))
                })?,
            },
            ("select", Some(value), None) => EditAction::Select(value.parse()?),
            ("deselect", Some(value), None) => EditAction::Deselect(value.parse()?),
            ("clear", None, None) => EditAction::Clear,
            _ => {
                return Err(DomainError::validation(format!(
                    "unrecognized action `{raw}`"
                )));
            }
        };
        Ok(action)
    }
}

fn parse_index(raw: &str) -> Result<usize, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::validation(format!("invalid entry index `{raw}`")))
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditAction::Mode(tag) => write!(f, "mode:{tag}"),
            EditAction::Add => f.write_str("add"),
            EditAction::Remove(index) => write!(f, "remove:{index}"),
            EditAction::Bind { index, media_id } => write!(f, "bind:{index}:{media_id}"),
            EditAction::Select(value) => write!(f, "select:{value}"),
            EditAction::Deselect(value) => write!(f, "deselect:{value}"),
            EditAction::Clear => f.write_str("clear"),
        }
    }
}

/// Apply one action to the session. Selection changes refresh the preview
/// before returning; a failed refresh is logged, not returned.
pub async fn apply(session: &EditorSession, action: &EditAction) -> Result<(), AppError> {
    match action {
        EditAction::Mode(tag) => {
            session.set_mode_tag(tag);
        }
        EditAction::Add => {
            session.add_entry();
        }
        EditAction::Remove(index) => {
            session.remove_entry(*index)?;
        }
        EditAction::Bind { index, media_id } => {
            let ticket = session.begin_media_selection(*index)?;
            session.select_media(ticket, *media_id).await?;
        }
        EditAction::Select(value) => {
            session.select_category(*value);
        }
        EditAction::Deselect(value) => {
            session.deselect_category(*value);
        }
        EditAction::Clear => {
            session.clear_categories();
        }
    }

    if let Some(FetchOutcome::Failed { error, .. }) = session.dispatch_selection_changes().await {
        warn!(action = %action, error = %error, "preview kept stale after selection change");
    }
    Ok(())
}

//! Block attributes and the values that flow through the editor.

use std::fmt;
use std::str::FromStr;

use postblock_api_types::{CategoryRecord, MediaRecord, PostRecord};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::domain::{error::DomainError, types::BlockType};

/// Persisted value of the "all categories" option.
pub const ALL_CATEGORIES_VALUE: &str = "*";
/// Display label of the "all categories" option.
pub const ALL_CATEGORIES_LABEL: &str = "All";

/// Attributes persisted for one block instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockConfiguration {
    #[serde(default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub static_posts: Vec<StaticPostEntry>,
    #[serde(default)]
    pub posts_cat: Vec<CategoryOption>,
}

/// Curated entry of the static list. All fields stay empty until media is bound.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaticPostEntry {
    #[serde(rename = "mediaId", default, with = "media_id")]
    pub media_id: Option<u64>,
    #[serde(rename = "mediaURL", default)]
    pub media_url: String,
    #[serde(rename = "postText", default)]
    pub post_text: String,
    #[serde(rename = "postLink", default)]
    pub post_link: String,
}

impl StaticPostEntry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, attachment: &MediaAttachment) {
        self.media_id = Some(attachment.id);
        self.media_url.clone_from(&attachment.url);
        self.post_text.clone_from(&attachment.title);
        self.post_link.clone_from(&attachment.link);
    }

    pub fn has_media(&self) -> bool {
        self.media_id.is_some()
    }
}

/// `mediaId` is `""` while unbound and the attachment id once bound.
mod media_id {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Id(u64),
        Text(String),
        Null(()),
    }

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.serialize_u64(*id),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Id(id) => Ok(Some(id)),
            Raw::Null(()) => Ok(None),
            Raw::Text(text) if text.trim().is_empty() => Ok(None),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid media id `{text}`"))),
        }
    }
}

/// Attachment descriptor handed back by the media selection collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub id: u64,
    pub url: String,
    pub title: String,
    pub link: String,
}

impl From<MediaRecord> for MediaAttachment {
    fn from(record: MediaRecord) -> Self {
        Self {
            id: record.id,
            url: record.source_url,
            title: record.title.into_string(),
            link: record.link,
        }
    }
}

/// Value of a selectable category option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryValue {
    /// The synthetic "all categories" option.
    All,
    Id(u64),
}

impl CategoryValue {
    pub fn is_all(self) -> bool {
        matches!(self, CategoryValue::All)
    }

    pub fn id(self) -> Option<u64> {
        match self {
            CategoryValue::All => None,
            CategoryValue::Id(id) => Some(id),
        }
    }
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::All => f.write_str(ALL_CATEGORIES_VALUE),
            CategoryValue::Id(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for CategoryValue {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value == ALL_CATEGORIES_VALUE || value.eq_ignore_ascii_case("all") {
            return Ok(CategoryValue::All);
        }
        value
            .parse()
            .map(CategoryValue::Id)
            .map_err(|_| DomainError::validation(format!("invalid category value `{value}`")))
    }
}

impl Serialize for CategoryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CategoryValue::All => serializer.serialize_str(ALL_CATEGORIES_VALUE),
            CategoryValue::Id(id) => serializer.serialize_u64(*id),
        }
    }
}

impl<'de> Deserialize<'de> for CategoryValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Id(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Id(id) => Ok(CategoryValue::Id(id)),
            Raw::Text(text) => text
                .parse()
                .map_err(|err: DomainError| <D::Error as serde::de::Error>::custom(err)),
        }
    }
}

/// `{ value, label }` pair offered by the category multi-select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub value: CategoryValue,
    #[serde(default)]
    pub label: String,
}

impl CategoryOption {
    pub fn new(value: CategoryValue, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }

    pub fn all() -> Self {
        Self::new(CategoryValue::All, ALL_CATEGORIES_LABEL)
    }

    pub fn is_all(&self) -> bool {
        self.value.is_all()
    }
}

impl From<&CategoryRecord> for CategoryOption {
    fn from(record: &CategoryRecord) -> Self {
        Self::new(CategoryValue::Id(record.id), record.name.clone())
    }
}

/// Preview row shown under the dynamic settings. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewPost {
    pub id: u64,
    pub title: String,
}

impl From<PostRecord> for PreviewPost {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.into_string(),
        }
    }
}

/// Session-local identity of a static entry, stable across removals of its
/// neighbours. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryKey(Uuid);

impl EntryKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

//! Request and response shapes for the `wp/v2` REST endpoints read by the
//! post block editor core.
//!
//! Records only carry the fields the editor consumes; everything else the
//! server sends is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// Page size that disables server-side pagination on the post listing.
pub const UNBOUNDED_PAGE_SIZE: i64 = -1;

/// Media type accepted by the media selection collaborator.
pub const IMAGE_MEDIA_TYPE: &str = "image";

/// Entry of the category catalog (`GET wp/v2/categories`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: u64,
    pub name: String,
}

/// Text fields the REST API wraps as `{ "rendered": "..." }`.
///
/// Some proxies and fixtures flatten these to a plain string, so both forms
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderedText {
    Rendered { rendered: String },
    Plain(String),
}

impl RenderedText {
    pub fn as_str(&self) -> &str {
        match self {
            RenderedText::Rendered { rendered } => rendered,
            RenderedText::Plain(text) => text,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            RenderedText::Rendered { rendered } => rendered,
            RenderedText::Plain(text) => text,
        }
    }
}

impl Default for RenderedText {
    fn default() -> Self {
        RenderedText::Plain(String::new())
    }
}

/// Entry of the post listing (`GET wp/v2/posts`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: u64,
    #[serde(default)]
    pub title: RenderedText,
}

/// Media attachment (`GET wp/v2/media/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: u64,
    pub source_url: String,
    #[serde(default)]
    pub title: RenderedText,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl MediaRecord {
    /// Whether the attachment passes the image-only selection filter.
    ///
    /// Records without a `media_type` are accepted.
    pub fn is_image(&self) -> bool {
        self.media_type
            .as_deref()
            .is_none_or(|kind| kind == IMAGE_MEDIA_TYPE)
    }
}

/// Query string of the post listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostListQuery {
    pub posts_per_page: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
}

impl PostListQuery {
    /// Listing of every post, no category filter.
    pub fn unfiltered() -> Self {
        Self {
            posts_per_page: UNBOUNDED_PAGE_SIZE,
            categories: None,
        }
    }

    /// Listing restricted to a comma-joined list of category ids.
    pub fn with_categories(categories: impl Into<String>) -> Self {
        Self {
            posts_per_page: UNBOUNDED_PAGE_SIZE,
            categories: Some(categories.into()),
        }
    }

    /// Query pairs in the order they are appended to the request URL.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("posts_per_page", self.posts_per_page.to_string())];
        if let Some(categories) = &self.categories {
            pairs.push(("categories", categories.clone()));
        }
        pairs
    }
}

impl Default for PostListQuery {
    fn default() -> Self {
        Self::unfiltered()
    }
}

//! Content source trait describing the remote repository adapter.

use async_trait::async_trait;
use postblock_api_types::{CategoryRecord, MediaRecord, PostListQuery, PostRecord};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl SourceError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Read-only access to the remote content repository.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, SourceError>;

    async fn list_posts(&self, query: &PostListQuery) -> Result<Vec<PostRecord>, SourceError>;

    async fn get_media(&self, id: u64) -> Result<MediaRecord, SourceError>;
}

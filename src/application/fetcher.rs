//! Remote reads behind the dynamic branch: category catalog, preview posts,
//! and media lookups.
//!
//! Preview fetches are tagged with a generation number. Only the response of
//! the most recently issued fetch may replace the preview; anything older is
//! dropped when it resolves. Failures keep the last good preview.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use metrics::counter;
use postblock_api_types::{CategoryRecord, PostListQuery, PostRecord};
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::application::repos::{ContentSource, SourceError};
use crate::domain::entities::{CategoryOption, MediaAttachment, PreviewPost};
use crate::domain::selection::category_filter;
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "application::fetcher";

pub const FETCH_FAILURES_METRIC: &str = "postblock_fetch_failures_total";
pub const STALE_RESPONSES_METRIC: &str = "postblock_preview_stale_discarded_total";

/// Sequence number of a preview fetch.
pub type Generation = u64;

/// Preview list currently on display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    /// Generation of the fetch that produced `posts`; `0` before any success.
    pub generation: Generation,
    pub posts: Vec<PreviewPost>,
    pub fetched_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied {
        generation: Generation,
        count: usize,
    },
    /// A newer fetch was issued before this one resolved.
    Stale {
        generation: Generation,
        latest: Generation,
    },
    Failed {
        generation: Generation,
        error: SourceError,
    },
}

/// Post listing query for a reduced selection.
pub fn post_query(selection: &[CategoryOption]) -> PostListQuery {
    match category_filter(selection) {
        Some(categories) => PostListQuery::with_categories(categories),
        None => PostListQuery::unfiltered(),
    }
}

pub struct RemoteDataFetcher {
    source: Arc<dyn ContentSource>,
    catalog: RwLock<Vec<CategoryRecord>>,
    preview: RwLock<PreviewState>,
    issued: AtomicU64,
    catalog_requested: AtomicBool,
}

impl RemoteDataFetcher {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            catalog: RwLock::new(Vec::new()),
            preview: RwLock::new(PreviewState::default()),
            issued: AtomicU64::new(0),
            catalog_requested: AtomicBool::new(false),
        }
    }

    pub fn catalog(&self) -> Vec<CategoryRecord> {
        rw_read(&self.catalog, SOURCE, "catalog").clone()
    }

    pub fn preview(&self) -> PreviewState {
        rw_read(&self.preview, SOURCE, "preview").clone()
    }

    pub fn latest_generation(&self) -> Generation {
        self.issued.load(Ordering::SeqCst)
    }

    /// Load the category catalog. Only the first call reaches the source;
    /// later calls return what it produced. Failures are logged and leave the
    /// catalog empty; there is no retry.
    pub async fn fetch_categories(&self) -> Vec<CategoryRecord> {
        if self.catalog_requested.swap(true, Ordering::SeqCst) {
            debug!("category catalog already requested");
            return self.catalog();
        }

        match self.source.list_categories().await {
            Ok(records) => {
                info!(count = records.len(), "category catalog loaded");
                let mut catalog = rw_write(&self.catalog, SOURCE, "fetch_categories");
                catalog.clone_from(&records);
                records
            }
            Err(err) => {
                error!(error = %err, "failed to fetch categories");
                counter!(FETCH_FAILURES_METRIC, "endpoint" => "categories").increment(1);
                self.catalog()
            }
        }
    }

    /// Fetch the preview posts for `selection` under a fresh generation.
    pub async fn fetch_posts(&self, selection: &[CategoryOption]) -> FetchOutcome {
        let generation = self.issue();
        let query = post_query(selection);
        debug!(
            generation,
            categories = query.categories.as_deref().unwrap_or("*"),
            "fetching preview posts"
        );
        let result = self.source.list_posts(&query).await;
        self.complete(generation, result)
    }

    fn issue(&self) -> Generation {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn complete(
        &self,
        generation: Generation,
        result: Result<Vec<PostRecord>, SourceError>,
    ) -> FetchOutcome {
        let mut preview = rw_write(&self.preview, SOURCE, "complete");
        let latest = self.latest_generation();
        if generation != latest {
            debug!(generation, latest, "discarding stale preview response");
            counter!(STALE_RESPONSES_METRIC).increment(1);
            return FetchOutcome::Stale { generation, latest };
        }

        match result {
            Ok(records) => {
                let posts: Vec<PreviewPost> = records.into_iter().map(PreviewPost::from).collect();
                let count = posts.len();
                *preview = PreviewState {
                    generation,
                    posts,
                    fetched_at: Some(OffsetDateTime::now_utc()),
                };
                info!(generation, count, "preview posts updated");
                FetchOutcome::Applied { generation, count }
            }
            Err(err) => {
                error!(generation, error = %err, "failed to fetch preview posts");
                counter!(FETCH_FAILURES_METRIC, "endpoint" => "posts").increment(1);
                FetchOutcome::Failed {
                    generation,
                    error: err,
                }
            }
        }
    }

    /// Resolve an attachment for the media selection collaborator. Only
    /// images are accepted.
    pub async fn fetch_media(&self, id: u64) -> Result<MediaAttachment, SourceError> {
        let record = self.source.get_media(id).await.inspect_err(|err| {
            error!(media_id = id, error = %err, "failed to fetch media");
            counter!(FETCH_FAILURES_METRIC, "endpoint" => "media").increment(1);
        })?;

        if !record.is_image() {
            warn!(
                media_id = id,
                media_type = record.media_type.as_deref().unwrap_or_default(),
                "rejecting non-image attachment"
            );
            return Err(SourceError::invalid_input(format!(
                "media {id} is not an image"
            )));
        }
        Ok(MediaAttachment::from(record))
    }
}

//! In-memory content sources for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use postblock_api_types::{CategoryRecord, MediaRecord, PostListQuery, PostRecord, RenderedText};
use tokio::sync::oneshot;

use crate::application::repos::{ContentSource, SourceError};

pub(crate) fn post(id: u64, title: &str) -> PostRecord {
    PostRecord {
        id,
        title: RenderedText::Rendered {
            rendered: title.to_string(),
        },
    }
}

pub(crate) fn category(id: u64, name: &str) -> CategoryRecord {
    CategoryRecord {
        id,
        name: name.to_string(),
    }
}

fn server_error() -> SourceError {
    SourceError::Status {
        status: 500,
        body: "boom".into(),
    }
}

/// Answers immediately from canned data and records the queries it saw.
#[derive(Default)]
pub(crate) struct FakeSource {
    categories: Mutex<Vec<CategoryRecord>>,
    categories_fail: AtomicBool,
    category_calls: AtomicUsize,
    posts: Mutex<HashMap<Option<String>, Vec<PostRecord>>>,
    posts_fail: AtomicBool,
    post_queries: Mutex<Vec<PostListQuery>>,
    media: Mutex<HashMap<u64, MediaRecord>>,
}

impl FakeSource {
    pub(crate) fn with_categories(self, records: Vec<CategoryRecord>) -> Self {
        *self.categories.lock().expect("categories lock") = records;
        self
    }

    pub(crate) fn failing_categories(self) -> Self {
        self.categories_fail.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_posts(self, categories: Option<&str>, records: Vec<PostRecord>) -> Self {
        self.posts
            .lock()
            .expect("posts lock")
            .insert(categories.map(str::to_string), records);
        self
    }

    pub(crate) fn with_media(self, id: u64, media_type: Option<&str>) -> Self {
        let record = MediaRecord {
            id,
            source_url: format!("https://cdn.example/{id}.jpg"),
            title: RenderedText::Rendered {
                rendered: format!("media {id}"),
            },
            link: format!("https://example.com/?attachment_id={id}"),
            media_type: media_type.map(str::to_string),
        };
        self.media.lock().expect("media lock").insert(id, record);
        self
    }

    pub(crate) fn fail_posts(&self) {
        self.posts_fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn category_calls(&self) -> usize {
        self.category_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn post_queries(&self) -> Vec<PostListQuery> {
        self.post_queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, SourceError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        if self.categories_fail.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.categories.lock().expect("categories lock").clone())
    }

    async fn list_posts(&self, query: &PostListQuery) -> Result<Vec<PostRecord>, SourceError> {
        self.post_queries
            .lock()
            .expect("queries lock")
            .push(query.clone());
        if self.posts_fail.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self
            .posts
            .lock()
            .expect("posts lock")
            .get(&query.categories)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_media(&self, id: u64) -> Result<MediaRecord, SourceError> {
        self.media
            .lock()
            .expect("media lock")
            .get(&id)
            .cloned()
            .ok_or(SourceError::NotFound)
    }
}

type PostsReply = Result<Vec<PostRecord>, SourceError>;

/// Holds each post listing open until the test releases it, so responses can
/// resolve in any order.
#[derive(Default)]
pub(crate) struct GatedSource {
    gates: Mutex<HashMap<Option<String>, oneshot::Receiver<PostsReply>>>,
    arrived: AtomicUsize,
}

impl GatedSource {
    pub(crate) fn gate(&self, categories: Option<&str>) -> oneshot::Sender<PostsReply> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .expect("gates lock")
            .insert(categories.map(str::to_string), rx);
        tx
    }

    pub(crate) async fn wait_for_requests(&self, count: usize) {
        while self.arrived.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ContentSource for GatedSource {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, SourceError> {
        Ok(Vec::new())
    }

    async fn list_posts(&self, query: &PostListQuery) -> Result<Vec<PostRecord>, SourceError> {
        let gate = self
            .gates
            .lock()
            .expect("gates lock")
            .remove(&query.categories);
        self.arrived.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx.await.map_err(SourceError::transport)?,
            None => Err(SourceError::NotFound),
        }
    }

    async fn get_media(&self, _id: u64) -> Result<MediaRecord, SourceError> {
        Err(SourceError::NotFound)
    }
}

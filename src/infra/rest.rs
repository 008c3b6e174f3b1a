//! `wp/v2` REST adapter for [`ContentSource`].

use async_trait::async_trait;
use postblock_api_types::{CategoryRecord, MediaRecord, PostListQuery, PostRecord};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::repos::{ContentSource, SourceError};
use crate::config::{Credentials, RemoteSettings};

const CATEGORIES_PATH: &str = "wp/v2/categories";
const POSTS_PATH: &str = "wp/v2/posts";
const MEDIA_PATH: &str = "wp/v2/media";

#[derive(Clone, Debug)]
pub struct RestContentSource {
    client: Client,
    base: Url,
    credentials: Option<Credentials>,
}

impl RestContentSource {
    pub fn new(settings: &RemoteSettings) -> Result<Self, SourceError> {
        let base = settings
            .base_url
            .clone()
            .ok_or_else(|| SourceError::invalid_input("remote base URL is not configured"))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(SourceError::transport)?;
        Ok(Self {
            client,
            base: directory_url(base),
            credentials: settings.credentials.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("postblock/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, SourceError> {
        self.base
            .join(path)
            .map_err(|err| SourceError::invalid_input(format!("invalid path `{path}`: {err}")))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => req.basic_auth(&creds.username, Some(&creds.application_password)),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&[(&str, String)]>,
    ) -> Result<T, SourceError> {
        let mut url = self.url(path)?;
        if let Some(q) = query {
            url.set_query(None);
            let mut qp = url.query_pairs_mut();
            for (k, v) in q {
                qp.append_pair(k, v);
            }
        }

        debug!(url = %url, "remote GET");
        let resp = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(SourceError::transport)?;
        Self::handle(resp).await
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, SourceError> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(SourceError::transport)?;
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(SourceError::decode)
    }
}

/// Make sure relative joins append to the base path instead of replacing its
/// last segment (`/wp-json` + `wp/v2/posts`).
fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl ContentSource for RestContentSource {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, SourceError> {
        self.get(CATEGORIES_PATH, None).await
    }

    async fn list_posts(&self, query: &PostListQuery) -> Result<Vec<PostRecord>, SourceError> {
        let pairs = query.to_pairs();
        self.get(POSTS_PATH, Some(&pairs)).await
    }

    async fn get_media(&self, id: u64) -> Result<MediaRecord, SourceError> {
        let path = format!("{MEDIA_PATH}/{id}");
        self.get(&path, None).await
    }
}

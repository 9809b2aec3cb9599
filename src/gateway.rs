//! Remote archive access that degrades to the local snapshot.
//!
//! Every call first waits for a configured delay, then tries the remote
//! service. Transport failures and unsuccessful statuses are never reported:
//! the answer comes from the [`FallbackStore`] instead. The only error a
//! caller can see is an article missing from both sources.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::{
    article::{Article, ArticleId, Draft},
    store::FallbackStore,
};

/// Delays applied before each remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Latency {
    /// Before listing, in milliseconds.
    pub list_ms: u64,
    /// Before fetching one article, in milliseconds.
    pub get_ms: u64,
    /// Before creating an article, in milliseconds.
    pub create_ms: u64,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list_ms: 600,
            get_ms: 400,
            create_ms: 1000,
        }
    }
}

impl Latency {
    /// No delay at all.
    pub const NONE: Self = Self {
        list_ms: 0,
        get_ms: 0,
        create_ms: 0,
    };
}

/// Why a remote call was abandoned in favour of the local snapshot.
#[derive(Debug, Error)]
pub enum TransportFailure {
    /// The request could not be sent or its body could not be decoded.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service answered with an unsuccessful status.
    #[error("Remote answered {0}")]
    Status(StatusCode),
}

/// Errors surfaced by [`Gateway::get_article`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FailToGetArticle {
    /// Neither the remote service nor the local snapshot knows the id.
    #[error("Entry `{0}` is missing from the archives")]
    NotFound(ArticleId),
}

/// List, read and create articles against the remote archive.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base: Url,
    latency: Latency,
    store: FallbackStore,
}

impl Gateway {
    /// Gateway talking to the archive at `base`.
    #[must_use]
    pub fn new(base: Url, store: FallbackStore) -> Self {
        Self {
            client: Client::new(),
            base,
            latency: Latency::default(),
            store,
        }
    }

    /// Replace the simulated latency.
    #[must_use]
    pub const fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    /// Replace the HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Base URL of the remote archive.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// The local snapshot used as fallback.
    #[must_use]
    pub const fn store(&self) -> &FallbackStore {
        &self.store
    }

    /// All articles, from the remote archive or else the local snapshot.
    pub async fn list_articles(&self) -> Vec<Article> {
        sleep(Duration::from_millis(self.latency.list_ms)).await;
        match self.fetch(self.endpoint(&[])).await {
            Ok(articles) => {
                debug!("Listed articles from {}", self.base);
                articles
            }
            Err(err) => {
                warn!("Remote archive unavailable, using local snapshot: {err}");
                self.store.load()
            }
        }
    }

    /// One article by id, from the remote archive or else the local snapshot.
    ///
    /// # Errors
    /// Returns [`FailToGetArticle::NotFound`] if neither source has the article.
    pub async fn get_article(&self, id: &ArticleId) -> Result<Article, FailToGetArticle> {
        sleep(Duration::from_millis(self.latency.get_ms)).await;
        let text = id.as_text();
        match self.fetch(self.endpoint(&[text.as_ref()])).await {
            Ok(article) => {
                debug!("Fetched article {id} from {}", self.base);
                Ok(article)
            }
            Err(err) => {
                warn!("Remote lookup of {id} failed, searching local snapshot: {err}");
                self.store
                    .find(id)
                    .ok_or_else(|| FailToGetArticle::NotFound(id.clone()))
            }
        }
    }

    /// Publish a draft.
    ///
    /// The article is returned even if the remote archive rejects it, in
    /// which case it is put in front of the local snapshot.
    pub async fn create_article(&self, draft: Draft) -> Article {
        let article = Article::from_draft(draft, self.next_id());
        sleep(Duration::from_millis(self.latency.create_ms)).await;

        match self.post(&article).await {
            Ok(created) => {
                debug!("Created article {} on {}", created.id, self.base);
                created
            }
            Err(err) => {
                warn!("Upload failed, keeping {} locally: {err}", article.id);
                self.store.prepend(article.clone());
                article
            }
        }
    }

    fn next_id(&self) -> ArticleId {
        self.id_at(OffsetDateTime::now_utc())
    }

    // Timestamp ids collide when two entries are created within the same millisecond.
    fn id_at(&self, at: OffsetDateTime) -> ArticleId {
        let snapshot = self.store.stored();
        let mut id = ArticleId::from_timestamp(at);
        while snapshot.iter().any(|article| article.id == id) {
            match id.successor() {
                Some(next) => id = next,
                None => break,
            }
        }
        id
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        match url.path_segments_mut() {
            Ok(mut path) => {
                path.pop_if_empty().push("blogs").extend(segments);
            }
            Err(()) => warn!("{} cannot carry a path, requesting it as is", self.base),
        }
        url
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportFailure> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TransportFailure::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn post(&self, article: &Article) -> Result<Article, TransportFailure> {
        let response = self
            .client
            .post(self.endpoint(&[]))
            .json(article)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportFailure::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SNAPSHOT_KEY;

    fn gateway(base: &str) -> Gateway {
        Gateway::new(Url::parse(base).unwrap(), FallbackStore::in_memory())
    }

    #[test]
    fn endpoints_extend_the_base_path() {
        assert_eq!(
            gateway("http://localhost:3001").endpoint(&[]).as_str(),
            "http://localhost:3001/blogs"
        );
        assert_eq!(
            gateway("http://example.com/api/").endpoint(&["42"]).as_str(),
            "http://example.com/api/blogs/42"
        );
        assert_eq!(
            gateway("http://example.com/api").endpoint(&["a b"]).as_str(),
            "http://example.com/api/blogs/a%20b"
        );
    }

    #[test]
    fn opaque_base_is_left_untouched() {
        assert_eq!(
            gateway("mailto:archive@example.com").endpoint(&["1"]).as_str(),
            "mailto:archive@example.com"
        );
    }

    #[test]
    fn generating_an_id_does_not_seed_the_snapshot() {
        let gateway = gateway("http://localhost:3001");
        gateway.id_at(OffsetDateTime::now_utc());
        assert_eq!(gateway.store().backend().read(SNAPSHOT_KEY).unwrap(), None);
    }

    #[test]
    fn generated_ids_skip_taken_timestamps() {
        let gateway = gateway("http://localhost:3001");
        let at = OffsetDateTime::now_utc();
        let taken = ArticleId::from_timestamp(at);
        assert_eq!(gateway.id_at(at), taken);

        let article = Article::from_draft(Draft::new("T", "D", "C"), taken.clone());
        gateway.store().prepend(article);
        assert_eq!(gateway.id_at(at), taken.successor().unwrap());
    }
}

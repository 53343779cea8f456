//! Tag repository: single tags, the flat all-tags list, and the
//! tags-to-follow feed.

use std::sync::Arc;

use crate::cache::{QueryKey, QueryStore};
use crate::error::AppResult;
use crate::external::ApiTransport;
use crate::models::{Tag, TagSummary};
use crate::repositories::{page_fetcher, typed_pages, value_fetcher};

#[derive(Clone)]
pub struct TagRepository {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
}

impl TagRepository {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>) -> Self {
        Self { store, api }
    }

    /// A single tag with follow state.
    pub async fn tag(&self, name: &str) -> AppResult<Tag> {
        let key = QueryKey::tag(name);
        let path = format!("/tags?name={name}");
        let value = self
            .store
            .fetch_simple(&key, value_fetcher(self.api.clone(), path))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// The flat list of all tag names, used for post composition chips.
    pub async fn all_tags(&self) -> AppResult<Vec<TagSummary>> {
        let value = self
            .store
            .fetch_simple(
                &QueryKey::all_tags(),
                value_fetcher(self.api.clone(), "/tags/all-tags".to_string()),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Paginated tags-to-follow feed.
    pub async fn tags_to_follow(&self) -> AppResult<Vec<Vec<Tag>>> {
        let key = QueryKey::tag_to_follow();
        self.store
            .fetch_first_page(
                &key,
                page_fetcher(self.api.clone(), "/tags/to-follow".to_string()),
            )
            .await?;
        typed_pages(&self.store, &key)
    }

    pub async fn fetch_next_page(&self, key: &QueryKey) -> AppResult<()> {
        self.store.fetch_next_page(key).await
    }

    pub fn has_next_page(&self, key: &QueryKey) -> bool {
        self.store.has_next_page(key)
    }
}

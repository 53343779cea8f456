//! Post repository: single posts, feeds, and comment threads.

use std::sync::Arc;

use crate::cache::{QueryKey, QueryStore};
use crate::error::AppResult;
use crate::external::ApiTransport;
use crate::models::Post;
use crate::repositories::{page_fetcher, typed_pages, value_fetcher};

/// Read path for posts. Feeds (home latest/top, per-tag, per-profile) share
/// one paginated entry shape; the caller picks the key and path together so
/// they cannot drift apart.
#[derive(Clone)]
pub struct PostRepository {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
}

impl PostRepository {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>) -> Self {
        Self { store, api }
    }

    /// A single post by id.
    pub async fn post(&self, post_id: i64) -> AppResult<Post> {
        let key = QueryKey::post(post_id);
        let path = format!("/posts/{post_id}");
        let value = self
            .store
            .fetch_simple(&key, value_fetcher(self.api.clone(), path))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Loads the first page of a post feed and returns its typed pages.
    pub async fn feed(&self, key: &QueryKey, path: &str) -> AppResult<Vec<Vec<Post>>> {
        self.store
            .fetch_first_page(key, page_fetcher(self.api.clone(), path.to_string()))
            .await?;
        typed_pages(&self.store, key)
    }

    /// The home feed, latest-first.
    pub async fn home_feed(&self) -> AppResult<Vec<Vec<Post>>> {
        self.feed(&QueryKey::home_feed(), "/posts?latest=true").await
    }

    /// The home feed ranked by likes.
    pub async fn top_feed(&self) -> AppResult<Vec<Vec<Post>>> {
        self.feed(&QueryKey::top_feed(), "/posts?top=true").await
    }

    /// Posts authored by one profile.
    pub async fn user_posts(&self, username: &str) -> AppResult<Vec<Vec<Post>>> {
        self.feed(
            &QueryKey::user_posts(username),
            &format!("/posts?author={username}"),
        )
        .await
    }

    /// Posts under one tag.
    pub async fn tag_posts(&self, name: &str) -> AppResult<Vec<Vec<Post>>> {
        self.feed(&QueryKey::tag_posts(name), &format!("/posts?tag={name}"))
            .await
    }

    /// Comments under a post, as a paginated feed of posts with a parent.
    pub async fn comments(&self, post_id: i64) -> AppResult<Vec<Vec<Post>>> {
        self.feed(
            &QueryKey::post_comments(post_id),
            &format!("/posts/{post_id}/comments"),
        )
        .await
    }

    /// Requests the next feed page; coalesced while a fetch is in flight.
    pub async fn fetch_next_page(&self, key: &QueryKey) -> AppResult<()> {
        self.store.fetch_next_page(key).await
    }

    pub fn has_next_page(&self, key: &QueryKey) -> bool {
        self.store.has_next_page(key)
    }

    /// Typed snapshot of the cached pages, for rendering.
    pub fn cached_pages(&self, key: &QueryKey) -> AppResult<Vec<Vec<Post>>> {
        typed_pages(&self.store, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{post_value, MockApi};

    #[tokio::test]
    async fn test_feed_loads_first_page() {
        let api = MockApi::new();
        api.push_page(
            "/posts?latest=true",
            vec![post_value(1, 0, false), post_value(2, 3, true)],
            Some(2),
        );
        let store = QueryStore::new();
        let repo = PostRepository::new(store.clone(), Arc::new(api.clone()));

        let pages = repo.home_feed().await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].len(), 2);
        assert_eq!(pages[0][1].likes, 3);
        assert!(repo.has_next_page(&QueryKey::home_feed()));

        // A second read serves the cached page without another fetch.
        repo.home_feed().await.unwrap();
        assert_eq!(api.page_count("/posts?latest=true"), 1);
    }

    #[tokio::test]
    async fn test_single_post_cached_between_reads() {
        let api = MockApi::new();
        api.push_value("/posts/7", post_value(7, 1, false));
        let store = QueryStore::new();
        let repo = PostRepository::new(store, Arc::new(api.clone()));

        let first = repo.post(7).await.unwrap();
        let second = repo.post(7).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(api.get_count("/posts/7"), 1);
    }
}

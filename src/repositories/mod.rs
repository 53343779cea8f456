//! Repository layer: the typed read path over the query store.
//!
//! One repository per resource kind, each pairing the shared `QueryStore`
//! with the API transport. Repositories build query keys through the typed
//! constructors and register the fetch functions that invalidation-driven
//! refetches re-run later.

mod message_repo;
mod notification_repo;
mod post_repo;
mod tag_repo;
mod user_repo;

pub use message_repo::MessageRepository;
pub use notification_repo::NotificationRepository;
pub use post_repo::PostRepository;
pub use tag_repo::TagRepository;
pub use user_repo::UserRepository;

use std::sync::Arc;

use futures::FutureExt;
use serde::de::DeserializeOwned;

use crate::cache::{PageFetcher, QueryKey, QueryStore, SimpleFetcher};
use crate::error::AppResult;
use crate::external::{ApiTransport, TokenStore};

/// Aggregates all repositories for convenient access.
///
/// Cloning is cheap since the store and transport are behind `Arc`.
#[derive(Clone)]
pub struct Repositories {
    pub posts: PostRepository,
    pub tags: TagRepository,
    pub users: UserRepository,
    pub messages: MessageRepository,
    pub notifications: NotificationRepository,
}

impl Repositories {
    /// Creates a new Repositories instance sharing one store and transport.
    pub fn new(
        store: Arc<QueryStore>,
        api: Arc<dyn ApiTransport>,
        tokens: TokenStore,
    ) -> Self {
        Self {
            posts: PostRepository::new(store.clone(), api.clone()),
            tags: TagRepository::new(store.clone(), api.clone()),
            users: UserRepository::new(store.clone(), api.clone(), tokens),
            messages: MessageRepository::new(store.clone(), api.clone()),
            notifications: NotificationRepository::new(store, api),
        }
    }
}

/// Builds a simple-entry fetch closure for `GET path`.
pub(crate) fn value_fetcher(api: Arc<dyn ApiTransport>, path: String) -> SimpleFetcher {
    Arc::new(move || {
        let api = api.clone();
        let path = path.clone();
        async move { api.get_json(&path).await }.boxed()
    })
}

/// Builds a page fetch closure for a cursor-paginated `GET path`.
pub(crate) fn page_fetcher(api: Arc<dyn ApiTransport>, path: String) -> PageFetcher {
    Arc::new(move |cursor| {
        let api = api.clone();
        let path = path.clone();
        async move { api.get_page(&path, cursor).await }.boxed()
    })
}

/// Deserializes the cached pages under `key` into typed item vectors, one
/// per page. Missing entries yield no pages.
pub(crate) fn typed_pages<T: DeserializeOwned>(
    store: &QueryStore,
    key: &QueryKey,
) -> AppResult<Vec<Vec<T>>> {
    let Some(pages) = store.pages(key) else {
        return Ok(Vec::new());
    };
    pages
        .into_iter()
        .map(|page| {
            page.data
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(Into::into))
                .collect()
        })
        .collect()
}

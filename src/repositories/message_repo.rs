//! Message repository: conversation list and per-conversation history.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cache::{QueryKey, QueryStore};
use crate::error::AppResult;
use crate::external::ApiTransport;
use crate::models::{Chat, Message};
use crate::repositories::{page_fetcher, typed_pages};

#[derive(Clone)]
pub struct MessageRepository {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
}

impl MessageRepository {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>) -> Self {
        Self { store, api }
    }

    /// Paginated conversation summaries.
    pub async fn chats(&self) -> AppResult<Vec<Vec<Chat>>> {
        let key = QueryKey::chats();
        self.store
            .fetch_first_page(&key, page_fetcher(self.api.clone(), "/chats".to_string()))
            .await?;
        typed_pages(&self.store, &key)
    }

    /// Paginated history of one conversation, newest first.
    pub async fn chat(&self, username: &str) -> AppResult<Vec<Vec<Message>>> {
        let key = QueryKey::chat(username);
        let path = format!("/messages?username={username}");
        self.store
            .fetch_first_page(&key, page_fetcher(self.api.clone(), path))
            .await?;
        typed_pages(&self.store, &key)
    }

    /// Keeps the open conversation current while it is on screen; cancel
    /// the token when the view unmounts.
    pub fn spawn_chat_poller(
        &self,
        username: &str,
        period: Duration,
        token: CancellationToken,
    ) -> Option<tokio::task::JoinHandle<()>> {
        self.store
            .spawn_refetch_interval(&QueryKey::chat(username), period, token)
    }

    pub async fn fetch_next_page(&self, key: &QueryKey) -> AppResult<()> {
        self.store.fetch_next_page(key).await
    }

    pub fn has_next_page(&self, key: &QueryKey) -> bool {
        self.store.has_next_page(key)
    }
}

//! Notification repository: the unread count and the notification feed.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cache::{QueryKey, QueryStore};
use crate::error::AppResult;
use crate::external::ApiTransport;
use crate::models::{Notification, NotificationCount};
use crate::repositories::{page_fetcher, typed_pages, value_fetcher};

#[derive(Clone)]
pub struct NotificationRepository {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
}

impl NotificationRepository {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>) -> Self {
        Self { store, api }
    }

    /// Unread notification count shown in the header badge.
    pub async fn count(&self) -> AppResult<NotificationCount> {
        let value = self
            .store
            .fetch_simple(
                &QueryKey::notifs_count(),
                value_fetcher(self.api.clone(), "/notifications/count".to_string()),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Polls the unread count while the app is visible.
    pub fn spawn_count_poller(
        &self,
        period: Duration,
        token: CancellationToken,
    ) -> Option<tokio::task::JoinHandle<()>> {
        self.store
            .spawn_refetch_interval(&QueryKey::notifs_count(), period, token)
    }

    /// Paginated notification feed.
    pub async fn notifications(&self) -> AppResult<Vec<Vec<Notification>>> {
        let key = QueryKey::notifs();
        self.store
            .fetch_first_page(
                &key,
                page_fetcher(self.api.clone(), "/notifications".to_string()),
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

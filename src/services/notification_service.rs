//! Notification mutations.

use std::sync::Arc;

use crate::cache::{QueryKey, QueryStore};
use crate::error::AppResult;
use crate::external::ApiTransport;
use crate::services::log_mutation_error;

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<QueryStore>,
    api: Arc<dyn ApiTransport>,
}

impl NotificationService {
    pub fn new(store: Arc<QueryStore>, api: Arc<dyn ApiTransport>) -> Self {
        Self { store, api }
    }

    /// Dismisses one notification, then refetches the notification list.
    /// There is no optimistic removal; the list is short and the refetch is
    /// immediate.
    pub async fn remove_notification(&self, notification_id: i64) -> AppResult<()> {
        let result = self
            .api
            .delete_json(&format!("/notifications/{notification_id}"))
            .await;
        if let Err(err) = &result {
            log_mutation_error("remove_notification", err);
        }
        self.store.invalidate(&QueryKey::notifs());
        Ok(())
    }
}
